//! Data-access layer for an e-commerce store backed by PostgreSQL.
//!
//! Every operation takes the shared [`db::DbPool`] explicitly; multi-step
//! mutations (cart batch updates, checkout, status transitions) run inside a
//! single database transaction and roll back in full on any failure.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod services;
