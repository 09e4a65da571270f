mod common;

use storefront_db::{
    error::StoreError,
    query::ProductFilter,
    services::{category_service, product_service, review_service, user_service},
};
use uuid::Uuid;

#[tokio::test]
async fn search_matches_text_category_and_manufacturer() -> anyhow::Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };

    let marker = Uuid::new_v4().simple().to_string();
    let category = category_service::add_category(&pool, &format!("cat-{marker}")).await?;

    let product = product_service::add_product(
        &pool,
        &product_service::NewProduct {
            name: format!("Gizmo {marker}"),
            description: Some("a searchable gizmo".into()),
            price: 1500,
            stock: 7,
            manufacturer: Some(format!("maker-{marker}")),
            category_id: Some(category.id),
        },
    )
    .await?;

    let filter = ProductFilter {
        search: Some(marker.clone()),
        category_id: Some(category.id),
        manufacturer: Some(format!("maker-{marker}")),
    };
    let found = product_service::search_products(&pool, &filter).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, product.id);
    assert_eq!(found[0].category_name.as_deref(), Some(&*category.name));

    // A non-matching manufacturer excludes the product.
    let filter = ProductFilter {
        manufacturer: Some("nobody".into()),
        search: Some(marker.clone()),
        category_id: None,
    };
    assert!(product_service::search_products(&pool, &filter).await?.is_empty());

    let manufacturers = product_service::list_manufacturers(&pool).await?;
    assert!(manufacturers.contains(&format!("maker-{marker}")));

    Ok(())
}

#[tokio::test]
async fn category_crud_and_not_found() -> anyhow::Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };

    let marker = Uuid::new_v4().simple().to_string();
    let category = category_service::add_category(&pool, &format!("books-{marker}")).await?;

    let renamed =
        category_service::update_category(&pool, category.id, &format!("ebooks-{marker}")).await?;
    assert_eq!(renamed.name, format!("ebooks-{marker}"));

    category_service::delete_category(&pool, category.id).await?;
    let err = category_service::delete_category(&pool, category.id)
        .await
        .expect_err("second delete must fail");
    assert!(matches!(err, StoreError::NotFound));

    Ok(())
}

#[tokio::test]
async fn deleting_a_category_keeps_its_products() -> anyhow::Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };

    let marker = Uuid::new_v4().simple().to_string();
    let category = category_service::add_category(&pool, &format!("tools-{marker}")).await?;
    let product = product_service::add_product(
        &pool,
        &product_service::NewProduct {
            name: format!("Wrench {marker}"),
            description: None,
            price: 800,
            stock: 3,
            manufacturer: None,
            category_id: Some(category.id),
        },
    )
    .await?;

    category_service::delete_category(&pool, category.id).await?;

    let orphan = product_service::get_product(&pool, product.id).await?.unwrap();
    assert_eq!(orphan.category_id, None);

    Ok(())
}

#[tokio::test]
async fn reviews_average_and_author_join() -> anyhow::Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };

    let user_id = common::create_test_user(&pool).await?;
    let product = common::create_test_product(&pool, 1200, 6).await?;

    assert_eq!(review_service::average_rating(&pool, product.id).await?, None);

    review_service::add_review(&pool, product.id, user_id, 4, Some("solid")).await?;
    review_service::add_review(&pool, product.id, user_id, 2, None).await?;

    let err = review_service::add_review(&pool, product.id, user_id, 6, None)
        .await
        .expect_err("rating above 5 must be rejected");
    assert!(matches!(err, StoreError::BadRequest(_)));

    let reviews = review_service::list_reviews(&pool, product.id).await?;
    assert_eq!(reviews.len(), 2);
    assert!(reviews[0].username.starts_with("tester-"));

    let avg = review_service::average_rating(&pool, product.id).await?;
    assert_eq!(avg, Some(3.0));

    Ok(())
}

#[tokio::test]
async fn new_users_get_the_default_role() -> anyhow::Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };

    let user_id = common::create_test_user(&pool).await?;

    let profile = user_service::get_user_by_id(&pool, user_id).await?.unwrap();
    let by_email = user_service::get_user_by_email(&pool, &profile.email)
        .await?
        .unwrap();
    assert_eq!(by_email.id, user_id);

    let roles = user_service::get_user_roles(&pool, user_id).await?;
    assert_eq!(roles, vec!["User".to_string()]);

    assert!(user_service::get_user_by_id(&pool, Uuid::new_v4()).await?.is_none());
    assert!(
        user_service::get_role_id_by_name(&pool, "Admin")
            .await?
            .is_some()
    );

    Ok(())
}
