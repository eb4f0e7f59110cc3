use chrono::NaiveDate;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use weedly_api::{
    config::JwtConfig,
    db::{create_pool, orm_from_pool, run_migrations},
    dto::{
        IdInput,
        products::RateProductRequest,
        reups::{AddUpdateRequest, CreateReUpRequest, RemoveProductRequest},
    },
    entity::products::{ActiveModel as ProductActive, ProductType},
    error::AppError,
    middleware::auth::{AuthUser, Ctx},
    services::{product_service, reup_service},
    state::AppState,
    validation::SelectOption,
};

// Integration flow: record a ReUp, read it back, remove a product, add an update, delete it.
#[tokio::test]
async fn reup_lifecycle_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let alice = Ctx::authenticated(AuthUser::new("alice@example.com"));
    let bob = Ctx::authenticated(AuthUser::new("bob@example.com"));

    let flower = create_product(&state, "Blue Dream", ProductType::Flower, 35.0).await?;
    let edible = create_product(&state, "Calm Gummies", ProductType::Edible, 20.0).await?;

    // Duplicate references are kept as separate rows.
    let created = reup_service::create_reup(
        &state,
        &alice,
        CreateReUpRequest {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            title: "Spring Order".into(),
            from: Some("Local Dispensary".into()),
            total: Some(120.5),
            thoughts: None,
            products: Some(vec![
                SelectOption::new(flower, "Blue Dream"),
                SelectOption::new(edible, "Calm Gummies"),
                SelectOption::new(flower, "Blue Dream"),
            ]),
        },
    )
    .await?;
    assert_eq!(created.reup.user, "alice@example.com");
    assert_eq!(created.products.len(), 3);

    let detail = reup_service::get_reup(&state, &alice, IdInput { id: created.reup.id })
        .await?
        .expect("reup visible to its owner");
    assert_eq!(detail.products.len(), 3);
    assert_eq!(detail.reup.from.as_deref(), Some("Local Dispensary"));

    // Other users neither see nor delete it.
    assert!(
        reup_service::get_reup(&state, &bob, IdInput { id: created.reup.id })
            .await?
            .is_none()
    );
    assert!(matches!(
        reup_service::delete_reup(&state, &bob, IdInput { id: created.reup.id }).await,
        Err(AppError::Unauthorized)
    ));

    let removed = reup_service::remove_product(
        &state,
        &alice,
        RemoveProductRequest {
            id: flower,
            re_up_id: created.reup.id,
        },
    )
    .await?;
    assert_eq!(removed.count, 2);

    reup_service::add_update(
        &state,
        &alice,
        AddUpdateRequest {
            id: created.reup.id,
            text: "The gummies were great.".into(),
        },
    )
    .await?;

    let listed = reup_service::list_reups(&state, &alice).await?;
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].products.len(), 1);
    assert_eq!(listed.items[0].updates.len(), 1);

    // Reviews survive their own flow independently of ReUps.
    let review = product_service::rate_product(
        &state,
        &alice,
        RateProductRequest {
            id: edible,
            rating: 5,
            review: "Tasty and calming.".into(),
        },
    )
    .await?;
    assert_eq!(review.rating, 5);
    assert_eq!(product_service::user_ratings(&state, &alice).await?.items.len(), 1);
    assert!(product_service::user_ratings(&state, &bob).await?.items.is_empty());

    let deleted = reup_service::delete_reup(&state, &alice, IdInput { id: created.reup.id }).await?;
    assert_eq!(deleted.id, created.reup.id);
    assert!(reup_service::list_reups(&state, &alice).await?.items.is_empty());

    let orphans = state
        .orm
        .query_one(Statement::from_string(
            state.orm.get_database_backend(),
            "SELECT COUNT(*) AS n FROM reup_products WHERE reup_id NOT IN (SELECT id FROM reups)",
        ))
        .await?
        .map(|row| row.try_get::<i64>("", "n"))
        .transpose()?
        .unwrap_or_default();
    assert_eq!(orphans, 0);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;
    let orm = orm_from_pool(pool);

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE reup_products, reup_updates, reups, product_reviews, user_product_favorites, user_product_dislikes, product_tag_links, product_tags, products RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState::new(
        orm,
        JwtConfig {
            secret: "flow-test-secret".into(),
            issuer: None,
        },
    ))
}

async fn create_product(
    state: &AppState,
    name: &str,
    product_type: ProductType,
    price: f64,
) -> anyhow::Result<i32> {
    let product = ProductActive {
        id: NotSet,
        name: Set(name.to_string()),
        brand: Set("Green Acres".into()),
        description: Set(None),
        product_type: Set(product_type),
        price: Set(price),
    }
    .insert(state.db())
    .await?;

    Ok(product.id)
}
