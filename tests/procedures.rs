use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::json;
use weedly_api::{
    config::JwtConfig,
    entity::{
        product_reviews, product_tag_links, product_tags,
        products::{self, ProductType},
        reup_products, reup_updates, reups, user_product_dislikes, user_product_favorites,
    },
    error::AppError,
    middleware::auth::{AuthUser, Ctx},
    procedures::{self, Procedure},
    state::AppState,
};

fn state_with(orm: DatabaseConnection) -> AppState {
    AppState::new(
        orm,
        JwtConfig {
            secret: "test-secret".into(),
            issuer: None,
        },
    )
}

fn alice() -> Ctx {
    Ctx::authenticated(AuthUser::new("alice@example.com"))
}

/// Every executed statement, rendered with its bound values.
fn statements(state: AppState) -> Vec<String> {
    let orm = Arc::try_unwrap(state.orm)
        .ok()
        .expect("connection is not shared");
    orm.into_transaction_log()
        .iter()
        .flat_map(|txn| {
            format!("{txn:?}")
                .split("Statement {")
                .skip(1)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn is_kind(stmt: &str, keyword: &str) -> bool {
    stmt.trim_start().starts_with(&format!("sql: \"{keyword}"))
}

fn product(id: i32) -> products::Model {
    products::Model {
        id,
        name: "Blue Dream".into(),
        brand: "Green Acres".into(),
        description: None,
        product_type: ProductType::Flower,
        price: 35.0,
    }
}

fn reup(id: i32, user: &str) -> reups::Model {
    reups::Model {
        id,
        user: user.into(),
        date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        title: "Spring Order".into(),
        source: Some("Local Dispensary".into()),
        total: Some(120.5),
        thoughts: String::new(),
    }
}

fn now() -> sea_orm::prelude::DateTimeWithTimeZone {
    chrono::Utc::now().fixed_offset()
}

#[tokio::test]
async fn create_reup_is_owned_by_the_caller() {
    let orm = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![product(1)]])
        .append_query_results([vec![reup(10, "alice@example.com")]])
        .append_query_results([vec![reup_products::Model {
            id: 100,
            reup_id: 10,
            product_id: 1,
            added_at: now(),
        }]])
        .into_connection();
    let state = state_with(orm);

    let input = json!({
        "date": "2024-03-01",
        "title": "Spring Order",
        "from": "Local Dispensary",
        "total": "120.50",
        "user": "mallory@example.com",
        "products": [{ "value": 1, "label": "Blue Dream" }]
    });
    let result = procedures::call(&state, &alice(), Procedure::ReUpsCreate, input)
        .await
        .unwrap();

    assert_eq!(result["id"], 10);
    assert_eq!(result["products"].as_array().unwrap().len(), 1);
    assert_eq!(result["products"][0]["productId"], 1);

    let log = statements(state);
    let insert = log
        .iter()
        .find(|stmt| is_kind(stmt, "INSERT") && stmt.contains("reups"))
        .expect("reup insert");
    assert!(insert.contains("alice@example.com"));
    assert!(!log.iter().any(|stmt| stmt.contains("mallory@example.com")));
}

#[tokio::test]
async fn deleting_someone_elses_reup_writes_nothing() {
    let orm = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![reup(10, "bob@example.com")]])
        .into_connection();
    let state = state_with(orm);

    let err = procedures::call(&state, &alice(), Procedure::ReUpsDelete, json!({ "id": 10 }))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let log = statements(state);
    assert_eq!(log.len(), 1);
    assert!(is_kind(&log[0], "SELECT"));
    assert!(!log.iter().any(|stmt| is_kind(stmt, "DELETE")));
}

#[tokio::test]
async fn deleting_a_missing_reup_is_not_found() {
    let orm = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<reups::Model>::new()])
        .into_connection();
    let state = state_with(orm);

    let err = procedures::call(&state, &alice(), Procedure::ReUpsDelete, json!({ "id": 99 }))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No ReUp found with id 99");
}

#[tokio::test]
async fn out_of_range_rating_never_reaches_the_database() {
    let orm = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = state_with(orm);

    let input = json!({ "id": 1, "rating": 9, "review": "Great taste, smooth." });
    let err = procedures::call(&state, &alice(), Procedure::ProductsRate, input)
        .await
        .unwrap_err();
    match err {
        AppError::Validation(message) => assert!(message.contains("rating")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(statements(state).is_empty());
}

#[tokio::test]
async fn negative_price_is_rejected_before_insert() {
    let orm = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = state_with(orm);

    let input = json!({
        "name": "Blue Dream",
        "brand": "Green Acres",
        "type": { "value": "flower", "label": "Flower" },
        "price": -5
    });
    let err = procedures::call(&state, &alice(), Procedure::ProductsCreate, input)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(statements(state).is_empty());
}

#[tokio::test]
async fn favoriting_twice_adds_two_rows() {
    let favorite = |id| user_product_favorites::Model {
        id,
        product_id: 1,
        user: "alice@example.com".into(),
        added_at: now(),
    };
    let orm = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![product(1)]])
        .append_query_results([vec![favorite(1)]])
        .append_query_results([vec![product(1)]])
        .append_query_results([vec![favorite(2)]])
        .into_connection();
    let state = state_with(orm);

    let ctx = alice();
    let first = procedures::call(&state, &ctx, Procedure::ProductsFavorite, json!({ "id": 1 }))
        .await
        .unwrap();
    let second = procedures::call(&state, &ctx, Procedure::ProductsFavorite, json!({ "id": 1 }))
        .await
        .unwrap();
    assert_ne!(first["id"], second["id"]);

    let inserts = statements(state)
        .iter()
        .filter(|stmt| is_kind(stmt, "INSERT"))
        .count();
    assert_eq!(inserts, 2);
}

#[tokio::test]
async fn anonymous_queries_are_empty_and_run_no_sql() {
    let orm = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = state_with(orm);
    let ctx = Ctx::anonymous();

    let list = procedures::call(&state, &ctx, Procedure::ReUpsList, json!(null))
        .await
        .unwrap();
    assert_eq!(list, json!([]));

    let get = procedures::call(&state, &ctx, Procedure::ReUpsGet, json!({ "id": "nonsense" }))
        .await
        .unwrap();
    assert!(get.is_null());

    assert!(statements(state).is_empty());
}

#[tokio::test]
async fn anonymous_mutations_are_unauthorized_before_decoding() {
    let orm = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = state_with(orm);

    let err = procedures::call(
        &state,
        &Ctx::anonymous(),
        Procedure::ReUpsCreate,
        json!({ "title": 42 }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
}

fn reup_product(id: i32, reup_id: i32, product_id: i32) -> reup_products::Model {
    reup_products::Model {
        id,
        reup_id,
        product_id,
        added_at: now(),
    }
}

fn tag(id: i32, name: &str) -> product_tags::Model {
    product_tags::Model {
        id,
        name: name.into(),
        color: "green".into(),
    }
}

fn no_writes(log: &[String]) -> bool {
    !log
        .iter()
        .any(|stmt| is_kind(stmt, "INSERT") || is_kind(stmt, "UPDATE") || is_kind(stmt, "DELETE"))
}

/// Mutations that act on one of the caller's ReUps, with a valid input for `reUp` 10.
fn reup_mutations() -> Vec<(Procedure, serde_json::Value)> {
    vec![
        (
            Procedure::ReUpsAddProducts,
            json!({ "id": 10, "products": [{ "value": 1, "label": "Blue Dream" }] }),
        ),
        (
            Procedure::ReUpsAddUpdate,
            json!({ "id": 10, "text": "Finished the last gram." }),
        ),
        (Procedure::ReUpsRemoveProduct, json!({ "id": 1, "reUpId": 10 })),
        (Procedure::ReUpsDelete, json!({ "id": 10 })),
    ]
}

#[tokio::test]
async fn reup_mutations_reject_non_owners_before_writing() {
    for (procedure, input) in reup_mutations() {
        let orm = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![reup(10, "bob@example.com")]])
            .into_connection();
        let state = state_with(orm);

        let err = procedures::call(&state, &alice(), procedure, input)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized), "{procedure}: {err:?}");

        let log = statements(state);
        assert_eq!(log.len(), 1, "{procedure}");
        assert!(is_kind(&log[0], "SELECT"), "{procedure}");
        assert!(no_writes(&log), "{procedure}");
    }
}

#[tokio::test]
async fn reup_mutations_on_missing_reups_are_not_found() {
    for (procedure, input) in reup_mutations() {
        let orm = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<reups::Model>::new()])
            .into_connection();
        let state = state_with(orm);

        let err = procedures::call(&state, &alice(), procedure, input)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No ReUp found with id 10", "{procedure}");
        assert!(no_writes(&statements(state)), "{procedure}");
    }
}

#[tokio::test]
async fn marker_deletes_reject_non_owners_before_writing() {
    let cases = [
        (
            Procedure::ProductsDeleteFavorite,
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
                user_product_favorites::Model {
                    id: 5,
                    product_id: 1,
                    user: "bob@example.com".into(),
                    added_at: now(),
                },
            ]]),
        ),
        (
            Procedure::ProductsDeleteDislike,
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
                user_product_dislikes::Model {
                    id: 5,
                    product_id: 1,
                    user: "bob@example.com".into(),
                    added_at: now(),
                },
            ]]),
        ),
        (
            Procedure::ProductsDeleteReview,
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
                product_reviews::Model {
                    id: 5,
                    product_id: 1,
                    user: "bob@example.com".into(),
                    rating: 4,
                    review: "Smooth and mellow.".into(),
                    created_at: now(),
                },
            ]]),
        ),
    ];

    for (procedure, mock) in cases {
        let state = state_with(mock.into_connection());

        let err = procedures::call(&state, &alice(), procedure, json!({ "id": 5 }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized), "{procedure}: {err:?}");

        let log = statements(state);
        assert_eq!(log.len(), 1, "{procedure}");
        assert!(no_writes(&log), "{procedure}");
    }
}

#[tokio::test]
async fn marker_deletes_on_missing_rows_are_not_found() {
    let cases = [
        (Procedure::ProductsDeleteFavorite, "No UserProductFavorite found with id 5"),
        (Procedure::ProductsDeleteDislike, "No UserProductDislike found with id 5"),
        (Procedure::ProductsDeleteReview, "No ProductReview found with id 5"),
    ];

    for (procedure, message) in cases {
        let orm = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_product_favorites::Model>::new()])
            .into_connection();
        let state = state_with(orm);

        let err = procedures::call(&state, &alice(), procedure, json!({ "id": 5 }))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), message);
        assert!(no_writes(&statements(state)), "{procedure}");
    }
}

#[tokio::test]
async fn owners_can_delete_their_favorites() {
    let orm = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_product_favorites::Model {
            id: 5,
            product_id: 1,
            user: "alice@example.com".into(),
            added_at: now(),
        }]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let state = state_with(orm);

    let result = procedures::call(&state, &alice(), Procedure::ProductsDeleteFavorite, json!({ "id": 5 }))
        .await
        .unwrap();
    assert_eq!(result, json!({}));

    let log = statements(state);
    assert_eq!(log.len(), 2);
    assert!(is_kind(&log[1], "DELETE"));
}

#[tokio::test]
async fn every_product_reference_comes_back_with_its_added_at() {
    let orm = MockDatabase::new(DatabaseBackend::Postgres)
        // reups.create
        .append_query_results([vec![product(1), product(2)]])
        .append_query_results([vec![reup(10, "alice@example.com")]])
        .append_query_results([vec![reup_product(100, 10, 1)]])
        .append_query_results([vec![reup_product(101, 10, 2)]])
        .append_query_results([vec![reup_product(102, 10, 1)]])
        // reups.get
        .append_query_results([vec![reup(10, "alice@example.com")]])
        .append_query_results([vec![
            (reup_product(100, 10, 1), product(1)),
            (reup_product(101, 10, 2), product(2)),
            (reup_product(102, 10, 1), product(1)),
        ]])
        .append_query_results([Vec::<(product_tag_links::Model, product_tags::Model)>::new()])
        .append_query_results([Vec::<reup_updates::Model>::new()])
        .into_connection();
    let state = state_with(orm);
    let ctx = alice();

    let input = json!({
        "date": "2024-01-01",
        "title": "Spring Order",
        "products": [
            { "value": 1, "label": "Blue Dream" },
            { "value": 2, "label": "Calm Gummies" },
            { "value": 1, "label": "Blue Dream" }
        ]
    });
    let created = procedures::call(&state, &ctx, Procedure::ReUpsCreate, input)
        .await
        .unwrap();
    assert_eq!(created["products"].as_array().unwrap().len(), 3);

    let detail = procedures::call(&state, &ctx, Procedure::ReUpsGet, json!({ "id": 10 }))
        .await
        .unwrap();
    let products = detail["products"].as_array().unwrap();
    assert_eq!(products.len(), 3);
    for entry in products {
        assert!(entry["addedAt"].is_string(), "{entry}");
        assert!(entry["product"]["tags"].is_array());
    }
    assert_eq!(products[1]["product"]["id"], 2);

    let inserts = statements(state)
        .iter()
        .filter(|stmt| is_kind(stmt, "INSERT") && stmt.contains("reup_products"))
        .count();
    assert_eq!(inserts, 3);
}

#[tokio::test]
async fn creating_a_reup_with_an_unknown_product_is_not_found() {
    let orm = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![product(1)]])
        .into_connection();
    let state = state_with(orm);

    let input = json!({
        "date": "2024-01-01",
        "title": "Spring Order",
        "products": [
            { "value": 1, "label": "Blue Dream" },
            { "value": 7, "label": "Gone" }
        ]
    });
    let err = procedures::call(&state, &alice(), Procedure::ReUpsCreate, input)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No Product found with id 7");
    assert!(no_writes(&statements(state)));
}

#[tokio::test]
async fn created_products_are_linked_to_their_tags() {
    let orm = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![tag(2, "CBD"), tag(1, "Indica")]])
        .append_query_results([vec![product(5)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 2,
        }])
        .into_connection();
    let state = state_with(orm);

    let input = json!({
        "name": "Blue Dream",
        "brand": "Green Acres",
        "type": { "value": "Flower", "label": "Flower" },
        "price": "35.00",
        "tags": [
            { "value": 1, "label": "Indica" },
            { "value": 2, "label": "CBD" }
        ]
    });
    let created = procedures::call(&state, &alice(), Procedure::ProductsCreate, input)
        .await
        .unwrap();
    assert_eq!(created["id"], 5);
    assert_eq!(created["type"], "flower");
    assert_eq!(created["tags"].as_array().unwrap().len(), 2);

    let log = statements(state);
    let links = log
        .iter()
        .find(|stmt| is_kind(stmt, "INSERT") && stmt.contains("product_tag_links"))
        .expect("tag link insert");
    assert!(links.contains("Int(Some(5))"));
}

#[tokio::test]
async fn creating_a_product_with_an_unknown_tag_is_not_found() {
    let orm = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![tag(1, "Indica")]])
        .into_connection();
    let state = state_with(orm);

    let input = json!({
        "name": "Blue Dream",
        "brand": "Green Acres",
        "type": { "value": "flower", "label": "Flower" },
        "price": 35,
        "tags": [
            { "value": 1, "label": "Indica" },
            { "value": 9, "label": "Gone" }
        ]
    });
    let err = procedures::call(&state, &alice(), Procedure::ProductsCreate, input)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No ProductTag found with id 9");
    assert!(no_writes(&statements(state)));
}
