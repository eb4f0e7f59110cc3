use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::{
    dto::{
        IdInput,
        reups::{
            AddProductsRequest, AddUpdateRequest, CreateReUpRequest, RemoveProductRequest,
            ReUpList, UpdateReUpRequest,
        },
    },
    entity::{
        Products, ReUpProducts, ReUpUpdates, ReUps, products, reup_products, reup_updates, reups,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Ctx, ensure_owner},
    models::{
        DeleteCount, ProductWithTags, ReUp, ReUpDetail, ReUpProduct, ReUpProductEntry, ReUpUpdate,
        ReUpWithProducts, product_from_entity, reup_from_entity, reup_product_from_entity,
        reup_update_from_entity,
    },
    services::product_service::load_tags,
    state::AppState,
    validation::validate,
};

pub async fn list_reups(state: &AppState, ctx: &Ctx) -> AppResult<ReUpList> {
    let Some(user) = ctx.user.as_ref() else {
        return Ok(ReUpList { items: Vec::new() });
    };

    let rows = ReUps::find()
        .filter(reups::Column::User.eq(user.email.as_str()))
        .order_by_desc(reups::Column::Date)
        .order_by_desc(reups::Column::Id)
        .all(state.db())
        .await?;
    let items = load_details(state.db(), rows).await?;
    Ok(ReUpList { items })
}

/// One of the caller's ReUps; `None` when it does not exist or is not theirs.
pub async fn get_reup(state: &AppState, ctx: &Ctx, input: IdInput) -> AppResult<Option<ReUpDetail>> {
    let Some(user) = ctx.user.as_ref() else {
        return Ok(None);
    };
    validate(&input)?;

    let row = ReUps::find_by_id(input.id)
        .filter(reups::Column::User.eq(user.email.as_str()))
        .one(state.db())
        .await?;
    let Some(row) = row else {
        return Ok(None);
    };
    Ok(load_details(state.db(), vec![row]).await?.pop())
}

/// Creates the ReUp for the caller together with one join row per product
/// reference. Duplicate references are kept as separate rows.
pub async fn create_reup(
    state: &AppState,
    ctx: &Ctx,
    payload: CreateReUpRequest,
) -> AppResult<ReUpWithProducts> {
    let user = ctx.require_user()?;
    validate(&payload)?;

    let product_ids: Vec<i32> = payload
        .products
        .unwrap_or_default()
        .into_iter()
        .map(|option| option.value)
        .collect();

    let txn = state.db().begin().await?;
    ensure_products_exist(&txn, &product_ids).await?;

    let reup = reups::ActiveModel {
        id: NotSet,
        user: Set(user.email.clone()),
        date: Set(payload.date),
        title: Set(payload.title),
        source: Set(payload.from),
        total: Set(payload.total),
        thoughts: Set(payload.thoughts.unwrap_or_default()),
    }
    .insert(&txn)
    .await?;

    let products = insert_reup_products(&txn, reup.id, &product_ids).await?;
    txn.commit().await?;

    tracing::info!(user = %user.email, reup_id = reup.id, products = products.len(), "reup created");

    Ok(ReUpWithProducts {
        reup: reup_from_entity(reup),
        products,
    })
}

/// Appends products to one of the caller's ReUps. Existing rows for the same
/// product are not checked.
pub async fn add_products(
    state: &AppState,
    ctx: &Ctx,
    payload: AddProductsRequest,
) -> AppResult<ReUpWithProducts> {
    let user = ctx.require_user()?;
    validate(&payload)?;
    let reup = find_owned_reup(state.db(), payload.id, user).await?;

    let product_ids: Vec<i32> = payload.products.iter().map(|option| option.value).collect();

    let txn = state.db().begin().await?;
    ensure_products_exist(&txn, &product_ids).await?;
    insert_reup_products(&txn, reup.id, &product_ids).await?;
    let products = ReUpProducts::find()
        .filter(reup_products::Column::ReupId.eq(reup.id))
        .order_by_asc(reup_products::Column::AddedAt)
        .all(&txn)
        .await?
        .into_iter()
        .map(reup_product_from_entity)
        .collect();
    txn.commit().await?;

    tracing::info!(user = %user.email, reup_id = reup.id, added = product_ids.len(), "products added to reup");

    Ok(ReUpWithProducts {
        reup: reup_from_entity(reup),
        products,
    })
}

pub async fn add_update(
    state: &AppState,
    ctx: &Ctx,
    payload: AddUpdateRequest,
) -> AppResult<ReUpUpdate> {
    let user = ctx.require_user()?;
    validate(&payload)?;
    let reup = find_owned_reup(state.db(), payload.id, user).await?;

    let update = reup_updates::ActiveModel {
        id: NotSet,
        reup_id: Set(reup.id),
        text: Set(payload.text),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(state.db())
    .await?;

    tracing::info!(user = %user.email, reup_id = reup.id, update_id = update.id, "reup update added");
    Ok(reup_update_from_entity(update))
}

/// Deletes every join row for (product, ReUp); the count may be zero.
pub async fn remove_product(
    state: &AppState,
    ctx: &Ctx,
    payload: RemoveProductRequest,
) -> AppResult<DeleteCount> {
    let user = ctx.require_user()?;
    validate(&payload)?;
    let reup = find_owned_reup(state.db(), payload.re_up_id, user).await?;

    let result = ReUpProducts::delete_many()
        .filter(reup_products::Column::ReupId.eq(reup.id))
        .filter(reup_products::Column::ProductId.eq(payload.id))
        .exec(state.db())
        .await?;

    tracing::info!(
        user = %user.email,
        reup_id = reup.id,
        product_id = payload.id,
        removed = result.rows_affected,
        "product removed from reup"
    );
    Ok(DeleteCount {
        count: result.rows_affected,
    })
}

/// Updates fields of one of the caller's ReUps. The owner never changes.
pub async fn update_reup(
    state: &AppState,
    ctx: &Ctx,
    id: i32,
    payload: UpdateReUpRequest,
) -> AppResult<ReUp> {
    let user = ctx.require_user()?;
    validate(&payload)?;
    if payload.is_empty() {
        return Err(AppError::Validation(
            "Missing required field(s) in request body.".into(),
        ));
    }
    let reup = find_owned_reup(state.db(), id, user).await?;

    let mut active: reups::ActiveModel = reup.into();
    if let Some(date) = payload.date {
        active.date = Set(date);
    }
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(from) = payload.from {
        active.source = Set(Some(from));
    }
    if let Some(total) = payload.total {
        active.total = Set(Some(total));
    }
    if let Some(thoughts) = payload.thoughts {
        active.thoughts = Set(thoughts);
    }

    let reup = active.update(state.db()).await?;
    tracing::info!(user = %user.email, reup_id = reup.id, "reup updated");
    Ok(reup_from_entity(reup))
}

/// Deletes a ReUp with its product rows and updates in one transaction.
pub async fn delete_reup(state: &AppState, ctx: &Ctx, input: IdInput) -> AppResult<ReUp> {
    let user = ctx.require_user()?;
    validate(&input)?;
    let reup = find_owned_reup(state.db(), input.id, user).await?;

    let txn = state.db().begin().await?;
    let products = ReUpProducts::delete_many()
        .filter(reup_products::Column::ReupId.eq(reup.id))
        .exec(&txn)
        .await?;
    let updates = ReUpUpdates::delete_many()
        .filter(reup_updates::Column::ReupId.eq(reup.id))
        .exec(&txn)
        .await?;
    ReUps::delete_by_id(reup.id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        user = %user.email,
        reup_id = reup.id,
        products = products.rows_affected,
        updates = updates.rows_affected,
        "reup deleted"
    );
    Ok(reup_from_entity(reup))
}

async fn find_owned_reup<C: ConnectionTrait>(
    db: &C,
    id: i32,
    user: &AuthUser,
) -> AppResult<reups::Model> {
    let found = ReUps::find_by_id(id).one(db).await?;
    ensure_owner(found, "ReUp", id, user)
}

async fn ensure_products_exist<C: ConnectionTrait>(db: &C, ids: &[i32]) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: Vec<i32> = Products::find()
        .filter(products::Column::Id.is_in(ids.to_vec()))
        .all(db)
        .await?
        .into_iter()
        .map(|product| product.id)
        .collect();
    match ids.iter().find(|id| !found.contains(*id)) {
        Some(missing) => Err(AppError::not_found("Product", *missing)),
        None => Ok(()),
    }
}

async fn insert_reup_products<C: ConnectionTrait>(
    db: &C,
    reup_id: i32,
    product_ids: &[i32],
) -> AppResult<Vec<ReUpProduct>> {
    let mut rows = Vec::with_capacity(product_ids.len());
    for product_id in product_ids {
        let row = reup_products::ActiveModel {
            id: NotSet,
            reup_id: Set(reup_id),
            product_id: Set(*product_id),
            added_at: NotSet,
        }
        .insert(db)
        .await?;
        rows.push(reup_product_from_entity(row));
    }
    Ok(rows)
}

/// Attaches products (with tags) and the update timeline to each ReUp,
/// preserving the input order.
async fn load_details<C: ConnectionTrait>(
    db: &C,
    rows: Vec<reups::Model>,
) -> AppResult<Vec<ReUpDetail>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();

    let links = ReUpProducts::find()
        .filter(reup_products::Column::ReupId.is_in(ids.clone()))
        .order_by_asc(reup_products::Column::AddedAt)
        .find_also_related(Products)
        .all(db)
        .await?;

    let mut product_ids: Vec<i32> = links.iter().map(|(link, _)| link.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    let tags = load_tags(db, &product_ids).await?;

    let mut products: HashMap<i32, Vec<ReUpProductEntry>> = HashMap::new();
    for (link, product) in links {
        let Some(product) = product else { continue };
        let entry = ReUpProductEntry {
            product: ProductWithTags {
                tags: tags.get(&product.id).cloned().unwrap_or_default(),
                product: product_from_entity(product),
            },
            added_at: link.added_at.with_timezone(&Utc),
        };
        products.entry(link.reup_id).or_default().push(entry);
    }

    let mut updates: HashMap<i32, Vec<ReUpUpdate>> = HashMap::new();
    let update_rows = ReUpUpdates::find()
        .filter(reup_updates::Column::ReupId.is_in(ids))
        .order_by_asc(reup_updates::Column::CreatedAt)
        .all(db)
        .await?;
    for row in update_rows {
        updates
            .entry(row.reup_id)
            .or_default()
            .push(reup_update_from_entity(row));
    }

    Ok(rows
        .into_iter()
        .map(|row| ReUpDetail {
            products: products.remove(&row.id).unwrap_or_default(),
            updates: updates.remove(&row.id).unwrap_or_default(),
            reup: reup_from_entity(row),
        })
        .collect())
}
