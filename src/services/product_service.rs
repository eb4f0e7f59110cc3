use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::{
    dto::{
        IdInput,
        products::{CreateProductRequest, MarkerList, ProductList, RateProductRequest, ReviewList},
    },
    entity::{
        ProductReviews, ProductTagLinks, ProductTags, Products, UserProductDislikes,
        UserProductFavorites, product_reviews, product_tag_links, product_tags,
        products::{self, ProductType},
        user_product_dislikes, user_product_favorites,
    },
    error::{AppError, AppResult},
    middleware::auth::{Ctx, ensure_owner},
    models::{
        ProductMarker, ProductMarkerWithProduct, ProductReview, ProductReviewWithProduct,
        ProductTag, ProductWithTags, dislike_from_entity, favorite_from_entity,
        product_from_entity, review_from_entity, tag_from_entity,
    },
    state::AppState,
    validation::validate,
};

pub async fn list_products(state: &AppState, ctx: &Ctx) -> AppResult<ProductList> {
    if ctx.user.is_none() {
        return Ok(ProductList { items: Vec::new() });
    }

    let products = Products::find()
        .order_by_asc(products::Column::Name)
        .all(state.db())
        .await?;
    let items = attach_tags(state.db(), products).await?;
    Ok(ProductList { items })
}

pub async fn get_product(
    state: &AppState,
    ctx: &Ctx,
    input: IdInput,
) -> AppResult<Option<ProductWithTags>> {
    if ctx.user.is_none() {
        return Ok(None);
    }
    validate(&input)?;

    let Some(product) = Products::find_by_id(input.id).one(state.db()).await? else {
        return Ok(None);
    };
    Ok(attach_tags(state.db(), vec![product]).await?.pop())
}

pub async fn create_product(
    state: &AppState,
    ctx: &Ctx,
    payload: CreateProductRequest,
) -> AppResult<ProductWithTags> {
    let user = ctx.require_user()?;
    validate(&payload)?;
    let product_type = ProductType::parse(&payload.product_type.value).ok_or_else(|| {
        AppError::Validation(format!(
            "type: unknown product type \"{}\"",
            payload.product_type.value
        ))
    })?;

    let mut tag_ids: Vec<i32> = payload.tags.iter().map(|tag| tag.value).collect();
    tag_ids.sort_unstable();
    tag_ids.dedup();

    let txn = state.db().begin().await?;

    let tags = if tag_ids.is_empty() {
        Vec::new()
    } else {
        ProductTags::find()
            .filter(product_tags::Column::Id.is_in(tag_ids.clone()))
            .order_by_asc(product_tags::Column::Name)
            .all(&txn)
            .await?
    };
    if let Some(missing) = tag_ids
        .iter()
        .find(|id| !tags.iter().any(|tag| tag.id == **id))
    {
        return Err(AppError::not_found("ProductTag", *missing));
    }

    let product = products::ActiveModel {
        id: NotSet,
        name: Set(payload.name),
        brand: Set(payload.brand),
        description: Set(payload.description),
        product_type: Set(product_type),
        price: Set(payload.price),
    }
    .insert(&txn)
    .await?;

    if !tag_ids.is_empty() {
        let links = tag_ids.iter().map(|tag_id| product_tag_links::ActiveModel {
            product_id: Set(product.id),
            tag_id: Set(*tag_id),
        });
        ProductTagLinks::insert_many(links)
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;

    tracing::info!(user = %user.email, product_id = product.id, tags = tag_ids.len(), "product created");

    Ok(ProductWithTags {
        product: product_from_entity(product),
        tags: tags.into_iter().map(tag_from_entity).collect(),
    })
}

/// Marks a product as a favorite of the caller. Repeated calls add repeated
/// rows; the presentation layer hides the action once a marker exists.
pub async fn favorite_product(
    state: &AppState,
    ctx: &Ctx,
    input: IdInput,
) -> AppResult<ProductMarker> {
    let user = ctx.require_user()?;
    validate(&input)?;
    ensure_product_exists(state.db(), input.id).await?;

    let favorite = user_product_favorites::ActiveModel {
        id: NotSet,
        product_id: Set(input.id),
        user: Set(user.email.clone()),
        added_at: NotSet,
    }
    .insert(state.db())
    .await?;

    tracing::info!(user = %user.email, product_id = input.id, "product favorited");
    Ok(favorite_from_entity(favorite))
}

/// Same contract as [`favorite_product`], for dislikes.
pub async fn dislike_product(
    state: &AppState,
    ctx: &Ctx,
    input: IdInput,
) -> AppResult<ProductMarker> {
    let user = ctx.require_user()?;
    validate(&input)?;
    ensure_product_exists(state.db(), input.id).await?;

    let dislike = user_product_dislikes::ActiveModel {
        id: NotSet,
        product_id: Set(input.id),
        user: Set(user.email.clone()),
        added_at: NotSet,
    }
    .insert(state.db())
    .await?;

    tracing::info!(user = %user.email, product_id = input.id, "product disliked");
    Ok(dislike_from_entity(dislike))
}

pub async fn rate_product(
    state: &AppState,
    ctx: &Ctx,
    payload: RateProductRequest,
) -> AppResult<ProductReview> {
    let user = ctx.require_user()?;
    validate(&payload)?;
    ensure_product_exists(state.db(), payload.id).await?;

    let review = product_reviews::ActiveModel {
        id: NotSet,
        product_id: Set(payload.id),
        user: Set(user.email.clone()),
        rating: Set(payload.rating),
        review: Set(payload.review),
        created_at: NotSet,
    }
    .insert(state.db())
    .await?;

    tracing::info!(user = %user.email, product_id = payload.id, rating = payload.rating, "product rated");
    Ok(review_from_entity(review))
}

pub async fn user_favorites(state: &AppState, ctx: &Ctx) -> AppResult<MarkerList> {
    let Some(user) = ctx.user.as_ref() else {
        return Ok(MarkerList { items: Vec::new() });
    };

    let items = UserProductFavorites::find()
        .filter(user_product_favorites::Column::User.eq(user.email.as_str()))
        .order_by_desc(user_product_favorites::Column::AddedAt)
        .find_also_related(Products)
        .all(state.db())
        .await?
        .into_iter()
        .filter_map(|(marker, product)| {
            product.map(|product| ProductMarkerWithProduct {
                marker: favorite_from_entity(marker),
                product: product_from_entity(product),
            })
        })
        .collect();
    Ok(MarkerList { items })
}

pub async fn user_dislikes(state: &AppState, ctx: &Ctx) -> AppResult<MarkerList> {
    let Some(user) = ctx.user.as_ref() else {
        return Ok(MarkerList { items: Vec::new() });
    };

    let items = UserProductDislikes::find()
        .filter(user_product_dislikes::Column::User.eq(user.email.as_str()))
        .order_by_desc(user_product_dislikes::Column::AddedAt)
        .find_also_related(Products)
        .all(state.db())
        .await?
        .into_iter()
        .filter_map(|(marker, product)| {
            product.map(|product| ProductMarkerWithProduct {
                marker: dislike_from_entity(marker),
                product: product_from_entity(product),
            })
        })
        .collect();
    Ok(MarkerList { items })
}

pub async fn user_ratings(state: &AppState, ctx: &Ctx) -> AppResult<ReviewList> {
    let Some(user) = ctx.user.as_ref() else {
        return Ok(ReviewList { items: Vec::new() });
    };

    let items = ProductReviews::find()
        .filter(product_reviews::Column::User.eq(user.email.as_str()))
        .order_by_desc(product_reviews::Column::CreatedAt)
        .find_also_related(Products)
        .all(state.db())
        .await?
        .into_iter()
        .filter_map(|(review, product)| {
            product.map(|product| ProductReviewWithProduct {
                review: review_from_entity(review),
                product: product_from_entity(product),
            })
        })
        .collect();
    Ok(ReviewList { items })
}

pub async fn delete_favorite(state: &AppState, ctx: &Ctx, input: IdInput) -> AppResult<()> {
    let user = ctx.require_user()?;
    validate(&input)?;

    let found = UserProductFavorites::find_by_id(input.id)
        .one(state.db())
        .await?;
    let favorite = ensure_owner(found, "UserProductFavorite", input.id, user)?;
    UserProductFavorites::delete_by_id(favorite.id)
        .exec(state.db())
        .await?;

    tracing::info!(user = %user.email, favorite_id = favorite.id, "favorite removed");
    Ok(())
}

pub async fn delete_dislike(state: &AppState, ctx: &Ctx, input: IdInput) -> AppResult<()> {
    let user = ctx.require_user()?;
    validate(&input)?;

    let found = UserProductDislikes::find_by_id(input.id)
        .one(state.db())
        .await?;
    let dislike = ensure_owner(found, "UserProductDislike", input.id, user)?;
    UserProductDislikes::delete_by_id(dislike.id)
        .exec(state.db())
        .await?;

    tracing::info!(user = %user.email, dislike_id = dislike.id, "dislike removed");
    Ok(())
}

pub async fn delete_review(state: &AppState, ctx: &Ctx, input: IdInput) -> AppResult<()> {
    let user = ctx.require_user()?;
    validate(&input)?;

    let found = ProductReviews::find_by_id(input.id).one(state.db()).await?;
    let review = ensure_owner(found, "ProductReview", input.id, user)?;
    ProductReviews::delete_by_id(review.id)
        .exec(state.db())
        .await?;

    tracing::info!(user = %user.email, review_id = review.id, "review removed");
    Ok(())
}

async fn ensure_product_exists<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<()> {
    match Products::find_by_id(id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found("Product", id)),
    }
}

/// Tags for each of the given products, keyed by product id.
pub(crate) async fn load_tags<C: ConnectionTrait>(
    db: &C,
    product_ids: &[i32],
) -> AppResult<HashMap<i32, Vec<ProductTag>>> {
    let mut by_product: HashMap<i32, Vec<ProductTag>> = HashMap::new();
    if product_ids.is_empty() {
        return Ok(by_product);
    }

    let links = ProductTagLinks::find()
        .filter(product_tag_links::Column::ProductId.is_in(product_ids.to_vec()))
        .find_also_related(ProductTags)
        .all(db)
        .await?;
    for (link, tag) in links {
        if let Some(tag) = tag {
            by_product
                .entry(link.product_id)
                .or_default()
                .push(tag_from_entity(tag));
        }
    }
    for tags in by_product.values_mut() {
        tags.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(by_product)
}

pub(crate) async fn attach_tags<C: ConnectionTrait>(
    db: &C,
    products: Vec<products::Model>,
) -> AppResult<Vec<ProductWithTags>> {
    let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
    let tags = load_tags(db, &ids).await?;
    Ok(products
        .into_iter()
        .map(|product| ProductWithTags {
            tags: tags.get(&product.id).cloned().unwrap_or_default(),
            product: product_from_entity(product),
        })
        .collect())
}
