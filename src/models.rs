use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{
    product_reviews, product_tags, products, products::ProductType, reup_products, reup_updates,
    reups, user_product_dislikes, user_product_favorites,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReUp {
    pub id: i32,
    pub user: String,
    pub date: NaiveDate,
    pub title: String,
    pub from: Option<String>,
    pub total: Option<f64>,
    pub thoughts: String,
}

/// A join row: this product was part of the ReUp, added at this time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReUpProduct {
    pub id: i32,
    pub re_up_id: i32,
    pub product_id: i32,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReUpWithProducts {
    #[serde(flatten)]
    pub reup: ReUp,
    pub products: Vec<ReUpProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReUpProductEntry {
    pub product: ProductWithTags,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReUpUpdate {
    pub id: i32,
    pub re_up_id: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A ReUp with its products (and their tags) and update timeline.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReUpDetail {
    #[serde(flatten)]
    pub reup: ReUp,
    pub products: Vec<ReUpProductEntry>,
    pub updates: Vec<ReUpUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub brand: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductTag {
    pub id: i32,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithTags {
    #[serde(flatten)]
    pub product: Product,
    pub tags: Vec<ProductTag>,
}

/// A per-user favorite or dislike on a product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductMarker {
    pub id: i32,
    pub product_id: i32,
    pub user: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductMarkerWithProduct {
    #[serde(flatten)]
    pub marker: ProductMarker,
    pub product: Product,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductReview {
    pub id: i32,
    pub product_id: i32,
    pub user: String,
    pub rating: i16,
    pub review: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductReviewWithProduct {
    #[serde(flatten)]
    pub review: ProductReview,
    pub product: Product,
}

/// Number of rows removed by a bulk delete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteCount {
    pub count: u64,
}

pub fn reup_from_entity(model: reups::Model) -> ReUp {
    ReUp {
        id: model.id,
        user: model.user,
        date: model.date,
        title: model.title,
        from: model.source,
        total: model.total,
        thoughts: model.thoughts,
    }
}

pub fn reup_product_from_entity(model: reup_products::Model) -> ReUpProduct {
    ReUpProduct {
        id: model.id,
        re_up_id: model.reup_id,
        product_id: model.product_id,
        added_at: model.added_at.with_timezone(&Utc),
    }
}

pub fn reup_update_from_entity(model: reup_updates::Model) -> ReUpUpdate {
    ReUpUpdate {
        id: model.id,
        re_up_id: model.reup_id,
        text: model.text,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub fn product_from_entity(model: products::Model) -> Product {
    Product {
        id: model.id,
        name: model.name,
        brand: model.brand,
        description: model.description,
        product_type: model.product_type,
        price: model.price,
    }
}

pub fn tag_from_entity(model: product_tags::Model) -> ProductTag {
    ProductTag {
        id: model.id,
        name: model.name,
        color: model.color,
    }
}

pub fn favorite_from_entity(model: user_product_favorites::Model) -> ProductMarker {
    ProductMarker {
        id: model.id,
        product_id: model.product_id,
        user: model.user,
        added_at: model.added_at.with_timezone(&Utc),
    }
}

pub fn dislike_from_entity(model: user_product_dislikes::Model) -> ProductMarker {
    ProductMarker {
        id: model.id,
        product_id: model.product_id,
        user: model.user,
        added_at: model.added_at.with_timezone(&Utc),
    }
}

pub fn review_from_entity(model: product_reviews::Model) -> ProductReview {
    ProductReview {
        id: model.id,
        product_id: model.product_id,
        user: model.user,
        rating: model.rating,
        review: model.review,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
