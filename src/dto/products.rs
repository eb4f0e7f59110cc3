use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    models::{ProductMarkerWithProduct, ProductReviewWithProduct, ProductWithTags},
    validation::{SelectOption, de_price},
};

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 4, max = 255))]
    pub name: String,
    #[validate(length(min = 4, max = 255))]
    pub brand: String,
    #[serde(default)]
    #[validate(length(min = 5, max = 1000))]
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[schema(value_type = SelectOption<String>)]
    pub product_type: SelectOption<String>,
    #[serde(deserialize_with = "de_price")]
    #[validate(range(min = 0.01))]
    pub price: f64,
    #[serde(default)]
    #[validate(nested)]
    #[schema(value_type = Vec<SelectOption<i32>>)]
    pub tags: Vec<SelectOption<i32>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct RateProductRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(min = 5, max = 1000))]
    pub review: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<ProductWithTags>)]
    pub items: Vec<ProductWithTags>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MarkerList {
    #[schema(value_type = Vec<ProductMarkerWithProduct>)]
    pub items: Vec<ProductMarkerWithProduct>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ReviewList {
    #[schema(value_type = Vec<ProductReviewWithProduct>)]
    pub items: Vec<ProductReviewWithProduct>,
}
