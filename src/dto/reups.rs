use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    models::ReUpDetail,
    validation::{SelectOption, de_date, de_opt_date, de_opt_price, not_in_future},
};

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateReUpRequest {
    #[serde(deserialize_with = "de_date")]
    #[validate(custom(function = "not_in_future"))]
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[validate(length(min = 5, max = 255))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 5, max = 255))]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "de_opt_price")]
    #[validate(range(min = 0.01))]
    pub total: Option<f64>,
    #[serde(default)]
    #[validate(length(min = 5, max = 1000))]
    pub thoughts: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    #[schema(value_type = Option<Vec<SelectOption<i32>>>)]
    pub products: Option<Vec<SelectOption<i32>>>,
}

/// Field changes for an existing ReUp. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateReUpRequest {
    #[serde(default, deserialize_with = "de_opt_date")]
    #[validate(custom(function = "not_in_future"))]
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(length(min = 5, max = 255))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(min = 5, max = 255))]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "de_opt_price")]
    #[validate(range(min = 0.01))]
    pub total: Option<f64>,
    #[serde(default)]
    #[validate(length(min = 5, max = 1000))]
    pub thoughts: Option<String>,
}

/// Full replacement of a ReUp's fields; every field is required.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReplaceReUpRequest {
    #[serde(deserialize_with = "de_date")]
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub title: String,
    pub from: String,
    #[serde(deserialize_with = "crate::validation::de_price")]
    pub total: f64,
    pub thoughts: String,
}

impl From<ReplaceReUpRequest> for UpdateReUpRequest {
    fn from(req: ReplaceReUpRequest) -> Self {
        Self {
            date: Some(req.date),
            title: Some(req.title),
            from: Some(req.from),
            total: Some(req.total),
            thoughts: Some(req.thoughts),
        }
    }
}

impl UpdateReUpRequest {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.title.is_none()
            && self.from.is_none()
            && self.total.is_none()
            && self.thoughts.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct AddProductsRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(length(min = 1))]
    #[validate(nested)]
    #[schema(value_type = Vec<SelectOption<i32>>)]
    pub products: Vec<SelectOption<i32>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct AddUpdateRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(length(min = 5, max = 1000))]
    pub text: String,
}

/// Removes product `id` from ReUp `reUpId`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveProductRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(range(min = 1))]
    pub re_up_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ReUpList {
    #[schema(value_type = Vec<ReUpDetail>)]
    pub items: Vec<ReUpDetail>,
}
