use serde::Serialize;
use utoipa::ToSchema;

use crate::models::ProductTag;

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TagList {
    #[schema(value_type = Vec<ProductTag>)]
    pub items: Vec<ProductTag>,
}
