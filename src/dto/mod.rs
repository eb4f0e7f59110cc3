pub mod auth;
pub mod products;
pub mod reups;
pub mod tags;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Input of every procedure that addresses a single row by id.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Validate, ToSchema)]
pub struct IdInput {
    #[validate(range(min = 1))]
    pub id: i32,
}
