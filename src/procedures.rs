//! Named procedure surface (`reups.*`, `products.*`, `tags.*`).
//!
//! Every procedure takes an untyped JSON input plus the caller context and
//! returns a JSON result. Mutations reject anonymous callers before looking at
//! the input; queries answer anonymous callers with an empty result.

use std::{fmt, str::FromStr};

use serde::Serialize;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::Ctx,
    services::{product_service, reup_service, tag_service},
    state::AppState,
    validation::decode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    ReUpsList,
    ReUpsGet,
    ReUpsCreate,
    ReUpsAddProducts,
    ReUpsAddUpdate,
    ReUpsRemoveProduct,
    ReUpsDelete,
    ProductsList,
    ProductsGet,
    ProductsCreate,
    ProductsFavorite,
    ProductsDislike,
    ProductsRate,
    ProductsUserFavorites,
    ProductsUserDislikes,
    ProductsUserRatings,
    ProductsDeleteFavorite,
    ProductsDeleteDislike,
    ProductsDeleteReview,
    TagsList,
    TagsGet,
}

impl Procedure {
    pub const ALL: [Procedure; 21] = [
        Procedure::ReUpsList,
        Procedure::ReUpsGet,
        Procedure::ReUpsCreate,
        Procedure::ReUpsAddProducts,
        Procedure::ReUpsAddUpdate,
        Procedure::ReUpsRemoveProduct,
        Procedure::ReUpsDelete,
        Procedure::ProductsList,
        Procedure::ProductsGet,
        Procedure::ProductsCreate,
        Procedure::ProductsFavorite,
        Procedure::ProductsDislike,
        Procedure::ProductsRate,
        Procedure::ProductsUserFavorites,
        Procedure::ProductsUserDislikes,
        Procedure::ProductsUserRatings,
        Procedure::ProductsDeleteFavorite,
        Procedure::ProductsDeleteDislike,
        Procedure::ProductsDeleteReview,
        Procedure::TagsList,
        Procedure::TagsGet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Procedure::ReUpsList => "reups.list",
            Procedure::ReUpsGet => "reups.get",
            Procedure::ReUpsCreate => "reups.create",
            Procedure::ReUpsAddProducts => "reups.add-products",
            Procedure::ReUpsAddUpdate => "reups.add-update",
            Procedure::ReUpsRemoveProduct => "reups.remove-product",
            Procedure::ReUpsDelete => "reups.delete",
            Procedure::ProductsList => "products.list",
            Procedure::ProductsGet => "products.get",
            Procedure::ProductsCreate => "products.create",
            Procedure::ProductsFavorite => "products.favorite",
            Procedure::ProductsDislike => "products.dislike",
            Procedure::ProductsRate => "products.rate",
            Procedure::ProductsUserFavorites => "products.user-favorites",
            Procedure::ProductsUserDislikes => "products.user-dislikes",
            Procedure::ProductsUserRatings => "products.user-ratings",
            Procedure::ProductsDeleteFavorite => "products.delete-favorite",
            Procedure::ProductsDeleteDislike => "products.delete-dislike",
            Procedure::ProductsDeleteReview => "products.delete-review",
            Procedure::TagsList => "tags.list",
            Procedure::TagsGet => "tags.get",
        }
    }

    /// Read-only procedures; everything else is a mutation.
    pub fn is_query(self) -> bool {
        matches!(
            self,
            Procedure::ReUpsList
                | Procedure::ReUpsGet
                | Procedure::ProductsList
                | Procedure::ProductsGet
                | Procedure::ProductsUserFavorites
                | Procedure::ProductsUserDislikes
                | Procedure::ProductsUserRatings
                | Procedure::TagsList
                | Procedure::TagsGet
        )
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Procedure {
    type Err = AppError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Procedure::ALL
            .into_iter()
            .find(|procedure| procedure.name() == name)
            .ok_or_else(|| AppError::NotFound(format!("No procedure named '{name}'")))
    }
}

fn to_json<T: Serialize>(value: T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|err| AppError::Internal(err.into()))
}

/// What a query answers to an anonymous caller: `null` for single-row gets,
/// an empty list otherwise.
fn anonymous_result(procedure: Procedure) -> Value {
    match procedure {
        Procedure::ReUpsGet | Procedure::ProductsGet | Procedure::TagsGet => Value::Null,
        _ => Value::Array(Vec::new()),
    }
}

fn empty() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Runs `procedure` for the caller in `ctx`.
pub async fn call(
    state: &AppState,
    ctx: &Ctx,
    procedure: Procedure,
    input: Value,
) -> AppResult<Value> {
    if procedure.is_query() {
        if ctx.user.is_none() {
            return Ok(anonymous_result(procedure));
        }
    } else {
        ctx.require_user()?;
    }
    tracing::debug!(procedure = %procedure, authenticated = ctx.user.is_some(), "calling procedure");

    match procedure {
        Procedure::ReUpsList => to_json(reup_service::list_reups(state, ctx).await?),
        Procedure::ReUpsGet => to_json(reup_service::get_reup(state, ctx, decode(input)?).await?),
        Procedure::ReUpsCreate => {
            to_json(reup_service::create_reup(state, ctx, decode(input)?).await?)
        }
        Procedure::ReUpsAddProducts => {
            to_json(reup_service::add_products(state, ctx, decode(input)?).await?)
        }
        Procedure::ReUpsAddUpdate => {
            to_json(reup_service::add_update(state, ctx, decode(input)?).await?)
        }
        Procedure::ReUpsRemoveProduct => {
            to_json(reup_service::remove_product(state, ctx, decode(input)?).await?)
        }
        Procedure::ReUpsDelete => {
            to_json(reup_service::delete_reup(state, ctx, decode(input)?).await?)
        }
        Procedure::ProductsList => to_json(product_service::list_products(state, ctx).await?),
        Procedure::ProductsGet => {
            to_json(product_service::get_product(state, ctx, decode(input)?).await?)
        }
        Procedure::ProductsCreate => {
            to_json(product_service::create_product(state, ctx, decode(input)?).await?)
        }
        Procedure::ProductsFavorite => {
            to_json(product_service::favorite_product(state, ctx, decode(input)?).await?)
        }
        Procedure::ProductsDislike => {
            to_json(product_service::dislike_product(state, ctx, decode(input)?).await?)
        }
        Procedure::ProductsRate => {
            to_json(product_service::rate_product(state, ctx, decode(input)?).await?)
        }
        Procedure::ProductsUserFavorites => {
            to_json(product_service::user_favorites(state, ctx).await?)
        }
        Procedure::ProductsUserDislikes => {
            to_json(product_service::user_dislikes(state, ctx).await?)
        }
        Procedure::ProductsUserRatings => to_json(product_service::user_ratings(state, ctx).await?),
        Procedure::ProductsDeleteFavorite => {
            product_service::delete_favorite(state, ctx, decode(input)?).await?;
            Ok(empty())
        }
        Procedure::ProductsDeleteDislike => {
            product_service::delete_dislike(state, ctx, decode(input)?).await?;
            Ok(empty())
        }
        Procedure::ProductsDeleteReview => {
            product_service::delete_review(state, ctx, decode(input)?).await?;
            Ok(empty())
        }
        Procedure::TagsList => to_json(tag_service::list_tags(state, ctx).await?),
        Procedure::TagsGet => to_json(tag_service::get_tag(state, ctx, decode(input)?).await?),
    }
}
