use sea_orm::{EntityTrait, QueryOrder};

use crate::{
    dto::{IdInput, tags::TagList},
    entity::{ProductTags, product_tags::Column},
    error::AppResult,
    middleware::auth::Ctx,
    models::{ProductTag, tag_from_entity},
    state::AppState,
    validation::validate,
};

pub async fn list_tags(state: &AppState, ctx: &Ctx) -> AppResult<TagList> {
    if ctx.user.is_none() {
        return Ok(TagList { items: Vec::new() });
    }

    let tags = ProductTags::find()
        .order_by_asc(Column::Name)
        .all(state.db())
        .await?
        .into_iter()
        .map(tag_from_entity)
        .collect();
    Ok(TagList { items: tags })
}

pub async fn get_tag(state: &AppState, ctx: &Ctx, input: IdInput) -> AppResult<Option<ProductTag>> {
    if ctx.user.is_none() {
        return Ok(None);
    }
    validate(&input)?;

    let tag = ProductTags::find_by_id(input.id)
        .one(state.db())
        .await?
        .map(tag_from_entity);
    Ok(tag)
}
