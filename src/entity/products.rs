use sea_orm::Iterable;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub brand: String,
    pub description: Option<String>,
    pub product_type: ProductType,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
}

/// Product category, stored as its snake_case name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    #[sea_orm(string_value = "flower")]
    Flower,
    #[sea_orm(string_value = "pre_roll")]
    PreRoll,
    #[sea_orm(string_value = "concentrate")]
    Concentrate,
    #[sea_orm(string_value = "vape")]
    Vape,
    #[sea_orm(string_value = "edible")]
    Edible,
    #[sea_orm(string_value = "tincture")]
    Tincture,
    #[sea_orm(string_value = "topical")]
    Topical,
    #[sea_orm(string_value = "accessory")]
    Accessory,
    #[sea_orm(string_value = "other")]
    Other,
}

impl ProductType {
    /// Parses either the stored name (`pre_roll`) or a display label (`Pre Roll`).
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Self::iter().find(|kind| kind.to_value() == normalized)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_tag_links::Entity")]
    ProductTagLinks,
    #[sea_orm(has_many = "super::reup_products::Entity")]
    ReUpProducts,
    #[sea_orm(has_many = "super::user_product_favorites::Entity")]
    Favorites,
    #[sea_orm(has_many = "super::user_product_dislikes::Entity")]
    Dislikes,
    #[sea_orm(has_many = "super::product_reviews::Entity")]
    Reviews,
}

impl Related<super::product_tag_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductTagLinks.def()
    }
}

impl Related<super::product_tags::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_tag_links::Relation::ProductTags.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_tag_links::Relation::Products.def().rev())
    }
}

impl Related<super::reup_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReUpProducts.def()
    }
}

impl Related<super::user_product_favorites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl Related<super::user_product_dislikes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dislikes.def()
    }
}

impl Related<super::product_reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::ProductType;

    #[test]
    fn parses_stored_names_and_labels() {
        assert_eq!(ProductType::parse("flower"), Some(ProductType::Flower));
        assert_eq!(ProductType::parse("Pre Roll"), Some(ProductType::PreRoll));
        assert_eq!(ProductType::parse("pre-roll"), Some(ProductType::PreRoll));
        assert_eq!(ProductType::parse("spaceship"), None);
    }
}
