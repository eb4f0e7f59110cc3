use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "product_tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub color: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_tag_links::Entity")]
    ProductTagLinks,
}

impl Related<super::product_tag_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductTagLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
