use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reup_products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub reup_id: i32,
    pub product_id: i32,
    pub added_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reups::Entity",
        from = "Column::ReupId",
        to = "super::reups::Column::Id"
    )]
    ReUps,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Products,
}

impl Related<super::reups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReUps.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
