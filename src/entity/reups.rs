use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user: String,
    pub date: Date,
    pub title: String,
    pub source: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub total: Option<f64>,
    pub thoughts: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reup_products::Entity")]
    ReUpProducts,
    #[sea_orm(has_many = "super::reup_updates::Entity")]
    ReUpUpdates,
}

impl Related<super::reup_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReUpProducts.def()
    }
}

impl Related<super::reup_updates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReUpUpdates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
