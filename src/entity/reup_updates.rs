use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reup_updates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub reup_id: i32,
    pub text: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reups::Entity",
        from = "Column::ReupId",
        to = "super::reups::Column::Id"
    )]
    ReUps,
}

impl Related<super::reups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReUps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
