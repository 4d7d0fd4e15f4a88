//! Topic entity (a note tree rooted at one block)

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "topics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub root_id: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::block::Entity",
        from = "Column::RootId",
        to = "super::block::Column::Id"
    )]
    RootBlock,
}

impl Related<super::block::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RootBlock.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
