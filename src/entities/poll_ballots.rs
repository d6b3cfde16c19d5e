use sea_orm::entity::prelude::*;

/// One row per (poll, user) that has voted. The unique index on this pair is
/// the already-voted gate: inserting it in the same transaction as the vote
/// rows turns the check-then-insert race into a constraint violation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "poll_ballots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub poll_id: String,

    pub user_id: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::polls::Entity",
        from = "Column::PollId",
        to = "super::polls::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Polls,
}

impl Related<super::polls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Polls.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
