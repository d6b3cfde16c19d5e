use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "polls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,

    pub title: String,

    /// RFC 3339 closing time.
    pub end_date: String,

    pub multi_options: bool,

    pub created_at: String,
}

// No foreign key onto users: the owning user id comes from the external
// identity provider and is trusted as given, so it may have no local row.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::poll_options::Entity")]
    PollOptions,
    #[sea_orm(has_many = "super::poll_votes::Entity")]
    PollVotes,
}

impl Related<super::poll_options::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PollOptions.def()
    }
}

impl Related<super::poll_votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PollVotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
