use sea_orm::entity::prelude::*;

/// Web-chat session a visitor opened against a queue.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "chat_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub queue_id: Uuid,
    pub visitor_name: String,
    #[sea_orm(nullable)]
    pub visitor_phone: Option<String>,
    /// open | closed
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[sea_orm(nullable)]
    pub closed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::queues::Entity",
        from = "Column::QueueId",
        to = "super::queues::Column::Id"
    )]
    Queues,
}

impl Related<super::queues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Queues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
