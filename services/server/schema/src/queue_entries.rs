use sea_orm::entity::prelude::*;

/// A customer waiting in (or served from) a queue.
///
/// Tenant affiliation is two hops away: entry → queue → merchant.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "queue_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub queue_id: Uuid,
    pub customer_name: String,
    #[sea_orm(nullable)]
    pub customer_phone: Option<String>,
    pub position: i32,
    /// waiting | called | served | cancelled
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[sea_orm(nullable)]
    pub called_at: Option<chrono::DateTime<chrono::Utc>>,
    #[sea_orm(nullable)]
    pub served_at: Option<chrono::DateTime<chrono::Utc>>,
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
