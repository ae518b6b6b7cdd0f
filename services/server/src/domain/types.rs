//! Domain types owned by the server service.
//!
//! The password hash stays in the data layer; it never appears on these
//! types and therefore never leaves `infra/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Merchant ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merchant {
    pub id: Uuid,
    pub email: String,
    pub business_name: String,
    /// `None` marks a legacy account created before multi-tenancy.
    pub tenant_id: Option<Uuid>,
    pub is_active: bool,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMerchant {
    pub email: String,
    pub business_name: String,
    /// Already hashed by the upstream auth service.
    pub password_hash: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MerchantUpdate {
    pub business_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

impl MerchantUpdate {
    pub fn is_empty(&self) -> bool {
        self.business_name.is_none() && self.phone.is_none() && self.is_active.is_none()
    }
}

// ── Queue ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queue {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub max_size: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQueue {
    pub merchant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub max_size: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct QueueUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub max_size: Option<i32>,
}

impl QueueUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
            && self.max_size.is_none()
    }
}

// ── Queue entry ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Waiting,
    Called,
    Served,
    Cancelled,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Called => "called",
            Self::Served => "served",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(Self::Waiting),
            "called" => Some(Self::Called),
            "served" => Some(Self::Served),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// A terminal entry never moves again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Served | Self::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: Uuid,
    pub queue_id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub position: i32,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    pub called_at: Option<DateTime<Utc>>,
    pub served_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub customer_name: String,
    pub customer_phone: Option<String>,
}

// ── Chat session ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    Open,
    Closed,
}

impl ChatStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    pub id: Uuid,
    pub queue_id: Uuid,
    pub visitor_name: String,
    pub visitor_phone: Option<String>,
    pub status: ChatStatus,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewChatSession {
    pub queue_id: Uuid,
    pub visitor_name: String,
    pub visitor_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_round_trip_entry_status_strings() {
        for status in [
            EntryStatus::Waiting,
            EntryStatus::Called,
            EntryStatus::Served,
            EntryStatus::Cancelled,
        ] {
            assert_eq!(EntryStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(EntryStatus::from_str("seated"), None);
    }

    #[test]
    fn should_mark_served_and_cancelled_terminal() {
        assert!(!EntryStatus::Waiting.is_terminal());
        assert!(!EntryStatus::Called.is_terminal());
        assert!(EntryStatus::Served.is_terminal());
        assert!(EntryStatus::Cancelled.is_terminal());
    }

    #[test]
    fn should_detect_empty_updates() {
        assert!(MerchantUpdate::default().is_empty());
        assert!(QueueUpdate::default().is_empty());
        let update = QueueUpdate {
            name: Some("lunch".to_owned()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
