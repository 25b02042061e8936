use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Replied,
    Interested,
    Unsubscribed,
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Contacted => write!(f, "contacted"),
            Self::Replied => write!(f, "replied"),
            Self::Interested => write!(f, "interested"),
            Self::Unsubscribed => write!(f, "unsubscribed"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Lead {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub title: String,
    pub company_name: String,
    pub company_domain: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub lines_of_business: Vec<String>,
    pub status: LeadStatus,
    /// Absent for leads whose enrichment never completed.
    pub icebreaker: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn has_icebreaker(&self) -> bool {
        self.icebreaker
            .as_deref()
            .map(|text| !text.trim().is_empty())
            .unwrap_or(false)
    }
}
