use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant that owns every other seeded row.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    /// Uniqueness key in the store; a second run with the same slug is rejected.
    pub slug: String,
    pub domain: String,
    /// Market the agency sells into, used to flavor icebreaker text.
    pub market_focus: String,
    pub created_at: DateTime<Utc>,
}
