use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    EmailSent,
    EmailOpened,
    LinkClicked,
    Replied,
    Bounced,
    Unsubscribed,
    MeetingBooked,
}

impl ActivityType {
    pub const ALL: [ActivityType; 7] = [
        ActivityType::EmailSent,
        ActivityType::EmailOpened,
        ActivityType::LinkClicked,
        ActivityType::Replied,
        ActivityType::Bounced,
        ActivityType::Unsubscribed,
        ActivityType::MeetingBooked,
    ];
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmailSent => write!(f, "email_sent"),
            Self::EmailOpened => write!(f, "email_opened"),
            Self::LinkClicked => write!(f, "link_clicked"),
            Self::Replied => write!(f, "replied"),
            Self::Bounced => write!(f, "bounced"),
            Self::Unsubscribed => write!(f, "unsubscribed"),
            Self::MeetingBooked => write!(f, "meeting_booked"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ActivityEvent {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub lead_id: Option<Uuid>,
    pub campaign_id: Option<Uuid>,
    pub event_type: ActivityType,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}
