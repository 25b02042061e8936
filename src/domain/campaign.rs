use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Active => write!(f, "active"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Campaign {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub status: CampaignStatus,
    pub daily_send_limit: u32,
    pub created_at: DateTime<Utc>,
}

/// One timed message of a campaign sequence.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SequenceStep {
    pub id: Uuid,
    pub campaign_id: Uuid,
    /// 1-based send order, contiguous within a campaign.
    pub step_number: u32,
    /// Days after the previous step (0 for the first).
    pub delay_days: u32,
    pub subject: String,
    pub body: String,
}

/// A campaign together with the steps it exclusively owns.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignWithSequence {
    pub campaign: Campaign,
    pub steps: Vec<SequenceStep>,
}

impl CampaignWithSequence {
    pub fn step(&self, step_number: u32) -> Option<&SequenceStep> {
        self.steps.iter().find(|step| step.step_number == step_number)
    }
}
