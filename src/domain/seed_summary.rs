use serde::Serialize;
use std::fmt;

use crate::domain::error::AppError;

/// Ordered stages of a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStage {
    Organization,
    Leads,
    Campaigns,
    CustomerUser,
    ActivityFeed,
}

impl fmt::Display for SeedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organization => write!(f, "organization"),
            Self::Leads => write!(f, "leads"),
            Self::Campaigns => write!(f, "campaigns"),
            Self::CustomerUser => write!(f, "customer user"),
            Self::ActivityFeed => write!(f, "activity feed"),
        }
    }
}

/// Rows written so far, per entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub organizations: usize,
    pub leads: usize,
    pub leads_with_icebreakers: usize,
    pub campaigns: usize,
    pub sequence_steps: usize,
    pub customer_users: usize,
    pub activity_events: usize,
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  organizations:   {}", self.organizations)?;
        writeln!(
            f,
            "  leads:           {} ({} with icebreakers)",
            self.leads, self.leads_with_icebreakers
        )?;
        writeln!(
            f,
            "  campaigns:       {} ({} sequence steps)",
            self.campaigns, self.sequence_steps
        )?;
        writeln!(f, "  customer users:  {}", self.customer_users)?;
        write!(f, "  activity events: {}", self.activity_events)
    }
}

/// A stage failure with the progress made before it.
#[derive(Debug)]
pub struct SeedFailure {
    pub stage: SeedStage,
    pub completed: SeedSummary,
    pub cause: AppError,
}

impl fmt::Display for SeedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seeding failed at stage '{}': {}\ncompleted before failure:\n{}",
            self.stage, self.cause, self.completed
        )
    }
}

impl std::error::Error for SeedFailure {}
