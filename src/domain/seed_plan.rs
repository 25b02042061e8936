//! Parameters of one provisioning run.

use crate::domain::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

pub const DEFAULT_LEAD_COUNT: i64 = 2000;
pub const DEFAULT_ICEBREAKER_PROBABILITY: f64 = 0.975;

#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SeedPlan {
    #[validate(length(min = 1, max = 200))]
    pub organization_name: String,
    #[validate(length(min = 1, max = 100))]
    pub organization_slug: String,
    #[validate(length(min = 1, max = 253))]
    pub organization_domain: String,
    #[validate(length(min = 1, max = 200))]
    pub market_focus: String,
    #[validate(range(min = 0, max = 100000))]
    pub lead_count: i64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub icebreaker_probability: f64,
    #[validate(range(min = 0, max = 100000))]
    pub activity_event_count: i64,
    #[validate(range(min = 1, max = 365))]
    pub activity_window_days: i64,
    #[validate(range(min = 1, max = 5000))]
    pub batch_size: i64,
    #[validate(email)]
    pub customer_email: String,
    #[validate(length(min = 8))]
    pub customer_password: String,
    #[validate(length(min = 1, max = 200))]
    pub customer_full_name: String,
    pub sender_name: String,
    pub rng_seed: Option<u64>,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            organization_name: "X Assure Demo Agency".to_string(),
            organization_slug: "x-assure-demo".to_string(),
            organization_domain: "xassure-demo.com".to_string(),
            market_focus: "independent P&C insurance agencies".to_string(),
            lead_count: DEFAULT_LEAD_COUNT,
            icebreaker_probability: DEFAULT_ICEBREAKER_PROBABILITY,
            activity_event_count: 150,
            activity_window_days: 14,
            batch_size: 500,
            customer_email: "demo.customer@xassure-demo.com".to_string(),
            customer_password: "demo-portal-2024".to_string(),
            customer_full_name: "Dana Whitfield".to_string(),
            sender_name: "Jordan from X Assure".to_string(),
            rng_seed: None,
        }
    }
}

impl fmt::Debug for SeedPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedPlan")
            .field("organization_name", &self.organization_name)
            .field("organization_slug", &self.organization_slug)
            .field("organization_domain", &self.organization_domain)
            .field("market_focus", &self.market_focus)
            .field("lead_count", &self.lead_count)
            .field("icebreaker_probability", &self.icebreaker_probability)
            .field("activity_event_count", &self.activity_event_count)
            .field("activity_window_days", &self.activity_window_days)
            .field("batch_size", &self.batch_size)
            .field("customer_email", &self.customer_email)
            .field("customer_password", &"<redacted>")
            .field("customer_full_name", &self.customer_full_name)
            .field("sender_name", &self.sender_name)
            .field("rng_seed", &self.rng_seed)
            .finish()
    }
}

/// Counts of a validated plan, ready for the generators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedCounts {
    pub leads: usize,
    pub activity_events: usize,
    pub activity_window_days: u32,
    pub batch_size: usize,
}

impl SeedPlan {
    /// Validates every field and narrows the counts. Nothing is generated on failure.
    pub fn counts(&self) -> Result<SeedCounts> {
        self.validate()?;
        // range checks pass NaN through
        if !self.icebreaker_probability.is_finite() {
            return Err(AppError::ValidationError(format!(
                "icebreaker_probability must be a number between 0 and 1, got {}",
                self.icebreaker_probability
            )));
        }
        Ok(SeedCounts {
            leads: validate_count("lead_count", self.lead_count)?,
            activity_events: validate_count("activity_event_count", self.activity_event_count)?,
            activity_window_days: u32::try_from(self.activity_window_days).map_err(|_| {
                AppError::ValidationError("activity_window_days is out of range".to_string())
            })?,
            batch_size: validate_count("batch_size", self.batch_size)?,
        })
    }
}

/// Rejects negative counts before any generation starts.
pub fn validate_count(name: &str, value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        AppError::ValidationError(format!(
            "{} must be a non-negative integer, got {}",
            name, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_is_valid() {
        let counts = SeedPlan::default().counts().unwrap();
        assert_eq!(counts.leads, 2000);
        assert_eq!(counts.batch_size, 500);
        assert!(counts.activity_events > 0);
    }

    #[test]
    fn test_negative_lead_count_rejected() {
        let plan = SeedPlan {
            lead_count: -1,
            ..Default::default()
        };
        let err = plan.counts().unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        let plan = SeedPlan {
            icebreaker_probability: 1.5,
            ..Default::default()
        };
        assert!(plan.counts().is_err());
    }

    #[test]
    fn test_non_finite_probability_rejected() {
        for probability in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let plan = SeedPlan {
                icebreaker_probability: probability,
                ..Default::default()
            };
            let err = plan.counts().unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)), "{} accepted", probability);
        }
    }

    #[test]
    fn test_debug_hides_customer_password() {
        let rendered = format!("{:?}", SeedPlan::default());
        assert!(!rendered.contains("demo-portal-2024"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_bad_customer_email_rejected() {
        let plan = SeedPlan {
            customer_email: "not-an-email".to_string(),
            ..Default::default()
        };
        assert!(plan.counts().is_err());
    }

    #[test]
    fn test_zero_leads_allowed() {
        let plan = SeedPlan {
            lead_count: 0,
            ..Default::default()
        };
        assert_eq!(plan.counts().unwrap().leads, 0);
    }

    #[test]
    fn test_validate_count() {
        assert_eq!(validate_count("n", 0).unwrap(), 0);
        assert_eq!(validate_count("n", 42).unwrap(), 42);
        assert!(validate_count("n", -7).is_err());
    }
}
