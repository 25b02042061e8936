use super::random_id;
use crate::domain::organization::Organization;
use crate::domain::seed_plan::SeedPlan;
use chrono::{DateTime, Utc};
use rand::Rng;

pub fn build_organization<R: Rng + ?Sized>(
    rng: &mut R,
    plan: &SeedPlan,
    now: DateTime<Utc>,
) -> Organization {
    Organization {
        id: random_id(rng),
        name: plan.organization_name.trim().to_string(),
        slug: plan.organization_slug.trim().to_string(),
        domain: plan.organization_domain.trim().to_lowercase(),
        market_focus: plan.market_focus.trim().to_string(),
        created_at: now,
    }
}
