use super::random_id;
use crate::domain::activity_event::{ActivityEvent, ActivityType};
use crate::domain::campaign::Campaign;
use crate::domain::lead::Lead;
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

// Relative weights, same order as ActivityType::ALL.
const TYPE_WEIGHTS: [u32; 7] = [40, 25, 10, 8, 6, 4, 7];

/// Builds `count` feed events over the last `window_days`, oldest first.
///
/// Events only reference the leads and campaigns handed in. With neither
/// available there is nothing to reference and no events are produced.
pub fn generate_activity<R: Rng + ?Sized>(
    rng: &mut R,
    organization_id: Uuid,
    leads: &[Lead],
    campaigns: &[Campaign],
    count: usize,
    window_days: u32,
    now: DateTime<Utc>,
) -> Vec<ActivityEvent> {
    if leads.is_empty() && campaigns.is_empty() {
        return Vec::new();
    }

    let window_secs = (i64::from(window_days.max(1)) * 24 * 60 * 60).max(1);
    let mut events: Vec<ActivityEvent> = (0..count)
        .map(|_| {
            let event_type = weighted_type(rng);
            let lead = leads.choose(rng);
            let campaign = campaigns.choose(rng);
            ActivityEvent {
                id: random_id(rng),
                organization_id,
                lead_id: lead.map(|l| l.id),
                campaign_id: campaign.map(|c| c.id),
                event_type,
                description: describe(event_type, lead, campaign),
                occurred_at: now - Duration::seconds(rng.gen_range(0..window_secs)),
            }
        })
        .collect();

    events.sort_by_key(|event| event.occurred_at);
    events
}

fn weighted_type<R: Rng + ?Sized>(rng: &mut R) -> ActivityType {
    let total: u32 = TYPE_WEIGHTS.iter().sum();
    let mut roll = rng.gen_range(0..total);
    for (event_type, weight) in ActivityType::ALL.iter().zip(TYPE_WEIGHTS) {
        if roll < weight {
            return *event_type;
        }
        roll -= weight;
    }
    ActivityType::EmailSent
}

fn describe(event_type: ActivityType, lead: Option<&Lead>, campaign: Option<&Campaign>) -> String {
    let who = lead
        .map(|l| format!("{} {} ({})", l.first_name, l.last_name, l.company_name))
        .unwrap_or_else(|| "a lead".to_string());
    let what = campaign
        .map(|c| format!(" in \"{}\"", c.name))
        .unwrap_or_default();

    match event_type {
        ActivityType::EmailSent => format!("Email sent to {}{}", who, what),
        ActivityType::EmailOpened => format!("{} opened an email{}", who, what),
        ActivityType::LinkClicked => format!("{} clicked a link{}", who, what),
        ActivityType::Replied => format!("{} replied{}", who, what),
        ActivityType::Bounced => format!("Email to {} bounced{}", who, what),
        ActivityType::Unsubscribed => format!("{} unsubscribed{}", who, what),
        ActivityType::MeetingBooked => format!("{} booked a meeting{}", who, what),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::generators::{build_organization, generate_campaigns, generate_leads};
    use crate::domain::seed_plan::SeedPlan;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_events_reference_known_rows_within_window() {
        let mut rng = StdRng::seed_from_u64(77);
        let now = Utc::now();
        let org = build_organization(&mut rng, &SeedPlan::default(), now);
        let leads = generate_leads(&mut rng, &org, 40, 0.975, now);
        let campaigns: Vec<Campaign> = generate_campaigns(&mut rng, &org, now)
            .into_iter()
            .map(|c| c.campaign)
            .collect();

        let events = generate_activity(&mut rng, org.id, &leads, &campaigns, 300, 14, now);
        assert_eq!(events.len(), 300);

        let lead_ids: HashSet<Uuid> = leads.iter().map(|l| l.id).collect();
        let campaign_ids: HashSet<Uuid> = campaigns.iter().map(|c| c.id).collect();
        let oldest = now - Duration::days(14);
        for event in &events {
            assert_eq!(event.organization_id, org.id);
            assert!(lead_ids.contains(&event.lead_id.unwrap()));
            assert!(campaign_ids.contains(&event.campaign_id.unwrap()));
            assert!(event.occurred_at <= now && event.occurred_at >= oldest);
        }
    }

    #[test]
    fn test_events_sorted_by_time() {
        let mut rng = StdRng::seed_from_u64(8);
        let now = Utc::now();
        let org = build_organization(&mut rng, &SeedPlan::default(), now);
        let leads = generate_leads(&mut rng, &org, 10, 0.975, now);
        let events = generate_activity(&mut rng, org.id, &leads, &[], 100, 7, now);
        assert!(events.windows(2).all(|w| w[0].occurred_at <= w[1].occurred_at));
        assert!(events.iter().all(|e| e.campaign_id.is_none() && e.lead_id.is_some()));
    }

    #[test]
    fn test_nothing_to_reference_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(8);
        let events = generate_activity(&mut rng, Uuid::new_v4(), &[], &[], 100, 7, Utc::now());
        assert!(events.is_empty());
    }

    #[test]
    fn test_campaign_only_feed_when_no_leads() {
        let mut rng = StdRng::seed_from_u64(12);
        let now = Utc::now();
        let org = build_organization(&mut rng, &SeedPlan::default(), now);
        let campaigns: Vec<Campaign> = generate_campaigns(&mut rng, &org, now)
            .into_iter()
            .map(|c| c.campaign)
            .collect();
        let events = generate_activity(&mut rng, org.id, &[], &campaigns, 5, 7, now);
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.lead_id.is_none() && e.campaign_id.is_some()));
    }
}
