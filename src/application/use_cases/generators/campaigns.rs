use super::random_id;
use crate::domain::campaign::{Campaign, CampaignStatus, CampaignWithSequence, SequenceStep};
use crate::domain::organization::Organization;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

struct StepBlueprint {
    delay_days: u32,
    subject: &'static str,
    body: &'static str,
}

struct CampaignBlueprint {
    name: &'static str,
    status: CampaignStatus,
    steps: &'static [StepBlueprint],
}

const BLUEPRINTS: &[CampaignBlueprint] = &[
    CampaignBlueprint {
        name: "Commercial Lines Intro",
        status: CampaignStatus::Active,
        steps: &[
            StepBlueprint {
                delay_days: 0,
                subject: "Quick question about {{company}}",
                body: "Hi {{first_name}},\n\n{{icebreaker}}\n\nWe help agencies like {{company}} place tough commercial risks without adding headcount. Worth a 15 minute call next week?\n\n{{sender_name}}",
            },
            StepBlueprint {
                delay_days: 3,
                subject: "Re: Quick question about {{company}}",
                body: "Hi {{first_name}},\n\nFloating this back up. Most of the agencies we work with see quotes back in under 48 hours.\n\n{{sender_name}}",
            },
            StepBlueprint {
                delay_days: 4,
                subject: "Carrier access for {{company}}",
                body: "{{first_name}}, happy to share the carrier list we open up for partners writing commercial auto and GL. Want me to send it over?\n\n{{sender_name}}",
            },
            StepBlueprint {
                delay_days: 7,
                subject: "Closing the loop",
                body: "Hi {{first_name}},\n\nI'll stop reaching out after this one. If timing changes at {{company}}, just reply here.\n\n{{sender_name}}",
            },
        ],
    },
    CampaignBlueprint {
        name: "Personal Lines Follow-up",
        status: CampaignStatus::Draft,
        steps: &[
            StepBlueprint {
                delay_days: 0,
                subject: "{{first_name}}, a thought on renewals",
                body: "Hi {{first_name}},\n\n{{icebreaker}}\n\nRenewal season is squeezing personal lines margins everywhere. We built a remarketing desk for agencies like {{company}}.\n\n{{sender_name}}",
            },
            StepBlueprint {
                delay_days: 2,
                subject: "Re: a thought on renewals",
                body: "{{first_name}}, one agency your size retained 14% more homeowners policies last quarter with our desk. Open to seeing how?\n\n{{sender_name}}",
            },
            StepBlueprint {
                delay_days: 5,
                subject: "Should I close your file?",
                body: "Hi {{first_name}},\n\nHaven't heard back so I'll assume now isn't the right time for {{company}}. Reply anytime.\n\n{{sender_name}}",
            },
        ],
    },
];

/// Number of campaigns every run creates.
pub const CAMPAIGN_COUNT: usize = 2;

/// Builds the demo campaigns, each owning its own numbered sequence.
pub fn generate_campaigns<R: Rng + ?Sized>(
    rng: &mut R,
    organization: &Organization,
    now: DateTime<Utc>,
) -> Vec<CampaignWithSequence> {
    BLUEPRINTS
        .iter()
        .take(CAMPAIGN_COUNT)
        .map(|blueprint| {
            let campaign = Campaign {
                id: random_id(rng),
                organization_id: organization.id,
                name: blueprint.name.to_string(),
                status: blueprint.status,
                daily_send_limit: rng.gen_range(4..=12) * 10,
                created_at: now - Duration::days(rng.gen_range(3..30)),
            };
            let steps = blueprint
                .steps
                .iter()
                .enumerate()
                .map(|(index, step)| SequenceStep {
                    id: random_id(rng),
                    campaign_id: campaign.id,
                    step_number: index as u32 + 1,
                    delay_days: step.delay_days,
                    subject: step.subject.to_string(),
                    body: step.body.to_string(),
                })
                .collect();
            CampaignWithSequence { campaign, steps }
        })
        .collect()
}
