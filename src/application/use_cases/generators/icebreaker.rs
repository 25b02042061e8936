use super::leads::LINES_OF_BUSINESS;
use crate::domain::lead::Lead;
use crate::domain::organization::Organization;
use rand::seq::SliceRandom;
use rand::Rng;

// Placeholders: {first} {company} {city} {state} {line} {focus} {years}
const TEMPLATES: &[&str] = &[
    "Noticed {company} has been writing {line} around {city} for about {years} years, which is rare among {focus}.",
    "Saw that {company} recently grew its {line} book in {city}. Curious how renewals are holding up this season, {first}.",
    "Loved seeing an independent shop like {company} stay so involved in the {city} community.",
    "{company}'s focus on {line} stood out while I was looking at {focus} across {state}.",
    "{first}, your team's reviews around {city} keep mentioning how fast {company} turns around {line} quotes.",
    "Came across {company} while researching {line} carriers in {state} and had to reach out.",
    "It's not every day I find a {city} agency with {years} years in {line}. Congrats on the run at {company}.",
    "Your recent post about {line} claims trends in {state} was spot on, {first}.",
];

/// Plausible opening line built from the lead's agency and the organization's market.
pub fn compose_icebreaker<R: Rng + ?Sized>(rng: &mut R, organization: &Organization, lead: &Lead) -> String {
    let template = TEMPLATES.choose(rng).copied().unwrap_or(TEMPLATES[0]);
    let line = lead
        .lines_of_business
        .choose(rng)
        .map(String::as_str)
        .or_else(|| LINES_OF_BUSINESS.first().copied())
        .unwrap_or("insurance");
    let years = rng.gen_range(8..=40).to_string();

    template
        .replace("{first}", &lead.first_name)
        .replace("{company}", &lead.company_name)
        .replace("{city}", &lead.city)
        .replace("{state}", &lead.state)
        .replace("{line}", line)
        .replace("{focus}", &organization.market_focus)
        .replace("{years}", &years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::generators::{build_organization, generate_leads};
    use crate::domain::seed_plan::SeedPlan;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_icebreakers_fill_every_placeholder() {
        let mut rng = StdRng::seed_from_u64(42);
        let org = build_organization(&mut rng, &SeedPlan::default(), Utc::now());
        let leads = generate_leads(&mut rng, &org, 200, 1.0, Utc::now());
        for lead in &leads {
            let text = lead.icebreaker.as_deref().unwrap();
            assert!(!text.contains('{'), "unfilled placeholder in {:?}", text);
            assert!(
                text.contains(&lead.company_name)
                    || text.contains(&lead.first_name)
                    || text.contains(&lead.city)
                    || text.contains(&lead.state)
            );
        }
    }

    #[test]
    fn test_falls_back_when_lead_has_no_lines() {
        let mut rng = StdRng::seed_from_u64(7);
        let org = build_organization(&mut rng, &SeedPlan::default(), Utc::now());
        let mut lead = generate_leads(&mut rng, &org, 1, 0.0, Utc::now()).remove(0);
        lead.lines_of_business.clear();

        for _ in 0..50 {
            let text = compose_icebreaker(&mut rng, &org, &lead);
            assert!(!text.is_empty());
            assert!(!text.contains('{'), "unfilled placeholder in {:?}", text);
        }
    }
}
