use super::{compose_icebreaker, random_id, slugify};
use crate::domain::lead::{Lead, LeadStatus};
use crate::domain::organization::Organization;
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "James", "Maria", "Robert", "Linda", "Michael", "Patricia", "David", "Jennifer", "William",
    "Elizabeth", "Carlos", "Susan", "Thomas", "Karen", "Daniel", "Nancy", "Matthew", "Angela",
    "Anthony", "Melissa", "Kevin", "Stephanie", "Brian", "Rebecca", "Jason", "Laura", "Ryan",
    "Michelle", "Eric", "Amanda",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Garcia", "Miller", "Davis", "Rodriguez", "Martinez", "Wilson",
    "Anderson", "Taylor", "Thomas", "Moore", "Jackson", "Martin", "Lee", "Thompson", "White",
    "Harris", "Clark", "Lewis", "Walker", "Hall", "Young", "Allen", "King", "Wright", "Scott",
    "Green", "Baker", "Nelson",
];

const AGENCY_STEMS: &[&str] = &[
    "Keystone", "Heritage", "Pinnacle", "Summit", "Lakeside", "Cornerstone", "Bluewater",
    "Ironwood", "Prairie", "Liberty Bell", "Harborview", "Redwood", "Crossroads", "Granite",
    "Meridian", "Old Mill", "Northgate", "Riverbend", "Sterling", "Trailhead",
];

const AGENCY_SUFFIXES: &[&str] = &[
    "Insurance Agency",
    "Insurance Group",
    "Risk Advisors",
    "Insurance Services",
    "Insurance & Associates",
];

const CITIES: &[(&str, &str)] = &[
    ("Austin", "TX"),
    ("Columbus", "OH"),
    ("Charlotte", "NC"),
    ("Boise", "ID"),
    ("Tampa", "FL"),
    ("Omaha", "NE"),
    ("Spokane", "WA"),
    ("Knoxville", "TN"),
    ("Des Moines", "IA"),
    ("Tucson", "AZ"),
    ("Richmond", "VA"),
    ("Madison", "WI"),
    ("Grand Rapids", "MI"),
    ("Greenville", "SC"),
    ("Albuquerque", "NM"),
    ("Fort Collins", "CO"),
    ("Savannah", "GA"),
    ("Lexington", "KY"),
    ("Wichita", "KS"),
    ("Reno", "NV"),
];

const TITLES: &[&str] = &[
    "Agency Owner",
    "Principal",
    "Producer",
    "Commercial Lines Manager",
    "Personal Lines Manager",
    "Operations Manager",
    "Account Executive",
];

pub(crate) const LINES_OF_BUSINESS: &[&str] = &[
    "commercial auto",
    "workers' comp",
    "general liability",
    "homeowners",
    "personal auto",
    "life & health",
    "cyber liability",
    "trucking",
    "contractors",
    "farm & ranch",
];

/// Produces `count` leads for `organization`.
///
/// Each lead independently carries an icebreaker with probability
/// `icebreaker_probability`; the rest model incomplete enrichment.
pub fn generate_leads<R: Rng + ?Sized>(
    rng: &mut R,
    organization: &Organization,
    count: usize,
    icebreaker_probability: f64,
    now: DateTime<Utc>,
) -> Vec<Lead> {
    let probability = if icebreaker_probability.is_nan() {
        0.0
    } else {
        icebreaker_probability.clamp(0.0, 1.0)
    };

    (0..count)
        .map(|_| {
            let mut lead = random_lead(rng, organization, now);
            if rng.gen_bool(probability) {
                lead.icebreaker = Some(compose_icebreaker(rng, organization, &lead));
            }
            lead
        })
        .collect()
}

fn random_lead<R: Rng + ?Sized>(rng: &mut R, organization: &Organization, now: DateTime<Utc>) -> Lead {
    let first_name = pick(rng, FIRST_NAMES);
    let last_name = pick(rng, LAST_NAMES);
    let (city, state) = *CITIES.choose(rng).unwrap_or(&CITIES[0]);
    let company_name = format!("{} {}", pick(rng, AGENCY_STEMS), pick(rng, AGENCY_SUFFIXES));
    let company_domain = format!("{}.com", slugify(&company_name));
    let email = format!(
        "{}.{}@{}",
        first_name.to_lowercase(),
        last_name.to_lowercase(),
        company_domain
    );

    let line_count = rng.gen_range(1..=3);
    let lines_of_business = LINES_OF_BUSINESS
        .choose_multiple(rng, line_count)
        .map(|line| line.to_string())
        .collect();

    Lead {
        id: random_id(rng),
        organization_id: organization.id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email,
        title: pick(rng, TITLES).to_string(),
        company_name,
        company_domain,
        city: city.to_string(),
        state: state.to_string(),
        phone: format!(
            "({}) {}-{:04}",
            rng.gen_range(201..=989),
            rng.gen_range(200..=999),
            rng.gen_range(0..10000)
        ),
        lines_of_business,
        status: random_status(rng),
        icebreaker: None,
        created_at: now - Duration::minutes(rng.gen_range(0..60 * 24 * 60)),
    }
}

fn random_status<R: Rng + ?Sized>(rng: &mut R) -> LeadStatus {
    match rng.gen_range(0..100) {
        0..=54 => LeadStatus::New,
        55..=79 => LeadStatus::Contacted,
        80..=87 => LeadStatus::Replied,
        88..=94 => LeadStatus::Interested,
        _ => LeadStatus::Unsubscribed,
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &[&'static str]) -> &'static str {
    pool.choose(rng).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::generators::build_organization;
    use crate::domain::seed_plan::SeedPlan;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn organization(rng: &mut StdRng) -> Organization {
        build_organization(rng, &SeedPlan::default(), Utc::now())
    }

    #[test]
    fn test_exact_count_and_parent_reference() {
        let mut rng = StdRng::seed_from_u64(11);
        let org = organization(&mut rng);
        for count in [0usize, 1, 17, 250] {
            let leads = generate_leads(&mut rng, &org, count, 0.975, Utc::now());
            assert_eq!(leads.len(), count);
            assert!(leads.iter().all(|lead| lead.organization_id == org.id));
        }
    }

    #[test]
    fn test_zero_leads_is_empty_not_error() {
        let mut rng = StdRng::seed_from_u64(3);
        let org = organization(&mut rng);
        assert!(generate_leads(&mut rng, &org, 0, 0.975, Utc::now()).is_empty());
    }

    #[test]
    fn test_icebreaker_fraction_converges() {
        let mut rng = StdRng::seed_from_u64(2024);
        let org = organization(&mut rng);
        let leads = generate_leads(&mut rng, &org, 2000, 0.975, Utc::now());
        let with_icebreaker = leads.iter().filter(|lead| lead.has_icebreaker()).count();
        let fraction = with_icebreaker as f64 / leads.len() as f64;
        assert!(
            (fraction - 0.975).abs() < 0.015,
            "fraction {} too far from 0.975",
            fraction
        );
        assert!(with_icebreaker < leads.len());
    }

    #[test]
    fn test_probability_extremes() {
        let mut rng = StdRng::seed_from_u64(5);
        let org = organization(&mut rng);
        let all = generate_leads(&mut rng, &org, 100, 1.0, Utc::now());
        assert!(all.iter().all(|lead| lead.has_icebreaker()));
        let none = generate_leads(&mut rng, &org, 100, 0.0, Utc::now());
        assert!(none.iter().all(|lead| lead.icebreaker.is_none()));
    }

    #[test]
    fn test_lead_fields_look_plausible() {
        let mut rng = StdRng::seed_from_u64(9);
        let org = organization(&mut rng);
        let now = Utc::now();
        for lead in generate_leads(&mut rng, &org, 50, 0.5, now) {
            assert!(lead.email.contains('@'));
            assert!(lead.email.ends_with(&lead.company_domain));
            assert!(!lead.lines_of_business.is_empty());
            assert!(lead.created_at <= now);
        }
    }
}
