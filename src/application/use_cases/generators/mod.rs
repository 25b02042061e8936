//! Synthetic demo data.
//!
//! Every generator is pure: it takes an explicit RNG and clock value, builds
//! records in memory and never touches the network. Parent ids are minted here
//! so dependents can be built before anything is written.

pub mod activity;
pub mod campaigns;
pub mod customer;
pub mod icebreaker;
pub mod leads;
pub mod organization;

use rand::Rng;
use uuid::Uuid;

pub use activity::generate_activity;
pub use campaigns::generate_campaigns;
pub use customer::build_customer_user;
pub use icebreaker::compose_icebreaker;
pub use leads::generate_leads;
pub use organization::build_organization;

/// UUID v4 drawn from the caller's RNG, so seeded runs are reproducible.
pub fn random_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

pub(crate) fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
