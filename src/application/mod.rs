pub mod use_cases;

pub use use_cases::campaign_preview::CampaignPreviewUseCase;
pub use use_cases::icebreaker_writer::IcebreakerWriterUseCase;
pub use use_cases::provision::{ProvisionError, ProvisionUseCase};
pub use use_cases::seed_orchestrator::{SeedOrchestrator, SeedReport};
