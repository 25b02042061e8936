pub mod campaign_preview;
pub mod generators;
pub mod icebreaker_writer;
pub mod provision;
pub mod seed_orchestrator;
