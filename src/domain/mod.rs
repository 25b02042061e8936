pub mod access;
pub mod activity_event;
pub mod campaign;
pub mod customer_user;
pub mod email;
pub mod error;
pub mod lead;
pub mod llm_config;
pub mod organization;
pub mod seed_plan;
pub mod seed_summary;
