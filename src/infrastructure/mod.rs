pub mod backend;
pub mod config;
pub mod email;
pub mod llm_clients;
pub mod response;
