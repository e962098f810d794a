pub mod export;
pub mod orchestrator;
pub mod report;
pub mod settings;
