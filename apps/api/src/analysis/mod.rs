pub mod handlers;
pub mod learning_plan;
pub mod matcher;
pub mod orchestrator;
pub mod prompts;
pub mod scoring;
