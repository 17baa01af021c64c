pub mod agent;
pub mod catalog;
pub mod conversation;
pub mod error;
pub mod execution;
pub mod filters;
pub mod followups;
pub mod guardrails;
pub mod insights;
pub mod knowledge;
pub mod llm;
pub mod memory;
pub mod resolver;
