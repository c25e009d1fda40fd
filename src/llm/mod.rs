pub mod client;
pub mod factory;
pub mod prompts;
pub mod providers;

pub use client::{CompletionRequest, LlmClient, MockLlmClient};
