//! execfind - Enrich a company CSV with chief-executive names
//!
//! Runs every company row through an ordered cascade of lookup sources
//! (contact databases, LLM extraction over web context, knowledge-only LLM
//! queries) and writes the first valid result back into the table. Progress
//! is saved incrementally so interrupted runs can resume.

pub mod cli;
pub mod config;
pub mod extract;
pub mod llm;
pub mod ratelimit;
pub mod report;
pub mod runner;
pub mod sources;
pub mod table;
pub mod util;
pub mod web;
