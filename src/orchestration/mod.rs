//! Sequencing layer: cache check → collaborator fetch → reconstruction →
//! cache write, with synthetic fallback on missing configuration, empty
//! results, or collaborator failure.

pub mod orchestrator;

pub use orchestrator::{Orchestrator, PnlSummary};
