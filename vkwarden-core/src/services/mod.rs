pub mod action_executor;
pub mod engine;
pub mod message_service;
pub mod reconciler;

pub use action_executor::{ActionExecutor, DeleteOutcome, RemovalOutcome};
pub use engine::ModerationEngine;
pub use reconciler::SweepReport;
