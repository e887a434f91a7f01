// src/lib.rs

pub mod audit;
pub mod cache;
pub mod config;
pub mod eventbus;
pub mod moderation;
pub mod platforms;
pub mod repositories;
pub mod services;
pub mod tasks;
pub mod test_utils;
pub mod utils;

pub use vkwarden_common::error::Error;
pub use config::{ModerationConfig, RuleSet};
pub use services::engine::ModerationEngine;
