// src/repositories/mod.rs

pub mod json;

pub use json::tracked_conversations::JsonTrackedConversationRepository;
pub use vkwarden_common::traits::repository_traits::TrackedConversationRepository;
