pub mod membership;
pub mod message_cache;
pub mod tracked;

pub use membership::MembershipCache;
pub use message_cache::MessageCache;
pub use tracked::TrackedConversations;
pub use vkwarden_common::models::CachedMessage;
