pub mod tracked_conversations;
