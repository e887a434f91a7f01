pub mod groups;
pub mod messages;
