//! Rules that decide whether a single message breaks the conversation policy.

pub mod detector;
pub mod links;
pub mod normalizer;

pub use detector::ViolationDetector;
pub use links::LinkClassifier;
pub use normalizer::{normalize_text, transliterate_text};
