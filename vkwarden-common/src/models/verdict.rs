use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationReason {
    ForbiddenWord,
    UntrustedLink,
    None,
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationReason::ForbiddenWord => write!(f, "forbidden word"),
            ViolationReason::UntrustedLink => write!(f, "untrusted link"),
            ViolationReason::None => write!(f, "none"),
        }
    }
}

/// Outcome of checking a single message against the current rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationVerdict {
    pub is_violation: bool,
    pub reason: ViolationReason,
}

impl ViolationVerdict {
    pub fn clean() -> Self {
        Self { is_violation: false, reason: ViolationReason::None }
    }

    pub fn violation(reason: ViolationReason) -> Self {
        Self { is_violation: reason != ViolationReason::None, reason }
    }
}
