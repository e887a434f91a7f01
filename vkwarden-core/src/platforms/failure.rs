//! Maps transport errors onto the handful of outcomes the engine reacts to differently.

use vkwarden_common::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network trouble, timeouts, rate limits. Retried on the next tick.
    Transient,
    /// The message or member is already gone. Treated as done.
    NotFound,
    /// The bot lacks administrator rights. Needs an operator.
    PermissionDenied,
    /// The conversation is gone or the bot was removed from it.
    Unreachable,
    Other,
}

impl FailureKind {
    pub fn of(err: &Error) -> Self {
        match err {
            Error::Http(_) | Error::Timeout(_) => FailureKind::Transient,
            Error::NotFound(_) => FailureKind::NotFound,
            Error::VkApi { code, .. } => Self::from_vk_code(*code),
            _ => FailureKind::Other,
        }
    }

    /// See <https://dev.vk.com/reference/errors>.
    pub fn from_vk_code(code: i64) -> Self {
        match code {
            // too many requests, flood control, internal server error
            6 | 9 | 10 => FailureKind::Transient,
            // user not found in chat, not found
            935 | 104 => FailureKind::NotFound,
            // permission denied, access denied, group auth unavailable,
            // no access to chat, not admin of chat
            7 | 15 | 27 | 917 | 925 => FailureKind::PermissionDenied,
            // chat does not exist, chat was disabled, chat not supported
            927 | 945 | 946 => FailureKind::Unreachable,
            _ => FailureKind::Other,
        }
    }

    pub fn is_transient(self) -> bool {
        self == FailureKind::Transient
    }
}
