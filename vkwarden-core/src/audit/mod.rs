//! Append-only text logs kept next to the bot: violations (plus invites) and every raw
//! message seen. Writes are best-effort; a failure only produces a tracing error.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::error;
use vkwarden_common::models::{InboundEvent, PeerId, UserId, ViolationReason};

use crate::utils::time::format_epoch;

#[derive(Debug, Clone)]
pub struct AuditLog {
    violations_path: PathBuf,
    messages_path: PathBuf,
}

impl AuditLog {
    pub fn new(violations_path: impl Into<PathBuf>, messages_path: impl Into<PathBuf>) -> Self {
        Self {
            violations_path: violations_path.into(),
            messages_path: messages_path.into(),
        }
    }

    pub async fn log_violation(&self, peer_id: PeerId, user_id: UserId, text: &str, reason: ViolationReason) {
        let line = format!(
            "[{}] User {} in conversation {} sent a message with {}: \"{}\"\n",
            timestamp(), user_id, peer_id, reason, text
        );
        append(&self.violations_path, &line).await;
    }

    pub async fn log_membership_violation(&self, peer_id: PeerId, user_id: UserId, community: &str) {
        let line = format!(
            "[{}] User {} in conversation {} is not a member of community {}\n",
            timestamp(), user_id, peer_id, community
        );
        append(&self.violations_path, &line).await;
    }

    pub async fn log_invite(&self, peer_id: PeerId) {
        let line = format!("[{}] Bot added to conversation {}\n", timestamp(), peer_id);
        append(&self.violations_path, &line).await;
    }

    pub async fn log_message(&self, event: &InboundEvent) {
        let attachments = if event.attachments.is_empty() {
            "no".to_string()
        } else {
            format!("yes (types: {})", event.attachments.join(", "))
        };
        let line = format!(
            "[{}] Message from {} in conversation {} sent at {}; text: \"{}\"; attachments: {}\n",
            timestamp(),
            event.author_id,
            event.peer_id,
            format_epoch(event.date),
            event.text().unwrap_or("(no text)"),
            attachments
        );
        append(&self.messages_path, &line).await;
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn append(path: &Path, line: &str) {
    let file = OpenOptions::new().create(true).append(true).open(path).await;
    let mut file = match file {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to open audit log {}: {}", path.display(), e);
            return;
        }
    };
    if let Err(e) = file.write_all(line.as_bytes()).await {
        error!("Failed to write audit log {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: Option<&str>, attachments: Vec<&str>) -> InboundEvent {
        InboundEvent {
            peer_id: 2_000_000_001,
            conversation_message_id: Some(5),
            author_id: 77,
            text: text.map(str::to_string),
            date: 0,
            attachments: attachments.into_iter().map(str::to_string).collect(),
            action: None,
        }
    }

    #[tokio::test]
    async fn test_lines_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("violations.log"), dir.path().join("messages.log"));

        log.log_violation(2_000_000_001, 77, "buy крипта", ViolationReason::ForbiddenWord).await;
        log.log_invite(2_000_000_003).await;
        log.log_message(&event(Some("hi"), vec![])).await;
        log.log_message(&event(None, vec!["photo", "doc"])).await;

        let violations = tokio::fs::read_to_string(dir.path().join("violations.log")).await.unwrap();
        let lines: Vec<_> = violations.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("User 77") && lines[0].contains("forbidden word"));
        assert!(lines[1].contains("Bot added to conversation 2000000003"));

        let messages = tokio::fs::read_to_string(dir.path().join("messages.log")).await.unwrap();
        let lines: Vec<_> = messages.lines().collect();
        assert!(lines[0].contains("sent at 1970-01-01 00:00:00"));
        assert!(lines[0].ends_with("text: \"hi\"; attachments: no"));
        assert!(lines[1].contains("(no text)") && lines[1].ends_with("yes (types: photo, doc)"));
    }

    #[tokio::test]
    async fn test_unwritable_path_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no/such/dir/violations.log");
        let log = AuditLog::new(&missing, &missing);
        log.log_invite(1).await;
        assert!(!missing.exists());
    }
}
