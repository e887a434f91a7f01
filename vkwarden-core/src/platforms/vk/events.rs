//! Bots Long Poll payloads and their conversion into `InboundEvent`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};
use vkwarden_common::models::{ChatAction, ChatActionKind, InboundEvent};

/// `ts` arrives as a string in updates and as a number in some error replies.
pub(crate) fn ts_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn opt_ts_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.map(|v| match v {
        Value::String(s) => s,
        other => other.to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct VkMessage {
    pub peer_id: i64,
    pub from_id: i64,
    pub date: i64,
    #[serde(default)]
    pub text: String,
    pub conversation_message_id: Option<i64>,
    #[serde(default)]
    pub attachments: Vec<VkAttachment>,
    pub action: Option<VkAction>,
}

#[derive(Debug, Deserialize)]
pub struct VkAttachment {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct VkAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub member_id: Option<i64>,
}

impl From<VkMessage> for InboundEvent {
    fn from(m: VkMessage) -> Self {
        InboundEvent {
            peer_id: m.peer_id,
            conversation_message_id: m.conversation_message_id,
            author_id: m.from_id,
            text: if m.text.is_empty() { None } else { Some(m.text) },
            date: m.date,
            attachments: m.attachments.into_iter().map(|a| a.kind).collect(),
            action: m.action.map(|a| ChatAction {
                kind: ChatActionKind::from_vk(&a.kind),
                target_member_id: a.member_id,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPollResponse {
    #[serde(default, deserialize_with = "opt_ts_as_string")]
    ts: Option<String>,
    failed: Option<i64>,
    #[serde(default)]
    updates: Vec<Value>,
}

/// One long-poll reply.
#[derive(Debug)]
pub enum PollResponse {
    Updates { ts: String, events: Vec<InboundEvent> },
    /// `failed = 1`: history is outdated, continue from the new `ts`.
    Outdated { ts: String },
    /// `failed = 2 | 3`: key expired or information lost, fetch a new server.
    Expired,
}

pub fn parse_poll_response(body: &str) -> Result<PollResponse, crate::Error> {
    let raw: RawPollResponse = serde_json::from_str(body)?;
    match (raw.failed, raw.ts) {
        (Some(1), Some(ts)) => Ok(PollResponse::Outdated { ts }),
        (Some(_), _) => Ok(PollResponse::Expired),
        (None, Some(ts)) => {
            let events = raw.updates.into_iter().filter_map(update_to_event).collect();
            Ok(PollResponse::Updates { ts, events })
        }
        (None, None) => Err(crate::Error::Parse("long poll reply without ts".into())),
    }
}

fn update_to_event(update: Value) -> Option<InboundEvent> {
    let kind = update.get("type").and_then(Value::as_str).unwrap_or_default();
    if kind != "message_new" {
        debug!("Ignoring long poll update of type '{}'", kind);
        return None;
    }
    let message = update.get("object")?.get("message")?.clone();
    match serde_json::from_value::<VkMessage>(message) {
        Ok(m) => Some(m.into()),
        Err(e) => {
            warn!("Skipping malformed message_new update: {}", e);
            None
        }
    }
}
