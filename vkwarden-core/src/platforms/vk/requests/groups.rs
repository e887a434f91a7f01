//! `groups.*` methods: reference-community membership and long-poll bootstrap.

use serde::Deserialize;
use serde_json::Value;
use vkwarden_common::models::UserId;

use crate::Error;
use crate::platforms::vk::client::VkApiClient;

/// Connection parameters returned by `groups.getLongPollServer`.
#[derive(Debug, Clone, Deserialize)]
pub struct LongPollServer {
    pub key: String,
    pub server: String,
    #[serde(deserialize_with = "crate::platforms::vk::events::ts_as_string")]
    pub ts: String,
}

/// `groups.isMember` answers `1`/`0` (or `true`/`false` with some API versions).
pub(crate) fn is_member_flag(value: &Value) -> Result<bool, Error> {
    match value {
        Value::Number(n) => Ok(n.as_i64().unwrap_or(0) == 1),
        Value::Bool(b) => Ok(*b),
        Value::Object(map) => map
            .get("member")
            .map(is_member_flag)
            .unwrap_or_else(|| Err(Error::Parse(format!("groups.isMember: unexpected {value}")))),
        other => Err(Error::Parse(format!("groups.isMember: unexpected {other}"))),
    }
}

impl VkApiClient {
    pub async fn groups_is_member(&self, community: &str, user_id: UserId) -> Result<bool, Error> {
        let value: Value = self
            .call(
                "groups.isMember",
                &[
                    ("group_id", community.to_string()),
                    ("user_id", user_id.to_string()),
                ],
            )
            .await?;
        is_member_flag(&value)
    }

    pub async fn groups_get_long_poll_server(&self) -> Result<LongPollServer, Error> {
        self.call(
            "groups.getLongPollServer",
            &[("group_id", self.group_id().to_string())],
        )
        .await
    }
}
