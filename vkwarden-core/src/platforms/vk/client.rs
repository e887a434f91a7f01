// File: vkwarden-core/src/platforms/vk/client.rs

use std::sync::Arc;

use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::Error;

const DEFAULT_API_BASE: &str = "https://api.vk.com/method";

/// Thin wrapper around the VK method API, authenticated with a community token.
///
/// Request helpers live in `requests::*`; this type only knows how to call a method and
/// unwrap the response envelope.
pub struct VkApiClient {
    http: Arc<ReqwestClient>,
    access_token: String,
    api_version: String,
    api_base: String,
    group_id: u64,
    reference_community: String,
}

#[derive(Debug, Deserialize)]
struct VkEnvelope<T> {
    response: Option<T>,
    error: Option<VkErrorBody>,
}

#[derive(Debug, Deserialize)]
struct VkErrorBody {
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

impl VkApiClient {
    pub fn new(access_token: &str, api_version: &str, group_id: u64, reference_community: &str) -> Self {
        Self {
            http: Arc::new(ReqwestClient::new()),
            access_token: access_token.to_string(),
            api_version: api_version.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            group_id,
            reference_community: reference_community.to_string(),
        }
    }

    /// Points the client at another API root (a proxy, or a local stub).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn group_id(&self) -> u64 {
        self.group_id
    }

    pub fn reference_community(&self) -> &str {
        &self.reference_community
    }

    pub fn http_client(&self) -> Arc<ReqwestClient> {
        self.http.clone()
    }

    /// Calls `method` with form-encoded `params` and decodes the `response` field.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = format!("{}/{}", self.api_base, method);
        let mut form: Vec<(&str, String)> = params.to_vec();
        form.push(("access_token", self.access_token.clone()));
        form.push(("v", self.api_version.clone()));

        debug!("VK call => {}", method);
        // Network failures and non-2xx statuses surface as `Error::Http` (transient).
        let resp = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        let body = resp.text().await?;
        parse_envelope(method, &body)
    }
}

/// Decodes `{"response": ...}` or turns `{"error": {...}}` into `Error::VkApi`.
pub(crate) fn parse_envelope<T: DeserializeOwned>(method: &str, body: &str) -> Result<T, Error> {
    let envelope: VkEnvelope<T> = serde_json::from_str(body)?;
    if let Some(err) = envelope.error {
        return Err(Error::VkApi { code: err.error_code, message: err.error_msg });
    }
    envelope
        .response
        .ok_or_else(|| Error::Platform(format!("{method}: response envelope without 'response'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_parse_response() {
        let v: i64 = parse_envelope("groups.isMember", r#"{"response": 1}"#).unwrap();
        assert_eq!(v, 1);
    }

    #[test]
    fn test_parse_error() {
        let body = r#"{"error": {"error_code": 925, "error_msg": "You are not admin of this chat", "request_params": []}}"#;
        let res: Result<Value, Error> = parse_envelope("messages.removeChatUser", body);
        match res {
            Err(Error::VkApi { code, message }) => {
                assert_eq!(code, 925);
                assert!(message.contains("not admin"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_envelope() {
        let res: Result<Value, Error> = parse_envelope("messages.send", "{}");
        assert!(matches!(res, Err(Error::Platform(_))));
        let res: Result<Value, Error> = parse_envelope("messages.send", "<html>");
        assert!(matches!(res, Err(Error::Json(_))));
    }
}
