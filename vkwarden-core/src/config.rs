//! Engine configuration plus the rule lists it moderates with.
//!
//! Every field has a default, so an empty `{}` config file is valid.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Community the bot acts for. Invites of `-group_id` are the bot itself.
    #[serde(default)]
    pub group_id: u64,

    /// Community whose members may stay in moderated conversations (id or screen name).
    #[serde(default)]
    pub reference_community: String,

    #[serde(default = "default_reconcile_interval_secs")]
    pub reconcile_interval_secs: u64,

    #[serde(default = "default_message_cache_capacity")]
    pub message_cache_capacity: usize,

    /// Check messages as they arrive, not only on the periodic sweep.
    #[serde(default = "default_true")]
    pub inline_check: bool,

    /// Also remove the author of a violating message.
    #[serde(default = "default_true")]
    pub kick_on_violation: bool,

    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    #[serde(default = "default_greeting_text")]
    pub greeting_text: String,

    /// `{user_id}` is replaced with the removed user's id.
    #[serde(default = "default_removal_notice")]
    pub removal_notice: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_forbidden_words_path")]
    pub forbidden_words_path: PathBuf,

    #[serde(default = "default_trusted_domains_path")]
    pub trusted_domains_path: PathBuf,

    #[serde(default = "default_tracked_conversations_path")]
    pub tracked_conversations_path: PathBuf,

    #[serde(default = "default_violations_log_path")]
    pub violations_log_path: PathBuf,

    #[serde(default = "default_messages_log_path")]
    pub messages_log_path: PathBuf,
}

fn default_reconcile_interval_secs() -> u64 {
    10
}

fn default_message_cache_capacity() -> usize {
    50
}

fn default_true() -> bool {
    true
}

fn default_call_timeout_secs() -> u64 {
    10
}

fn default_greeting_text() -> String {
    "Hi everyone!\nThanks for adding me to the conversation. \
     Give me administrator rights and I will remove people who are not members of our \
     community, and delete spam."
        .to_string()
}

fn default_removal_notice() -> String {
    "@id{user_id} (User) was removed because they are not a member of the community.".to_string()
}

fn default_api_version() -> String {
    "5.199".to_string()
}

fn default_forbidden_words_path() -> PathBuf {
    PathBuf::from("forbidden_words.json")
}

fn default_trusted_domains_path() -> PathBuf {
    PathBuf::from("trusted_domains.json")
}

fn default_tracked_conversations_path() -> PathBuf {
    PathBuf::from("chat_ids.json")
}

fn default_violations_log_path() -> PathBuf {
    PathBuf::from("violations.log")
}

fn default_messages_log_path() -> PathBuf {
    PathBuf::from("messages.log")
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            group_id: 0,
            reference_community: String::new(),
            reconcile_interval_secs: default_reconcile_interval_secs(),
            message_cache_capacity: default_message_cache_capacity(),
            inline_check: true,
            kick_on_violation: true,
            call_timeout_secs: default_call_timeout_secs(),
            greeting_text: default_greeting_text(),
            removal_notice: default_removal_notice(),
            api_version: default_api_version(),
            forbidden_words_path: default_forbidden_words_path(),
            trusted_domains_path: default_trusted_domains_path(),
            tracked_conversations_path: default_tracked_conversations_path(),
            violations_log_path: default_violations_log_path(),
            messages_log_path: default_messages_log_path(),
        }
    }
}

impl ModerationConfig {
    /// Reads a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            info!("Config file {} not found => using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        let cfg: ModerationConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.message_cache_capacity == 0 {
            return Err(Error::Config("message_cache_capacity must be at least 1".into()));
        }
        if self.reconcile_interval_secs == 0 {
            return Err(Error::Config("reconcile_interval_secs must be at least 1".into()));
        }
        if self.call_timeout_secs == 0 {
            return Err(Error::Config("call_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn removal_notice_for(&self, user_id: i64) -> String {
        self.removal_notice.replace("{user_id}", &user_id.to_string())
    }
}

/// Forbidden-word and trusted-domain lists, each a JSON array of strings on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub forbidden_words: Vec<String>,
    pub trusted_domains: Vec<String>,
}

impl RuleSet {
    pub fn load(config: &ModerationConfig) -> Result<Self, Error> {
        let forbidden_words = read_string_list(&config.forbidden_words_path)?;
        let trusted_domains = read_string_list(&config.trusted_domains_path)?;
        info!(
            "Loaded rules: {} forbidden words, {} trusted domains",
            forbidden_words.len(),
            trusted_domains.len()
        );
        Ok(Self { forbidden_words, trusted_domains })
    }
}

fn read_string_list(path: &Path) -> Result<Vec<String>, Error> {
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::Config(format!("{} is not a JSON string array: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg: ModerationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.reconcile_interval_secs, 10);
        assert_eq!(cfg.message_cache_capacity, 50);
        assert!(cfg.inline_check);
        assert!(cfg.kick_on_violation);
        assert_eq!(cfg.reconcile_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let cfg = ModerationConfig { message_cache_capacity: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_removal_notice_template() {
        let cfg = ModerationConfig::default();
        assert!(cfg.removal_notice_for(42).starts_with("@id42 "));
    }

    #[test]
    fn test_rule_set_load() {
        let dir = tempfile::tempdir().unwrap();
        let words = dir.path().join("words.json");
        let domains = dir.path().join("domains.json");
        write!(fs::File::create(&words).unwrap(), r#"["крипта", "казино"]"#).unwrap();
        write!(fs::File::create(&domains).unwrap(), r#"["vk.com"]"#).unwrap();

        let cfg = ModerationConfig {
            forbidden_words_path: words,
            trusted_domains_path: domains,
            ..Default::default()
        };
        let rules = RuleSet::load(&cfg).unwrap();
        assert_eq!(rules.forbidden_words, vec!["крипта", "казино"]);
        assert_eq!(rules.trusted_domains, vec!["vk.com"]);
    }

    #[test]
    fn test_rule_set_rejects_non_list() {
        let dir = tempfile::tempdir().unwrap();
        let words = dir.path().join("words.json");
        fs::write(&words, r#"{"not": "a list"}"#).unwrap();
        let cfg = ModerationConfig {
            forbidden_words_path: words.clone(),
            trusted_domains_path: words,
            ..Default::default()
        };
        assert!(matches!(RuleSet::load(&cfg), Err(Error::Config(_))));
    }
}
