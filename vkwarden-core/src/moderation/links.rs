//! URL extraction and trusted-domain checks.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

/// Scheme followed by any run of non-whitespace. The run may be empty so that a dangling
/// `https://` is still extracted (and then rejected as malformed).
static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S*").expect("URL pattern is a valid regex"));

#[derive(Debug, Clone, Default)]
pub struct LinkClassifier {
    trusted_domains: HashSet<String>,
}

impl LinkClassifier {
    pub fn new<I, S>(trusted_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trusted_domains: trusted_domains.into_iter().map(Into::into).collect(),
        }
    }

    /// Every `http://` / `https://` link found in `text`, in order of appearance.
    pub fn extract_links(text: &str) -> Vec<&str> {
        URL_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
    }

    /// `true` if at least one link in `text` is malformed or points to a host outside the
    /// trusted set. Malformed links count as untrusted.
    pub fn contains_untrusted_link(&self, text: &str) -> bool {
        Self::extract_links(text)
            .into_iter()
            .any(|link| !self.is_trusted(link))
    }

    fn is_trusted(&self, link: &str) -> bool {
        let url = match Url::parse(link) {
            Ok(u) => u,
            Err(e) => {
                debug!("Link '{}' failed to parse ({}) => untrusted", link, e);
                return false;
            }
        };
        match url.host_str() {
            Some(host) => {
                let host = host.strip_prefix("www.").unwrap_or(host);
                self.trusted_domains.contains(host)
            }
            None => false,
        }
    }
}
