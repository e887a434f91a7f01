use tracing::warn;
use vkwarden_common::models::{ViolationReason, ViolationVerdict};

use crate::config::RuleSet;
use super::links::LinkClassifier;
use super::normalizer::{normalize_text, transliterate_text};

/// Combines the forbidden-word check (over folded text) with the link check
/// (over raw text) into a single verdict.
#[derive(Debug, Clone, Default)]
pub struct ViolationDetector {
    forbidden_words: Vec<ForbiddenWord>,
    links: LinkClassifier,
}

/// A list entry in both folds; for an all-Cyrillic entry they are equal.
#[derive(Debug, Clone)]
struct ForbiddenWord {
    by_shape: String,
    by_sound: String,
}

impl ViolationDetector {
    pub fn new<W, S>(forbidden_words: W, links: LinkClassifier) -> Self
    where
        W: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // Entries go through the same normalization as message text, so a list entry typed
        // with Latin lookalikes still matches.
        let forbidden_words = forbidden_words
            .into_iter()
            .filter_map(|w| {
                let w = w.as_ref().trim();
                if w.is_empty() {
                    warn!("Ignoring empty forbidden-word entry");
                    None
                } else {
                    Some(ForbiddenWord {
                        by_shape: normalize_text(w),
                        by_sound: transliterate_text(w),
                    })
                }
            })
            .collect();
        Self { forbidden_words, links }
    }

    pub fn from_rules(rules: &RuleSet) -> Self {
        Self::new(
            &rules.forbidden_words,
            LinkClassifier::new(rules.trusted_domains.iter().cloned()),
        )
    }

    /// First forbidden entry contained in `text` under either fold, as normalized by shape.
    pub fn matched_word(&self, text: &str) -> Option<&str> {
        let by_shape = normalize_text(text);
        let by_sound = transliterate_text(text);
        self.forbidden_words
            .iter()
            .find(|w| by_shape.contains(&w.by_shape) || by_sound.contains(&w.by_sound))
            .map(|w| w.by_shape.as_str())
    }

    /// The word check wins when both checks fire.
    pub fn check(&self, text: &str) -> ViolationVerdict {
        if self.matched_word(text).is_some() {
            return ViolationVerdict::violation(ViolationReason::ForbiddenWord);
        }
        if self.links.contains_untrusted_link(text) {
            return ViolationVerdict::violation(ViolationReason::UntrustedLink);
        }
        ViolationVerdict::clean()
    }
}
