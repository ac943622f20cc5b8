//! Keyword-based classification of the portal's response page.
//!
//! Rules are evaluated in order and the first match wins. Each rule holds a
//! set of alternative patterns; a pattern matches when every one of its
//! keywords occurs (case-insensitively) in the page text.
//!
//! The co-occurrence rules for location problems (`lokasi` + `tidak`) are a
//! heuristic and can match unrelated text that happens to contain both words.

use serde::{Deserialize, Serialize};

use crate::models::OutcomeKind;

/// One outcome and the keyword patterns that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub outcome: OutcomeKind,
    pub patterns: Vec<Vec<String>>,
}

impl ClassificationRule {
    pub fn new(outcome: OutcomeKind, patterns: &[&[&str]]) -> Self {
        Self {
            outcome,
            patterns: patterns
                .iter()
                .map(|keywords| keywords.iter().map(|k| k.to_string()).collect())
                .collect(),
        }
    }

    fn matches(&self, haystack: &str) -> bool {
        self.patterns.iter().any(|keywords| {
            !keywords.is_empty() && keywords.iter().all(|k| haystack.contains(k.as_str()))
        })
    }
}

/// Ordered list of classification rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageClassifier {
    rules: Vec<ClassificationRule>,
}

impl PageClassifier {
    /// Builds a classifier; keywords are lower-cased and blank ones dropped.
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| ClassificationRule {
                outcome: rule.outcome,
                patterns: rule
                    .patterns
                    .into_iter()
                    .map(|keywords| {
                        keywords
                            .into_iter()
                            .map(|k| k.trim().to_lowercase())
                            .filter(|k| !k.is_empty())
                            .collect()
                    })
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Returns the outcome of the first matching rule, or `Unrecognized`.
    pub fn classify(&self, page_text: &str) -> OutcomeKind {
        let haystack = page_text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&haystack))
            .map(|rule| rule.outcome)
            .unwrap_or(OutcomeKind::Unrecognized)
    }
}

impl Default for PageClassifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

/// Built-in rules in priority order.
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new(
            OutcomeKind::Success,
            &[&["berhasil"], &["sukses"], &["successfully"]],
        ),
        ClassificationRule::new(
            OutcomeKind::AlreadySubmitted,
            &[
                &["sudah melakukan presensi"],
                &["sudah presensi"],
                &["sudah absen"],
                &["already"],
            ],
        ),
        ClassificationRule::new(
            OutcomeKind::InvalidCredentials,
            &[
                &["password salah"],
                &["nip atau password"],
                &["nip tidak terdaftar"],
                &["login gagal"],
                &["invalid credentials"],
            ],
        ),
        ClassificationRule::new(
            OutcomeKind::TooEarly,
            &[
                &["belum waktunya"],
                &["belum saatnya"],
                &["belum dibuka"],
                &["too early"],
            ],
        ),
        ClassificationRule::new(
            OutcomeKind::LocationIssue,
            &[
                &["di luar radius"],
                &["lokasi", "tidak"],
                &["location", "tidak"],
            ],
        ),
    ]
}
