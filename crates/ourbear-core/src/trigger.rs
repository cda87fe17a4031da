//! Decides whether an incoming message deserves a reply.

use regex::Regex;

use crate::{Error, Result};

/// Keywords matched as plain substrings of the lower-cased text.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "гойд",
    "медвед",
    "медвеж",
    "русск",
    "россия",
    "рф",
    "слон",
];

/// "гол" with the vowel stretched any number of times ("гоооол").
const GOAL_PATTERN: &str = ".*го+л.*";

#[derive(Clone, Debug)]
pub struct TriggerClassifier {
    keywords: Vec<String>,
    goal: Regex,
}

impl TriggerClassifier {
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        let goal = Regex::new(GOAL_PATTERN)
            .map_err(|e| Error::Config(format!("invalid trigger pattern: {e}")))?;
        Ok(Self { keywords, goal })
    }

    pub fn with_default_keywords() -> Result<Self> {
        Self::new(DEFAULT_KEYWORDS)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Case-insensitive match against the keyword list or the stretched-vowel root.
    pub fn is_match(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        if self.keywords.iter().any(|k| lower.contains(k.as_str())) {
            return true;
        }
        self.goal.is_match(&lower)
    }
}
