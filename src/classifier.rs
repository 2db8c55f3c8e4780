// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Pattern-based content policy.
//!
//! The classifier only answers "is this text allowed". What a `Blocked`
//! verdict means depends on the call site:
//!
//! - on a full post text, the whole message is dropped (full block);
//! - on a citation, only the summary is replaced by a placeholder glyph
//!   (partial block) and the citing message is still delivered.

use crate::error::Result;
use regex::{Regex, RegexBuilder};

/// Denylist of word fragments for the source locale (Russian profanity).
pub const DEFAULT_DENYLIST: &str = r"\b(а|о|на|по|ни)?ху[ийеёяю]|\bбля(\b|д|т)|\b(вы|до|разъ|съ)?[её]б([еиалу]|\b)|пизд|\bпид[оа]р";

/// Classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Blocked,
}

impl Verdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Verdict::Blocked)
    }
}

/// Case-insensitive regex denylist.
///
/// Cloning is cheap; the compiled pattern is shared.
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    pattern: Option<Regex>,
}

impl ContentClassifier {
    /// Classifier using [`DEFAULT_DENYLIST`].
    pub fn new() -> Self {
        // The built-in pattern is a constant covered by tests.
        Self::with_pattern(DEFAULT_DENYLIST).unwrap_or_else(|_| Self::allow_all())
    }

    /// Classifier with a custom denylist pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .unicode(true)
            .build()?;
        Ok(Self {
            pattern: Some(regex),
        })
    }

    /// Classifier that allows everything (filtering disabled).
    pub fn allow_all() -> Self {
        Self { pattern: None }
    }

    pub fn classify(&self, text: &str) -> Verdict {
        match &self.pattern {
            Some(re) if re.is_match(text) => Verdict::Blocked,
            _ => Verdict::Allowed,
        }
    }

    pub fn is_blocked(&self, text: &str) -> bool {
        self.classify(text).is_blocked()
    }
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
