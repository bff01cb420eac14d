//! Redaction of credentials from text before it is logged.

use std::fmt;

use regex::Regex;

const REDACTED: &str = "[REDACTED]";

/// Scrubs credentials out of text before it is logged
///
/// Error messages can echo request headers or response bodies, so the
/// reporter runs every error chain through this before logging it.
#[derive(Clone)]
pub struct SecretScrubber {
    github_token_pattern: Regex,
    token_pattern: Regex,
    bearer_pattern: Regex,
    literals: Vec<String>,
}

impl SecretScrubber {
    /// Create a new secret scrubber
    pub fn new() -> Self {
        Self {
            // Classic (ghp_, gho_, ghu_, ghs_, ghr_) and fine-grained tokens
            github_token_pattern: Regex::new(r"\b(?:gh[pousr]_[A-Za-z0-9]{20,}|github_pat_[A-Za-z0-9_]{20,})")
                .unwrap(),
            // Match generic token fields
            token_pattern: Regex::new(
                r#"["']?(?:api_key|apikey|token|secret)["']?\s*[:=]\s*["']?([a-zA-Z0-9-_\.]{20,})["']?"#,
            )
            .unwrap(),
            // Match Bearer tokens in Authorization headers
            bearer_pattern: Regex::new(r"Bearer\s+[a-zA-Z0-9-_\.]+").unwrap(),
            literals: Vec::new(),
        }
    }

    /// Also redact this exact value wherever it appears.
    #[must_use]
    pub fn with_literal(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            self.literals.push(secret);
        }
        self
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let mut scrubbed = message.to_string();
        for literal in &self.literals {
            scrubbed = scrubbed.replace(literal.as_str(), REDACTED);
        }
        scrubbed = self
            .bearer_pattern
            .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]")
            .to_string();
        scrubbed = self
            .github_token_pattern
            .replace_all(&scrubbed, "[TOKEN_REDACTED]")
            .to_string();
        scrubbed = self
            .token_pattern
            .replace_all(&scrubbed, |caps: &regex::Captures| {
                let full_match = &caps[0];
                if let Some(colon_pos) = full_match.find(':') {
                    format!("{}:{REDACTED}", &full_match[..colon_pos])
                } else if let Some(eq_pos) = full_match.find('=') {
                    format!("{}={REDACTED}", &full_match[..eq_pos])
                } else {
                    REDACTED.to_string()
                }
            })
            .to_string();
        scrubbed
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber")
            .field("literals", &self.literals.len())
            .finish()
    }
}
