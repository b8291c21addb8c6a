//! Query string construction for Helix endpoints

use std::fmt::Write;

/// How a channel identifier should be sent to the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// Numeric user id
    Id,
    /// Login name
    Login,
}

/// Classifies a channel identifier
///
/// Purely-numeric strings are user ids; everything else is a login name.
pub fn classify_id(value: &str) -> IdKind {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        IdKind::Id
    } else {
        IdKind::Login
    }
}

/// Ordered query parameter list
///
/// Parameters render in insertion order; the first uses `?`, the rest `&`.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter, percent-encoding the value
    pub fn push(&mut self, key: &str, value: &str) {
        self.pairs
            .push((key.to_string(), urlencoding::encode(value).into_owned()));
    }

    /// Appends a parameter when the value is present
    pub fn push_opt(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Renders the query string, empty when no parameters were added
    pub fn build(&self) -> String {
        let mut out = String::new();
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            let _ = write!(out, "{}{}={}", sep, key, value);
        }
        out
    }
}
