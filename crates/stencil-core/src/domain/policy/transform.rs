//! Value transforms applied to variables before substitution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// A named, pure string transform.
///
/// | Name | `"my HTTPServer "` |
/// |------|--------------------|
/// | `trim` | `"my HTTPServer"` |
/// | `lowercase` | `"my httpserver "` |
/// | `uppercase` | `"MY HTTPSERVER "` |
/// | `snake_case` | `"my_http_server"` |
/// | `kebab-case` | `"my-http-server"` |
/// | `PascalCase` | `"MyHttpServer"` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueTransform {
    #[serde(rename = "trim")]
    Trim,
    #[serde(rename = "lowercase")]
    Lowercase,
    #[serde(rename = "uppercase")]
    Uppercase,
    #[serde(rename = "snake_case")]
    SnakeCase,
    #[serde(rename = "kebab-case")]
    KebabCase,
    #[serde(rename = "PascalCase")]
    PascalCase,
}

impl ValueTransform {
    pub const ALL: [Self; 6] = [
        Self::Trim,
        Self::Lowercase,
        Self::Uppercase,
        Self::SnakeCase,
        Self::KebabCase,
        Self::PascalCase,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trim => "trim",
            Self::Lowercase => "lowercase",
            Self::Uppercase => "uppercase",
            Self::SnakeCase => "snake_case",
            Self::KebabCase => "kebab-case",
            Self::PascalCase => "PascalCase",
        }
    }

    pub fn apply(&self, value: &str) -> String {
        match self {
            Self::Trim => value.trim().to_string(),
            Self::Lowercase => value.to_lowercase(),
            Self::Uppercase => value.to_uppercase(),
            Self::SnakeCase => split_words(value).join("_"),
            Self::KebabCase => split_words(value).join("-"),
            Self::PascalCase => split_words(value).iter().map(|w| capitalize(w)).collect(),
        }
    }
}

impl fmt::Display for ValueTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueTransform {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                DomainError::InvalidConfiguration(format!(
                    "unknown transform '{s}' (expected one of: trim, lowercase, \
                     uppercase, snake_case, kebab-case, PascalCase)"
                ))
            })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercased words, split on `_`, `-`, whitespace, `aB` transitions and
/// acronym ends (`HTTPServer` → `http`, `server`).
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    let flush = |current: &mut String, words: &mut Vec<String>| {
        if !current.is_empty() {
            words.push(current.to_lowercase());
            current.clear();
        }
    };

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c.is_whitespace() {
            flush(&mut current, &mut words);
            continue;
        }

        current.push(c);

        let Some(&next) = chars.peek() else {
            continue;
        };
        let camel = c.is_lowercase() && next.is_uppercase();
        let acronym_end = c.is_uppercase()
            && next.is_uppercase()
            && chars.clone().nth(1).is_some_and(char::is_lowercase);
        if camel || acronym_end {
            flush(&mut current, &mut words);
        }
    }
    flush(&mut current, &mut words);

    words
}
