//! Template variables and the substitution sublanguage.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::value_objects::content::{PLACEHOLDER, TemplateContent};

static VARIABLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("variable name pattern is valid")
});

/// Whether `name` is a legal placeholder identifier.
pub fn is_valid_variable_name(name: &str) -> bool {
    VARIABLE_NAME.is_match(name)
}

// ── TemplateVariables ─────────────────────────────────────────────────────────

/// Validated name → value map.
///
/// Values are always strings; names always match `^[a-zA-Z_][a-zA-Z0-9_]*$`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateVariables {
    values: HashMap<String, String>,
}

impl TemplateVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any iterator of pairs, validating every name.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .try_fold(Self::new(), |vars, (k, v)| vars.with(k, v))
    }

    /// Return a copy with one more entry (replacing any previous value).
    pub fn with(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, DomainError> {
        self.insert(name, value)?;
        Ok(self)
    }

    /// Insert in place, validating the name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DomainError> {
        let name = name.into();
        if !is_valid_variable_name(&name) {
            return Err(DomainError::InvalidVariableName { name });
        }
        self.values.insert(name, value.into());
        Ok(())
    }

    /// Right-biased union: entries of `overlay` win. Neither operand changes.
    pub fn merge(base: &Self, overlay: &Self) -> Self {
        let mut values = base.values.clone();
        values.extend(
            overlay
                .values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Apply `f` to every value, keeping names.
    pub fn map_values(&self, mut f: impl FnMut(&str, &str) -> String) -> Self {
        Self {
            values: self
                .values
                .iter()
                .map(|(k, v)| (k.clone(), f(k, v)))
                .collect(),
        }
    }
}

impl TryFrom<HashMap<String, String>> for TemplateVariables {
    type Error = DomainError;

    fn try_from(values: HashMap<String, String>) -> Result<Self, Self::Error> {
        Self::from_pairs(values)
    }
}

impl<'de> Deserialize<'de> for TemplateVariables {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, String>::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

// ── Substitution ──────────────────────────────────────────────────────────────

/// What to do with placeholders that have no supplied value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubstitutionPolicy {
    /// Fail with `MissingVariables`.
    #[default]
    Strict,
    /// Leave the placeholder verbatim.
    Ignore,
    /// Replace the placeholder with the empty string.
    Empty,
}

impl SubstitutionPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Ignore => "ignore",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for SubstitutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubstitutionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "ignore" => Ok(Self::Ignore),
            "empty" => Ok(Self::Empty),
            other => Err(DomainError::InvalidConfiguration(format!(
                "unknown substitution policy: {other}"
            ))),
        }
    }
}

/// Merges variables into template text under a [`SubstitutionPolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariableSubstitution {
    policy: SubstitutionPolicy,
}

impl VariableSubstitution {
    pub fn new(policy: SubstitutionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SubstitutionPolicy {
        self.policy
    }

    /// Substitute `vars` into `content`.
    ///
    /// One pass over the template text: `{{name}}` collapses to the bare
    /// value and inserted values are never scanned again.
    ///
    /// # Errors
    ///
    /// `MissingVariables` under [`SubstitutionPolicy::Strict`] when any
    /// required name has no value.
    pub fn apply(
        &self,
        content: &TemplateContent,
        vars: &TemplateVariables,
    ) -> Result<String, DomainError> {
        if self.policy == SubstitutionPolicy::Strict {
            let missing: Vec<String> = content
                .required_variables()
                .iter()
                .filter(|name| !vars.contains(name))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(DomainError::MissingVariables { names: missing });
            }
        }

        let text = PLACEHOLDER.replace_all(content.text(), |caps: &Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            match (vars.get(name), self.policy) {
                (Some(value), _) => value.to_string(),
                (None, SubstitutionPolicy::Empty) => String::new(),
                (None, _) => caps[0].to_string(),
            }
        });

        Ok(text.into_owned())
    }
}
