//! Configuration types

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-entity parse configuration, threaded explicitly into every parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReflectionConfig {
    /// Literal annotation names dropped before alias resolution.
    pub ignore: Vec<String>,
    /// Canonical name → alias used in source.
    pub aliases: BTreeMap<String, String>,
    /// Abort the whole load on the first malformed annotation instead of
    /// skipping it.
    pub strict: bool,
}

impl ReflectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_alias(mut self, canonical: impl Into<String>, alias: impl Into<String>) -> Self {
        self.add_alias(canonical, alias);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Register `alias` as the source spelling of `canonical`.
    pub fn add_alias(&mut self, canonical: impl Into<String>, alias: impl Into<String>) {
        self.aliases.insert(canonical.into(), alias.into());
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|n| n == name)
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - no empty ignore entries, canonical names or aliases
    /// - no alias claimed by two canonical names
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pos) = self.ignore.iter().position(|n| n.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("ignore[{}]", pos),
                value: self.ignore[pos].clone(),
                reason: "annotation name must not be empty".to_string(),
            });
        }

        let mut claimed: BTreeMap<&str, &str> = BTreeMap::new();
        for (canonical, alias) in &self.aliases {
            if canonical.trim().is_empty() || alias.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "aliases".to_string(),
                    value: format!("{} = {}", canonical, alias),
                    reason: "canonical name and alias must not be empty".to_string(),
                });
            }
            if let Some(first) = claimed.insert(alias.as_str(), canonical.as_str()) {
                return Err(ConfigError::AmbiguousAlias {
                    alias: alias.clone(),
                    first: first.to_string(),
                    second: canonical.clone(),
                });
            }
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
