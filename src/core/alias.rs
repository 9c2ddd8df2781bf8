use std::collections::HashMap;
use thiserror::Error;

use crate::core::normalize::normalize;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("spelling '{key}' of '{province}' already belongs to '{existing}'")]
pub struct AliasConflict {
    pub key: String,
    pub province: String,
    pub existing: String,
}

/// Maps every known normalized spelling of a province to the canonical name
/// used as the fee-table key.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `canonical` under its own normalized form and under each alias.
    /// Fails on the first key already claimed by a different province.
    pub fn insert<'a>(
        &mut self,
        canonical: &str,
        aliases: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), AliasConflict> {
        let keys =
            std::iter::once(normalize(canonical)).chain(aliases.into_iter().map(normalize));
        for key in keys {
            if key.is_empty() {
                continue;
            }
            match self.entries.get(&key) {
                Some(existing) if existing != canonical => {
                    return Err(AliasConflict {
                        key,
                        province: canonical.to_string(),
                        existing: existing.clone(),
                    })
                }
                _ => {
                    self.entries.insert(key, canonical.to_string());
                }
            }
        }
        Ok(())
    }

    /// `normalized` must already be the output of `normalize`.
    pub fn resolve_canonical_province(&self, normalized: &str) -> Option<&str> {
        self.entries.get(normalized).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
