//! Deterministic renaming of duplicate and ambiguous record names

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::core::reshape::ReshapeError;

/// Hands out replacement names in encounter order
///
/// The Nth record carrying a source name receives the Nth alternate. The
/// counters live for one extraction run, so rows must be fed in file order.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    replacements: BTreeMap<String, Vec<String>>,
    consumed: HashMap<String, usize>,
}

impl NameResolver {
    pub fn new(replacements: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            replacements,
            consumed: HashMap::new(),
        }
    }

    /// Resolve a raw name, consuming one alternate if the name has any
    ///
    /// Returns `Ok(None)` for names without a replacement entry.
    pub fn resolve(&mut self, name: &str) -> Result<Option<String>, ReshapeError> {
        let Some(alternates) = self.replacements.get(name) else {
            return Ok(None);
        };

        let index = self.consumed.entry(name.to_string()).or_insert(0);
        let alternate = alternates
            .get(*index)
            .ok_or_else(|| ReshapeError::InsufficientAlternates {
                name: name.to_string(),
                available: alternates.len(),
            })?;
        *index += 1;

        Ok(Some(alternate.clone()))
    }
}

/// Set of names already emitted in a run
#[derive(Debug, Clone, Default)]
pub struct UniqueNames {
    seen: HashSet<String>,
}

impl UniqueNames {
    pub fn claim(&mut self, name: &str) -> Result<(), ReshapeError> {
        if !self.seen.insert(name.to_string()) {
            return Err(ReshapeError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
