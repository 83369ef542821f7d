//! Per-dialect connection keyword registry.
//!
//! Each dialect carries a set of default connection options (keywords) that
//! adapters apply when they open a connection. The registry is the only
//! process-wide mutable state in the crate: it is created once on first use,
//! holds one accumulator per dialect, and is append-only. A keyword that has
//! already been set can only be replaced by a value with strictly higher
//! priority; nothing is ever removed.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dialect::DatabaseType;

/// Who set a keyword. Later variants beat earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordPriority {
    SystemDefaultLow,
    SystemDefaultMedium,
    SystemDefaultHigh,
    ApiRule,
    ObjectOverride,
}

/// A single connection keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub name: String,
    pub value: String,
    pub priority: KeywordPriority,
}

/// Ordered, case-insensitive keyword set.
#[derive(Debug, Clone, Default)]
pub struct KeywordAccumulator {
    keywords: Vec<Keyword>,
}

impl KeywordAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or upgrade a keyword. Returns `true` if the set changed.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        priority: KeywordPriority,
    ) -> bool {
        let name = name.into();
        let value = value.into();
        match self
            .keywords
            .iter_mut()
            .find(|k| k.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) if priority > existing.priority => {
                existing.value = value;
                existing.priority = priority;
                true
            }
            Some(_) => false,
            None => {
                self.keywords.push(Keyword {
                    name,
                    value,
                    priority,
                });
                true
            }
        }
    }

    /// Merge every keyword of `other` into this set using the same priority rule.
    pub fn merge(&mut self, other: &KeywordAccumulator) {
        for k in &other.keywords {
            self.add(k.name.clone(), k.value.clone(), k.priority);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Process-wide registry of keyword accumulators, one per dialect.
#[derive(Debug, Default)]
pub struct KeywordRegistry {
    accumulators: RwLock<HashMap<DatabaseType, KeywordAccumulator>>,
}

static GLOBAL: OnceLock<KeywordRegistry> = OnceLock::new();

impl KeywordRegistry {
    /// A fresh, private registry (tests and embedded use).
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared registry, initialized on first access.
    pub fn global() -> &'static KeywordRegistry {
        GLOBAL.get_or_init(KeywordRegistry::new)
    }

    /// Register a keyword for `db`. Returns `true` if it took effect.
    pub fn add(
        &self,
        db: DatabaseType,
        name: &str,
        value: &str,
        priority: KeywordPriority,
    ) -> bool {
        let mut guard = self
            .accumulators
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let changed = guard.entry(db).or_default().add(name, value, priority);
        if changed {
            debug!("Keyword {}={} registered for {} ({:?})", name, value, db, priority);
        }
        changed
    }

    /// Snapshot of the keywords currently registered for `db`.
    pub fn keywords(&self, db: DatabaseType) -> KeywordAccumulator {
        self.accumulators
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&db)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(KeywordPriority::SystemDefaultLow < KeywordPriority::SystemDefaultMedium);
        assert!(KeywordPriority::SystemDefaultHigh < KeywordPriority::ApiRule);
        assert!(KeywordPriority::ApiRule < KeywordPriority::ObjectOverride);
    }

    #[test]
    fn test_accumulator_only_upgrades_on_strictly_higher_priority() {
        let mut acc = KeywordAccumulator::new();
        assert!(acc.add("busy_timeout", "1000", KeywordPriority::ApiRule));
        assert!(!acc.add("BUSY_TIMEOUT", "5", KeywordPriority::ApiRule));
        assert!(!acc.add("busy_timeout", "5", KeywordPriority::SystemDefaultHigh));
        assert_eq!(acc.get("busy_timeout").unwrap().value, "1000");

        assert!(acc.add("busy_timeout", "9", KeywordPriority::ObjectOverride));
        assert_eq!(acc.get("Busy_Timeout").unwrap().value, "9");
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn test_registry_is_per_dialect() {
        let reg = KeywordRegistry::new();
        reg.add(DatabaseType::Sqlite, "journal_mode", "wal", KeywordPriority::ApiRule);
        assert_eq!(reg.keywords(DatabaseType::Sqlite).len(), 1);
        assert!(reg.keywords(DatabaseType::Postgres).is_empty());
    }

    #[test]
    fn test_merge_respects_priority() {
        let mut base = KeywordAccumulator::new();
        base.add("a", "1", KeywordPriority::SystemDefaultLow);
        base.add("b", "1", KeywordPriority::ObjectOverride);

        let mut overlay = KeywordAccumulator::new();
        overlay.add("a", "2", KeywordPriority::ApiRule);
        overlay.add("b", "2", KeywordPriority::ApiRule);

        base.merge(&overlay);
        assert_eq!(base.get("a").unwrap().value, "2");
        assert_eq!(base.get("b").unwrap().value, "1");
    }

    #[test]
    fn test_global_registry_is_singleton() {
        let a = KeywordRegistry::global() as *const _;
        let b = KeywordRegistry::global() as *const _;
        assert_eq!(a, b);
    }
}
