//! Live configuration shared between the menu, the event handler and ramps

use super::{ConfigError, RuntimeConfig};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cloneable handle to the process-wide `RuntimeConfig`.
///
/// Readers copy a whole snapshot; writers go through [`SharedConfig::update`],
/// which commits only a candidate that passes validation. An edit is seen by
/// the next event that takes a snapshot.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<RuntimeConfig>>,
}

impl SharedConfig {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current values
    pub fn snapshot(&self) -> RuntimeConfig {
        self.read().clone()
    }

    /// Apply `edit` to a copy, validate it, then commit.
    ///
    /// On error the live values are left untouched.
    pub fn update<F>(&self, edit: F) -> Result<RuntimeConfig, ConfigError>
    where
        F: FnOnce(&mut RuntimeConfig),
    {
        let mut guard = self.write();
        let mut candidate = guard.clone();
        edit(&mut candidate);
        candidate.validate()?;
        *guard = candidate.clone();
        Ok(candidate)
    }

    /// Read a single value without cloning the record
    pub fn with<R>(&self, read: impl FnOnce(&RuntimeConfig) -> R) -> R {
        read(&self.read())
    }

    fn read(&self) -> RwLockReadGuard<'_, RuntimeConfig> {
        // A panicking writer never leaves a half-applied edit behind,
        // so a poisoned lock still holds a valid record.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RuntimeConfig> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
