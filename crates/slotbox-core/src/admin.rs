//! Admin configuration store: one shared mutable record.
//!
//! The record is owned by this service and injected into handlers; it is not
//! ambient global state. Opening the store resets the persisted value to the
//! default, so the file on disk is an audit/demo artifact rather than a
//! durability promise.

use std::fs;
use std::path::PathBuf;

use tracing::Level;

use crate::audit::{AuditDomain, AuditEvent};
use crate::error::ConfigError;
use crate::model::{AdminConfig, Role};

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@bank.local";

#[derive(Debug)]
pub struct AdminConfigStore {
    path: PathBuf,
}

impl AdminConfigStore {
    /// Open the store backed by `path` and unconditionally reset it to the
    /// default, discarding any prior persisted state. Call once at process
    /// start.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let store = AdminConfigStore { path: path.into() };
        store.reset()?;
        Ok(store)
    }

    /// Restore the fixed default, regardless of what was persisted before.
    pub fn reset(&self) -> Result<(), ConfigError> {
        self.write(&AdminConfig { admin_email: DEFAULT_ADMIN_EMAIL.to_string() })
    }

    pub fn get(&self) -> Result<AdminConfig, ConfigError> {
        let raw = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Change the admin email; only an `Admin` actor may do so, and the
    /// email must be non-empty. Returns the previous value for audit
    /// display. Callers reach this only through a state-mutating request
    /// method (see `surface::change_email`).
    pub fn set(&self, new_email: &str, actor: Role) -> Result<String, ConfigError> {
        match actor {
            Role::Admin => {}
            Role::Attacker => return Err(ConfigError::Forbidden),
        }
        let new_email = new_email.trim();
        if new_email.is_empty() {
            return Err(ConfigError::EmptyEmail);
        }
        let old = self.get()?.admin_email;
        self.write(&AdminConfig { admin_email: new_email.to_string() })?;
        AuditEvent {
            level: Level::INFO,
            domain: AuditDomain::AdminConfig,
            kind: "email_changed",
            actor: Some(Role::Admin.as_str()),
            outcome: "ok",
            message: &format!("{old} -> {new_email}"),
        }
        .emit();
        Ok(old)
    }

    fn write(&self, config: &AdminConfig) -> Result<(), ConfigError> {
        let raw = serde_json::to_vec(config)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_resets_any_persisted_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("admin_state.json");
        fs::write(&path, br#"{"admin_email":"stale@evil.example"}"#).expect("seed");
        let store = AdminConfigStore::open(&path).expect("open");
        assert_eq!(store.get().expect("get").admin_email, DEFAULT_ADMIN_EMAIL);
    }

    #[test]
    fn set_returns_previous_value_and_persists_new_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = AdminConfigStore::open(dir.path().join("state.json")).expect("open");
        let before = store.get().expect("get").admin_email;
        let old = store.set("new@bank.local", Role::Admin).expect("set");
        assert_eq!(old, before);
        assert_eq!(store.get().expect("get").admin_email, "new@bank.local");
    }

    #[test]
    fn empty_email_is_a_validation_error_with_no_state_change() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = AdminConfigStore::open(dir.path().join("state.json")).expect("open");
        assert!(matches!(store.set("  ", Role::Admin), Err(ConfigError::EmptyEmail)));
        assert_eq!(store.get().expect("get").admin_email, DEFAULT_ADMIN_EMAIL);
    }

    #[test]
    fn attacker_actor_is_denied_and_value_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = AdminConfigStore::open(dir.path().join("state.json")).expect("open");
        assert!(matches!(
            store.set("attacker@evil.example", Role::Attacker),
            Err(ConfigError::Forbidden)
        ));
        assert_eq!(store.get().expect("get").admin_email, DEFAULT_ADMIN_EMAIL);
    }
}
