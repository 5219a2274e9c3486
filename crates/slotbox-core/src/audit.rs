//! Structured audit events for security-relevant transitions.
//!
//! Every authorization decision, slot mutation, admin-config change and PoC
//! synthesis emits one of these through `tracing`, keyed with `audit = true`
//! so a subscriber can route them separately from diagnostic logs.

use std::fmt;

use tracing::Level;

#[derive(Debug, Clone, Copy)]
pub enum AuditDomain {
    Session,
    Slots,
    AdminConfig,
    Synthesis,
    Preview,
    Upload,
}

impl AuditDomain {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditDomain::Session => "auth.session",
            AuditDomain::Slots => "store.slots",
            AuditDomain::AdminConfig => "store.admin_config",
            AuditDomain::Synthesis => "poc.synthesis",
            AuditDomain::Preview => "preview.render",
            AuditDomain::Upload => "surface.upload",
        }
    }
}

impl fmt::Display for AuditDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AuditEvent<'a> {
    pub level: Level,
    pub domain: AuditDomain,
    pub kind: &'a str,
    pub actor: Option<&'a str>,
    pub outcome: &'a str,
    pub message: &'a str,
}

impl<'a> AuditEvent<'a> {
    pub fn emit(self) {
        match self.level {
            Level::WARN => tracing::event!(
                Level::WARN,
                audit = true,
                domain = %self.domain,
                kind = self.kind,
                actor = self.actor,
                outcome = self.outcome,
                "{message}",
                message = self.message
            ),
            _ => tracing::event!(
                Level::INFO,
                audit = true,
                domain = %self.domain,
                kind = self.kind,
                actor = self.actor,
                outcome = self.outcome,
                "{message}",
                message = self.message
            ),
        }
    }
}
