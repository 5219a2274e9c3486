//! Access arbiter: authentication state machine and role gate.
//!
//! The credential table is a closed two-entry demo mapping, not a real
//! credential store. It must not be extended with open registration or new
//! entries without replacing it with a proper identity provider.

use tracing::Level;

use crate::audit::{AuditDomain, AuditEvent};
use crate::error::AuthError;
use crate::model::{Role, Session};

const CREDENTIALS: [(&str, &str, Role); 2] = [
    ("attacker", "attacker", Role::Attacker),
    ("admin", "admin", Role::Admin),
];

/// Owns sessions and arbitrates every mutating operation. Authorization is
/// re-evaluated per request; a denial short-circuits before any side effect.
#[derive(Debug, Default)]
pub struct AccessArbiter;

impl AccessArbiter {
    pub fn new() -> Self {
        AccessArbiter
    }

    /// Exchange credentials for an authenticated session. Any pair outside
    /// the fixed table fails and leaves the caller anonymous.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        for (user, pass, role) in CREDENTIALS {
            if username == user && password == pass {
                AuditEvent {
                    level: Level::INFO,
                    domain: AuditDomain::Session,
                    kind: "login",
                    actor: Some(username),
                    outcome: "ok",
                    message: role.as_str(),
                }
                .emit();
                return Ok(Session { principal: Some(user.to_string()), role: Some(role) });
            }
        }
        AuditEvent {
            level: Level::WARN,
            domain: AuditDomain::Session,
            kind: "login",
            actor: Some(username),
            outcome: "invalid_credentials",
            message: "login rejected",
        }
        .emit();
        Err(AuthError::InvalidCredentials)
    }

    /// Unconditionally return to the anonymous state, discarding the role.
    pub fn logout(&self, session: Session) -> Session {
        AuditEvent {
            level: Level::INFO,
            domain: AuditDomain::Session,
            kind: "logout",
            actor: session.principal.as_deref(),
            outcome: "ok",
            message: "session cleared",
        }
        .emit();
        Session::anonymous()
    }

    /// Gate an operation on `required`. Exhaustive over the closed role set:
    /// adding a role forces every check here to be revisited.
    pub fn authorize(&self, session: &Session, required: Role) -> Result<(), AuthError> {
        let allowed = match (session.role, required) {
            (Some(Role::Admin), Role::Admin) => true,
            (Some(Role::Attacker), Role::Attacker) => true,
            (Some(Role::Admin), Role::Attacker)
            | (Some(Role::Attacker), Role::Admin)
            | (None, Role::Admin)
            | (None, Role::Attacker) => false,
        };
        if allowed {
            Ok(())
        } else {
            AuditEvent {
                level: Level::WARN,
                domain: AuditDomain::Session,
                kind: "authorize",
                actor: session.principal.as_deref(),
                outcome: "forbidden",
                message: required.as_str(),
            }
            .emit();
            Err(AuthError::Forbidden { required })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_table_maps_both_identities() {
        let arbiter = AccessArbiter::new();
        let attacker = arbiter.login("attacker", "attacker").expect("attacker login");
        assert_eq!(attacker.role, Some(Role::Attacker));
        let admin = arbiter.login("admin", "admin").expect("admin login");
        assert_eq!(admin.role, Some(Role::Admin));
    }

    #[test]
    fn unknown_pairs_leave_caller_anonymous() {
        let arbiter = AccessArbiter::new();
        assert!(matches!(
            arbiter.login("admin", "attacker"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(arbiter.login("guest", "guest"), Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn logout_discards_role() {
        let arbiter = AccessArbiter::new();
        let session = arbiter.login("admin", "admin").expect("login");
        let session = arbiter.logout(session);
        assert!(!session.is_authenticated());
        assert_eq!(session.role, None);
    }

    #[test]
    fn authorize_requires_exact_role() {
        let arbiter = AccessArbiter::new();
        let admin = arbiter.login("admin", "admin").expect("login");
        let attacker = arbiter.login("attacker", "attacker").expect("login");
        let anon = Session::anonymous();

        assert!(arbiter.authorize(&admin, Role::Admin).is_ok());
        assert!(arbiter.authorize(&attacker, Role::Attacker).is_ok());
        assert!(matches!(
            arbiter.authorize(&admin, Role::Attacker),
            Err(AuthError::Forbidden { required: Role::Attacker })
        ));
        assert!(matches!(
            arbiter.authorize(&attacker, Role::Admin),
            Err(AuthError::Forbidden { required: Role::Admin })
        ));
        assert!(arbiter.authorize(&anon, Role::Admin).is_err());
    }
}
