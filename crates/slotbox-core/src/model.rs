use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SlotError;

/// Number of fixed document slots.
pub const SLOT_COUNT: usize = 5;

/// Fixed permission class resolved by the access arbiter. Closed set:
/// authorization checks match exhaustively so a new role can never be
/// allowed silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Attacker,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Attacker => "attacker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical provenance of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainUpload,
    ScriptPoc,
    LinkPoc,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::PlainUpload => "plain_upload",
            DocumentKind::ScriptPoc => "script_poc",
            DocumentKind::LinkPoc => "link_poc",
        }
    }
}

/// A PDF byte stream plus its logical kind. Immutable once produced: a new
/// upload to the same slot is a new `Document`, never a mutation of the old.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

/// Validated slot index in 1..=5. Both the stored PDF name and the preview
/// name derive from this one value, so the pdf/png pairing cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotId(u8);

impl SlotId {
    pub const ALL: [SlotId; SLOT_COUNT] =
        [SlotId(1), SlotId(2), SlotId(3), SlotId(4), SlotId(5)];

    pub fn new(index: u8) -> Result<Self, SlotError> {
        if (1..=SLOT_COUNT as u8).contains(&index) {
            Ok(SlotId(index))
        } else {
            Err(SlotError::BadIndex(index))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn pdf_name(self) -> String {
        format!("slot{}.pdf", self.0)
    }

    pub fn preview_name(self) -> String {
        format!("slot{}.png", self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Presence report for one slot. `list()` always yields all five, so callers
/// never treat an empty slot as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub slot: SlotId,
    pub has_document: bool,
    pub has_preview: bool,
}

/// Authentication state owned by the access arbiter. Other components only
/// ever see the resolved role, never the session itself.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub principal: Option<String>,
    pub role: Option<Role>,
}

impl Session {
    pub fn anonymous() -> Self {
        Session::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

/// The single process-wide admin record. Reset to its default on every
/// process start; the persisted file is a demo artifact, not a durability
/// guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    pub admin_email: String,
}
