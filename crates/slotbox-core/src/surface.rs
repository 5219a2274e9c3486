//! Contracts consumed by the (out-of-tree) presentation layer.
//!
//! The web framework, templates and cookie transport are external
//! collaborators; this module holds everything they need from the core:
//! upload validation, response-header values for the isolated origin, the
//! method-gated email-change dispatcher, and the insecure variant's
//! single-slot upload area.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{warn, Level};

use crate::admin::AdminConfigStore;
use crate::audit::{AuditDomain, AuditEvent};
use crate::auth::AccessArbiter;
use crate::error::{SurfaceError, UploadError};
use crate::model::{Role, Session};

/// Content-Security-Policy for the isolated document-serving origin: no
/// script execution, images same-origin plus inline data, styles same-origin
/// plus inline, framing denied.
pub const CSP_ISOLATED_ORIGIN: &str = "default-src 'none'; img-src 'self' data:; \
     style-src 'self' 'unsafe-inline'; frame-ancestors 'none'";

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Only `.pdf` uploads are accepted, case-insensitively; the dot is
/// required.
pub fn allowed_upload(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && ext.eq_ignore_ascii_case("pdf"),
        None => false,
    }
}

/// How synthesized PoC bytes are served: rendered in the browser or forced
/// to download for an external viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    pub fn header_value(self, filename: &str) -> String {
        let mode = match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        };
        format!("{mode}; filename=\"{filename}\"")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

/// Outcome of the email-change endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailChangeOutcome {
    /// GET: the current value for the admin's form. Read-only.
    Form { current: String },
    /// POST: the record was mutated.
    Changed { old: String, new: String },
}

/// The admin email-change endpoint. Both methods require the `Admin` role,
/// but only POST can reach `set`: a plain navigational GET (such as the one
/// a link PoC issues) renders the form and mutates nothing. This method gate
/// is the load-bearing contract the hardened variant demonstrates.
pub fn change_email(
    method: RequestMethod,
    session: &Session,
    arbiter: &AccessArbiter,
    store: &AdminConfigStore,
    email: Option<&str>,
) -> Result<EmailChangeOutcome, SurfaceError> {
    arbiter.authorize(session, Role::Admin)?;
    match method {
        RequestMethod::Get => {
            Ok(EmailChangeOutcome::Form { current: store.get().map_err(SurfaceError::Config)?.admin_email })
        }
        RequestMethod::Post => {
            let new = email.unwrap_or_default();
            let old = store.set(new, Role::Admin)?;
            Ok(EmailChangeOutcome::Changed { old, new: new.trim().to_string() })
        }
    }
}

/// Case-insensitive check for the demo trigger phrase in raw PDF bytes.
/// Intentionally a byte-level heuristic, matching the insecure variant.
pub fn has_risk_marker(bytes: &[u8]) -> bool {
    const MARKER: &[u8] = b"riesgo de seguridad";
    bytes
        .windows(MARKER.len())
        .any(|w| w.eq_ignore_ascii_case(MARKER))
}

/// Insecure-variant upload area: an unscoped single-slot registry holding
/// only the most recent upload. Storing a new file purges all prior files
/// first; individual removal failures are non-fatal and the purge continues.
#[derive(Debug)]
pub struct UploadRegistry {
    dir: PathBuf,
}

impl UploadRegistry {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, UploadError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(UploadRegistry { dir })
    }

    /// Validate, purge, save. Returns the stored path.
    pub fn store(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, UploadError> {
        if !allowed_upload(filename) {
            return Err(UploadError::TypeNotAllowed(filename.to_string()));
        }
        self.purge();
        let path = self.dir.join(sanitize_filename(filename));
        fs::write(&path, bytes)?;
        AuditEvent {
            level: Level::INFO,
            domain: AuditDomain::Upload,
            kind: "upload_stored",
            actor: None,
            outcome: "ok",
            message: "prior uploads purged, new file saved",
        }
        .emit();
        Ok(path)
    }

    /// Name of the most recently stored file, if any.
    pub fn latest(&self) -> Option<String> {
        let mut names: Vec<String> = fs::read_dir(&self.dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names.pop()
    }

    fn purge(&self) {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "upload purge could not list directory");
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "upload purge skipped file");
            }
        }
    }
}

/// Keep the stored name to a conservative character set and strip any path
/// components the client supplied.
fn sanitize_filename(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.pdf");
    base.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_is_case_insensitive_and_requires_dot() {
        assert!(allowed_upload("report.pdf"));
        assert!(allowed_upload("REPORT.PDF"));
        assert!(allowed_upload("archive.tar.pdf"));
        assert!(!allowed_upload("report.txt"));
        assert!(!allowed_upload("pdf"));
        assert!(!allowed_upload(".pdf"));
        assert!(!allowed_upload("report.pdf.exe"));
    }

    #[test]
    fn disposition_header_values() {
        assert_eq!(
            Disposition::Inline.header_value("sample_risky.pdf"),
            "inline; filename=\"sample_risky.pdf\""
        );
        assert_eq!(
            Disposition::Attachment.header_value("sample_risky.pdf"),
            "attachment; filename=\"sample_risky.pdf\""
        );
    }

    #[test]
    fn risk_marker_is_case_insensitive() {
        assert!(has_risk_marker(b"... Riesgo de Seguridad ..."));
        assert!(has_risk_marker(b"RIESGO DE SEGURIDAD"));
        assert!(!has_risk_marker(b"sin marcador"));
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("../../etc/passwd.pdf"), "passwd.pdf");
        assert_eq!(sanitize_filename("a b(c).pdf"), "a_b_c_.pdf");
    }
}
