//! Fixed-capacity, file-backed per-role document registry.
//!
//! Five slots, identified by index. `put` is an unconditional overwrite
//! (last writer wins, no merge semantics); `delete` is idempotent; `list`
//! always reports all five slots so callers never special-case absence.
//! Preview regeneration rides along with `put` but is best-effort: a failed
//! render leaves the slot document intact and the preview missing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{warn, Level};

use crate::audit::{AuditDomain, AuditEvent};
use crate::error::{RenderDegradation, SlotError};
use crate::model::{Document, SlotId, SlotView, SLOT_COUNT};
use crate::preview::render_preview;

#[derive(Debug)]
pub struct SlotStore {
    root: PathBuf,
    thumbs: PathBuf,
}

impl SlotStore {
    /// Open (creating if needed) the store rooted at `root`, with previews
    /// under `root/thumbs/`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SlotError> {
        let root = root.into();
        let thumbs = root.join("thumbs");
        fs::create_dir_all(&thumbs)?;
        Ok(SlotStore { root, thumbs })
    }

    pub fn pdf_path(&self, slot: SlotId) -> PathBuf {
        self.root.join(slot.pdf_name())
    }

    pub fn preview_path(&self, slot: SlotId) -> PathBuf {
        self.thumbs.join(slot.preview_name())
    }

    /// Overwrite the slot's document and regenerate its preview. A preview
    /// failure is recorded and leaves the preview absent; it never fails the
    /// put. A missing preview is a valid, displayable state.
    pub fn put(&self, slot: SlotId, document: &Document) -> Result<(), SlotError> {
        fs::write(self.pdf_path(slot), &document.bytes)?;
        AuditEvent {
            level: Level::INFO,
            domain: AuditDomain::Slots,
            kind: "slot_put",
            actor: None,
            outcome: "ok",
            message: document.kind.as_str(),
        }
        .emit();

        if let Err(degraded) = self.regenerate_preview(slot) {
            warn!(slot = slot.get(), reason = %degraded.reason, "preview regeneration degraded");
            // A stale preview from an earlier document must not survive.
            remove_if_present(&self.preview_path(slot));
            AuditEvent {
                level: Level::WARN,
                domain: AuditDomain::Preview,
                kind: "preview_degraded",
                actor: None,
                outcome: "no_preview",
                message: &degraded.reason,
            }
            .emit();
        }
        Ok(())
    }

    fn regenerate_preview(&self, slot: SlotId) -> Result<(), RenderDegradation> {
        let bytes = fs::read(self.pdf_path(slot))
            .map_err(|e| RenderDegradation { reason: format!("read document: {e}") })?;
        let name = slot.pdf_name();
        let image = render_preview(&bytes, &name, &name);
        let png = image.encode_png()?;
        fs::write(self.preview_path(slot), png)
            .map_err(|e| RenderDegradation { reason: format!("write preview: {e}") })?;
        Ok(())
    }

    /// Remove the slot's document and preview. Deleting an empty slot is a
    /// no-op, and losing the preview removal is non-fatal.
    pub fn delete(&self, slot: SlotId) -> Result<(), SlotError> {
        match fs::remove_file(self.pdf_path(slot)) {
            Ok(()) => {
                AuditEvent {
                    level: Level::INFO,
                    domain: AuditDomain::Slots,
                    kind: "slot_delete",
                    actor: None,
                    outcome: "ok",
                    message: "slot emptied",
                }
                .emit();
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(SlotError::Io(e)),
        }
        remove_if_present(&self.preview_path(slot));
        Ok(())
    }

    /// Exactly five entries in index order, each reporting document and
    /// preview presence.
    pub fn list(&self) -> [SlotView; SLOT_COUNT] {
        SlotId::ALL.map(|slot| SlotView {
            slot,
            has_document: self.pdf_path(slot).exists(),
            has_preview: self.preview_path(slot).exists(),
        })
    }

    /// Stored document bytes for serving, `None` when the slot is empty.
    pub fn document_bytes(&self, slot: SlotId) -> Result<Option<Vec<u8>>, SlotError> {
        match fs::read(self.pdf_path(slot)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SlotError::Io(e)),
        }
    }
}

fn remove_if_present(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "best-effort removal failed");
        }
    }
}
