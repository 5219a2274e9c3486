use thiserror::Error;

use crate::model::Role;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("forbidden: {required} role required")]
    Forbidden { required: Role },
}

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("slot index {0} outside 1..=5")]
    BadIndex(u8),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Compose(#[from] slotbox_pdf::compose::ComposeError),
    #[error("link PoC target origin must not be empty")]
    EmptyTarget,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("forbidden: admin role required")]
    Forbidden,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file type not allowed: {0}")]
    TypeNotAllowed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised by the request-surface helpers in `surface`.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Best-effort preview failure. Previews are generated from untrusted input,
/// so this is observed (logged and recorded as "no preview") and deliberately
/// not propagated as a fatal error.
#[derive(Debug, Error)]
#[error("preview render degraded: {reason}")]
pub struct RenderDegradation {
    pub reason: String,
}
