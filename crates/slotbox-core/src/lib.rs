pub mod admin;
pub mod audit;
pub mod auth;
pub mod error;
pub mod font;
pub mod model;
pub mod poc;
pub mod preview;
pub mod slots;
pub mod surface;

pub use crate::admin::{AdminConfigStore, DEFAULT_ADMIN_EMAIL};
pub use crate::auth::AccessArbiter;
pub use crate::error::{AuthError, ConfigError, RenderDegradation, SlotError, SynthesisError};
pub use crate::model::{AdminConfig, Document, DocumentKind, Role, Session, SlotId, SlotView};
pub use crate::poc::{synthesize, PocKind};
pub use crate::preview::{render_preview, RasterImage};
pub use crate::slots::SlotStore;
