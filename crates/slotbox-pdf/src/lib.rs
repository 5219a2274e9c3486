pub mod compose;
pub mod extract;

pub use crate::compose::{compose_document, DocumentSpec, LinkRegion, TextLine};
pub use crate::extract::first_page_text;
