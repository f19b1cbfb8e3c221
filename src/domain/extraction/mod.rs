//! Structured extraction from unreliable model text.

mod extractor;

pub use extractor::{extract, extract_as, ExtractedObject};
