pub mod engine;
pub mod json;
pub mod patterns;
pub mod promo;
pub mod types;

pub use engine::ExtractionEngine;
pub use types::{ExtractedPriceUpdate, Extraction};
