//! Prompt construction
//!
//! Prompts are a fixed instruction block followed by labeled text segments.
//! Rendering is pure and bounded by a character limit.

mod builder;
pub mod templates;

pub use builder::{OversizeError, PromptBuilder, PromptSegment, PromptSpec, SegmentSize};
