//! Data model shared by the OCR filter crates.
//!
//! This crate defines the conversation payload that flows through the
//! inlet/outlet hooks, the progress events delivered to the host's
//! notification sink, and the trait seam that extraction backends
//! implement.
//!
//! Types in this crate don't perform any I/O, instead they are the
//! contracts that the implementors should adhere to. Behavior lives in
//! the crates that implement or consume them.

#![deny(missing_docs)]

mod error;
mod event;
mod extractor;
mod payload;

pub use error::*;
pub use event::*;
pub use extractor::*;
pub use payload::*;
