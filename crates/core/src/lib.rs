//! Core logic: locating the image reference inside a conversation and
//! orchestrating the strip-or-substitute decision around it.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod filter;
pub mod scan;

pub use filter::{Filter, FilterBuilder};
