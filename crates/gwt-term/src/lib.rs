#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Terminal output primitives for the gwt command line.
//!
//! Rendering, prompts and spinners live here so `libgwt` stays free of any
//! terminal concerns. Commands write through the [`Output`] trait and never
//! touch stdout directly.

/// Output trait and its terminal and quiet implementations.
mod output;

pub use output::{Output, OutputError, Quiet, Result, Spinner, Terminal};
