//! One module per subcommand; each exposes a function taking the store (or
//! configuration) and the output handler.

/// `gwt browse`.
mod browse;
/// `gwt config`.
mod config;
/// `gwt create`.
mod create;
/// `gwt edit`.
mod edit;
/// `gwt list`.
mod list;
/// `gwt prune`.
mod prune;
/// `gwt remove`.
mod remove;
/// `gwt switch`.
mod switch;

pub use browse::browse;
pub use config::config;
pub use create::{CreateParams, create};
pub use edit::{EditParams, edit};
pub use list::list;
pub use prune::prune;
pub use remove::remove;
pub use switch::switch;
