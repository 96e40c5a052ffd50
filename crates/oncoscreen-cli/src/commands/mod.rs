//! CLI Command Implementations
//!
//! - `serve`: HTTP form server
//! - `predict`: one-shot screening

mod predict;
mod serve;

pub use predict::{OutputFormat, PredictCommand};
pub use serve::ServeCommand;
