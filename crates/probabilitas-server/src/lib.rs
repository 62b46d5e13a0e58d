//! Probabilitas Server
//!
//! HTTP front end for the Probabilitas expert system: project workspace
//! editing, Naive Bayes analysis as JSON, and a printable HTML report built
//! from the same evaluation.

pub mod cli;
pub mod config;
pub mod report;
pub mod routes;
pub mod state;

pub use cli::Cli;
pub use config::{ReportConfig, ServerConfig};
pub use report::ReportRenderer;
pub use routes::create_router;
pub use state::AppState;
