//! Request runner for the bizsim engine
//!
//! Reads an analysis request from YAML, runs it through `bizsim_core` and
//! renders the result as a YAML report.

// ============================================================================
// Runner modules
// ============================================================================

pub mod logging;
pub mod report;
pub mod request;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use logging::init_logging;
pub use report::Report;
pub use request::{AnalysisRequest, ReportOptions};
