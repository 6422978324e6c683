pub mod config;
pub mod detectors;
pub mod error;
pub mod io;
pub mod metrics;
pub mod plot;
pub mod signal;

pub use config::*;
pub use detectors::*;
pub use error::{HypnoError, Result};
pub use metrics::*;
pub use signal::*;
