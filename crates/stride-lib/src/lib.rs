pub mod config;
pub mod detectors;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod plot;
pub mod render;
pub mod resample;
pub mod signal;
pub mod smooth;
pub mod spline;
pub mod stride;

pub use config::*;
pub use detectors::*;
pub use error::*;
pub use pipeline::*;
pub use signal::*;
