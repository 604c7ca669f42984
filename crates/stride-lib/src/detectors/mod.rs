pub mod gait;

pub use gait::*;
