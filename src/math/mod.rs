//! Mathematical utilities: polynomial basis, least squares, fit statistics
//! and linear interpolation.

pub mod basis;
pub mod interp;
pub mod ols;
pub mod stats;

pub use basis::*;
pub use interp::*;
pub use ols::*;
pub use stats::*;
