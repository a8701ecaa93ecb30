//! Input/output helpers.
//!
//! - observation CSV ingest + validation (`ingest`)
//! - species record JSON store (`record`)
//! - spectrum / diagnostics / observation exports (`export`)

pub mod export;
pub mod ingest;
pub mod record;

pub use export::*;
pub use ingest::*;
pub use record::*;
