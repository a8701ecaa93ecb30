//! Species metadata: the static species table, named species groups and
//! band-selection helpers.

pub mod info;

pub use info::*;
