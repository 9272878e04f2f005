//! Core math modules.

pub mod density;
pub mod stable;
