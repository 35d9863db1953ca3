//! Local file handling.
//!
//! - replace-on-success writes (`atomic`)
//! - chunk naming, writing and discovery (`chunk`)
//! - download manifest (`manifest`)
//! - CSV concatenation into `merged.csv` (`merge`)

pub mod atomic;
pub mod chunk;
pub mod manifest;
pub mod merge;

pub use atomic::AtomicFile;
pub use chunk::*;
pub use manifest::*;
pub use merge::*;
