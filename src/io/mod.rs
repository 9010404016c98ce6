//! Input/output helpers.
//!
//! - raw feed ingest from readers and snapshot directories (`ingest`)
//! - series CSV export (`export`)
//! - fit JSON read/write (`fit_file`)

pub mod export;
pub mod fit_file;
pub mod ingest;

pub use export::*;
pub use fit_file::*;
pub use ingest::*;
