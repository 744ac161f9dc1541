pub mod nc;

pub use nc::{DatasetAttributes, NcWriter, WriteError};
