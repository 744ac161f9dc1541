pub mod memory;
pub mod nc;
pub mod types;
pub mod utils;

pub use memory::MemoryReader;
pub use nc::NcReader;
pub use types::{CoordinateInfo, DataReader, DatasetInfo, ReadError, VariableInfo};
pub use utils::is_supported_file_type;
