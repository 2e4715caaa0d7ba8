mod memory_error;

pub use memory_error::{MemoryError, MemoryResult};
