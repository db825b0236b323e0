//! Provider configuration stores.

pub mod in_memory_source;
pub mod json_file_source;

pub use in_memory_source::{InMemoryConfigSource, SourceDirective};
pub use json_file_source::JsonFileConfigSource;
