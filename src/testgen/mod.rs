pub mod generator;
pub mod materialize;
pub mod result;

pub use generator::{strip_code_fences, TestGenerator};
pub use materialize::{print_results, write_results, OutputLayout, WriteOptions, WriteReport};
pub use result::GenerationResult;
