pub mod extractor;
pub mod resolver;
pub mod tags;

pub use extractor::extract_blocks;
pub use resolver::resolve;
