pub mod section;

// Re-export key extraction types for convenience
pub use section::{archive, ArchiveReport};
