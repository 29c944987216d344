pub mod balance;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod version;

// Re-export the pipeline surface for convenience
pub use config::{Config, DirectivePolicy};
pub use error::{Diagnostic, ErrorKind, ValidationError, ValidationOutcome};
pub use pipeline::{Pipeline, validate};
pub use version::{SUPPORTED_VERSION, Version};
