//! deckhand common library
//!
//! Configuration, the shared error type, and the thin adapters around the
//! external build toolchain: bundler, style compiler, linter and the zip
//! packager.

pub mod archive;
pub mod bundle;
pub mod config;
pub mod error;
pub mod lint;
pub mod paths;
pub mod style;
pub mod tool;

// Re-export commonly used types
pub use bundle::{BundleOptions, Bundler, ModuleFormat};
pub use config::{Browser, DeckConfig, CONFIG_FILE};
pub use error::{Error, Result};
pub use style::StyleCompiler;

/// deckhand version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
