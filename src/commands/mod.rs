// Command handlers module
pub mod config;
pub mod report;
pub mod snapshot;
pub mod version;

// Re-exports for cleaner imports
pub use report::execute as report;
pub use snapshot::execute as snapshot;
pub use version::execute as version;
