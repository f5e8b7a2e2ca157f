/// Command-line interface and end-to-end mosaic processing
pub mod cli;
/// Engine constants and runtime defaults
pub mod configuration;
/// Error types for all mosaic operations
pub mod error;
/// Image loading, mosaic rendering and export
pub mod image;
/// Terminal progress display
pub mod progress;
/// JSON message protocol between caller and worker
pub mod protocol;
/// Caller-owned session state and request construction
pub mod session;
