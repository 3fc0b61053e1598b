//! Request handler module
//!
//! Path resolution under the serve root, the per-request serving flow, and
//! the chunked body streamer.

pub mod media;
pub mod resolve;
pub mod router;
pub mod stream;

// Re-export main entry point
pub use router::handle_request;
