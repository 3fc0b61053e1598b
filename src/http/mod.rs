//! HTTP protocol layer module
//!
//! Range parsing, content types, response building and the streaming body,
//! decoupled from how files are found on disk.

pub mod body;
pub mod mime;
pub mod range;
pub mod response;
pub mod snapshot;

// Re-export commonly used types
pub use body::ResponseBody;
pub use range::{parse_range_header, ByteWindow, RangeSpec};
pub use response::{
    build_405_response, build_error_response, build_options_response, build_response,
    ResponseDescriptor,
};
