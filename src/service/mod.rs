//! Boundary to the web front end.
//!
//! The front end uploads a file, calls this service over a local socket,
//! and gets back either a transcript plus a download reference or an
//! error message. One JSON request line per connection.

pub mod handler;
pub mod protocol;
pub mod server;

pub use handler::TranscribeHandler;
pub use protocol::{Request, Response};
pub use server::{RequestHandler, ServiceServer};
