//! HTTP utilities and middleware shared by the server and its tests.

pub mod security;

pub use security::{build_security_headers, security_headers_middleware, SecurityHeaders};
