#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

pub mod build_info;
pub mod chat;
pub mod config;
pub mod graphql;
pub mod http;
pub mod map;
pub mod rest;
pub mod search;
pub mod session;
