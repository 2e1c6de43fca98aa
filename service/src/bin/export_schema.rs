//! Export the GraphQL schema as SDL for client codegen.
//!
//! Usage: `cargo run --bin export_schema > schema.graphql`

#![allow(clippy::print_stdout)]

use async_graphql::{EmptyMutation, EmptySubscription, Schema};
use resource_connect_api::graphql::QueryRoot;

fn main() {
    let schema = Schema::build(QueryRoot, EmptyMutation, EmptySubscription).finish();
    print!("{}", schema.sdl());
}
