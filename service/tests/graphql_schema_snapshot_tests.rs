//! GraphQL schema snapshot tests.
//!
//! These tests ensure the GraphQL API contract doesn't change unintentionally.
//! Run `cargo insta review` to inspect and approve intentional changes.

use async_graphql::{EmptyMutation, EmptySubscription, Schema};
use resource_connect_api::graphql::QueryRoot;

#[test]
fn graphql_schema() {
    let schema = Schema::build(QueryRoot, EmptyMutation, EmptySubscription).finish();

    insta::assert_snapshot!(schema.sdl());
}
