//! Export the `OpenAPI` document as JSON for client codegen.
//!
//! Usage: `cargo run --bin export_openapi > openapi.json`

#![allow(clippy::print_stdout)]

use resource_connect_api::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), anyhow::Error> {
    print!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}
