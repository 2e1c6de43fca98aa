//! Command-line client for a running Resource Connect server.
//!
//! ```text
//! rc-client search 30303
//! rc-client zipcodes
//! rc-client chat "where can I get help with my power bill?"
//! ```

#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]
#![allow(clippy::print_stdout)]

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "rc-client", about = "Query a Resource Connect server")]
struct Cli {
    /// Server base URL
    #[arg(long, default_value = "http://localhost:8080")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List resources near a zipcode, grouped by category
    Search { zipcode: String },
    /// List zipcodes with known resources
    Zipcodes,
    /// Send one message to the assistant
    Chat { message: String },
}

async fn check(response: reqwest::Response) -> anyhow::Result<Value> {
    let status = response.status();
    let body: Value = response.json().await.context("response was not JSON")?;
    if !status.is_success() {
        let detail = body["detail"].as_str().unwrap_or("no detail");
        bail!("server returned {status}: {detail}");
    }
    Ok(body)
}

fn print_bucket(title: &str, resources: &Value) {
    let Some(resources) = resources.as_array() else {
        return;
    };
    println!("{title} ({})", resources.len());
    for r in resources {
        println!(
            "  - {} | {} | {}",
            r["name"].as_str().unwrap_or_default(),
            r["address"].as_str().unwrap_or_default(),
            r["phone"].as_str().unwrap_or_default()
        );
    }
}

async fn search(client: &reqwest::Client, base: &str, zipcode: &str) -> anyhow::Result<()> {
    let results = check(
        client
            .get(format!("{base}/api/v1/resources"))
            .query(&[("zipcode", zipcode)])
            .send()
            .await?,
    )
    .await?;

    print_bucket("Housing", &results["housing"]);
    print_bucket("Food Assistance", &results["food"]);
    print_bucket("Utility Assistance", &results["utility"]);
    Ok(())
}

async fn zipcodes(client: &reqwest::Client, base: &str) -> anyhow::Result<()> {
    let response = check(
        client
            .post(format!("{base}/graphql"))
            .json(&json!({ "query": "{ zipcodes }" }))
            .send()
            .await?,
    )
    .await?;

    for zip in response["data"]["zipcodes"].as_array().into_iter().flatten() {
        println!("{}", zip.as_str().unwrap_or_default());
    }
    Ok(())
}

async fn chat(client: &reqwest::Client, base: &str, message: &str) -> anyhow::Result<()> {
    let created = check(
        client
            .post(format!("{base}/api/v1/sessions"))
            .send()
            .await?,
    )
    .await?;
    let Some(session_id) = created["sessionId"].as_str() else {
        bail!("server did not return a session id");
    };
    let session_url = format!("{base}/api/v1/sessions/{session_id}");

    let result = check(
        client
            .post(format!("{session_url}/chat"))
            .json(&json!({ "message": message }))
            .send()
            .await?,
    )
    .await;

    // Close the session whether or not the message went through
    client.delete(&session_url).send().await?;

    let reply = result?;
    println!("{}", reply["reply"].as_str().unwrap_or_default());
    if reply["delivered"] == Value::Bool(false) {
        println!("(assistant unreachable)");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.base_url.trim_end_matches('/');

    match cli.command {
        Command::Search { zipcode } => search(&client, base, &zipcode).await,
        Command::Zipcodes => zipcodes(&client, base).await,
        Command::Chat { message } => chat(&client, base, &message).await,
    }
}
