use anyhow::Result;
use clap::Parser;
use colored::*;
use uuid::Uuid;

use testing_tools::api_client::ApiClient;
use testing_tools::output::print_test_summary;
use testing_tools::poll_client::Connection;
use testing_tools::scenarios;

#[derive(Parser)]
#[command(name = "relay-test-client")]
#[command(about = "Relay Integration Testing Tool")]
struct Cli {
    /// Base URL of the relay (e.g., http://localhost:9999)
    #[arg(long)]
    base_url: String,

    /// Test scenario to run
    #[arg(long, value_enum)]
    scenario: ScenarioChoice,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone)]
enum ScenarioChoice {
    /// Test that idle poll streams stay open
    Connection,
    /// Test fan-out to every poller except the sender
    Broadcast,
    /// Test that a live session id cannot be polled twice
    Conflict,
    /// Run all tests
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    println!("{}", "=== SETUP PHASE ===".bright_white().bold());

    let api_client = ApiClient::new(reqwest::Client::new(), cli.base_url.clone());

    println!("{} Checking relay health...", "→".blue());
    api_client.health_check().await?;
    println!("{} Relay is healthy", "✓".green());

    // Random ids keep the run from colliding with real clients
    println!("\n{} Establishing poll connections...", "→".blue());
    let mut poll1 = Connection::establish(
        &api_client,
        &format!("test-{}", Uuid::new_v4()),
        "Client 1".to_string(),
    )
    .await?;
    let mut poll2 = Connection::establish(
        &api_client,
        &format!("test-{}", Uuid::new_v4()),
        "Client 2".to_string(),
    )
    .await?;

    println!("{} Client 1 polling as {}", "✓".green(), poll1.session_id);
    println!("{} Client 2 polling as {}", "✓".green(), poll2.session_id);

    println!("\n{}", "=== TEST PHASE ===".bright_white().bold());

    let mut results = Vec::new();

    match cli.scenario {
        ScenarioChoice::Connection => {
            results.push(scenarios::test_connection(&mut poll1, &mut poll2).await?);
        }
        ScenarioChoice::Broadcast => {
            results.push(scenarios::test_broadcast(&api_client, &mut poll1, &mut poll2).await?);
        }
        ScenarioChoice::Conflict => {
            results.push(scenarios::test_conflict(&api_client, &mut poll1).await?);
        }
        ScenarioChoice::All => {
            results.push(scenarios::test_connection(&mut poll1, &mut poll2).await?);
            results.push(scenarios::test_broadcast(&api_client, &mut poll1, &mut poll2).await?);
            results.push(scenarios::test_conflict(&api_client, &mut poll1).await?);
        }
    }

    println!("\n{}", "=== RESULTS ===".bright_white().bold());
    print_test_summary(&results);

    let all_passed = results.iter().all(|r| r.passed);

    if all_passed {
        println!("\n{}", "All tests passed! ✓".bright_green().bold());
    } else {
        println!("\n{}", "Some tests failed! ✗".bright_red().bold());
    }

    std::process::exit(if all_passed { 0 } else { 1 });
}
