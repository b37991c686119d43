use anyhow::Result;
use colored::*;
use relay::Message;
use reqwest::StatusCode;
use std::time::{Duration, Instant};

use crate::api_client::ApiClient;
use crate::output::{print_delivery, TestResult};
use crate::poll_client::Connection;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);
const SILENCE_WINDOW: Duration = Duration::from_secs(1);

fn failed(scenario: &str, message: String, start: Instant) -> TestResult {
    println!("{} {}", "✗".red(), message);
    TestResult {
        scenario: scenario.to_string(),
        passed: false,
        message: Some(message),
        duration: start.elapsed(),
    }
}

pub async fn test_connection(poll1: &mut Connection, poll2: &mut Connection) -> Result<TestResult> {
    let start = Instant::now();

    println!("\n{}", "=== TEST: Connection Test ===".bright_cyan().bold());
    println!(
        "{}",
        "Testing that idle poll streams stay open without publishing anything".bright_white()
    );

    println!(
        "{} Waiting 2 seconds to verify connections stay alive...",
        "→".blue()
    );
    tokio::time::sleep(Duration::from_secs(2)).await;

    for poll in [&*poll1, &*poll2] {
        if !poll.is_open() {
            return Ok(failed(
                "connection_test",
                format!("{} poll stream closed while idle", poll.label),
                start,
            ));
        }
    }

    println!("{} Connections remain stable", "✓".green());

    Ok(TestResult {
        scenario: "connection_test".to_string(),
        passed: true,
        message: Some("Poll streams established and maintained successfully".to_string()),
        duration: start.elapsed(),
    })
}

/// A third party publishes; both pollers receive it. Then client 1
/// publishes and only client 2 receives it.
pub async fn test_broadcast(
    api_client: &ApiClient,
    poll1: &mut Connection,
    poll2: &mut Connection,
) -> Result<TestResult> {
    let start = Instant::now();

    println!("\n{}", "=== TEST: Broadcast ===".bright_cyan().bold());

    let outsider = Message::new(
        format!("outsider-{}", uuid::Uuid::new_v4()),
        "wut!?",
        true,
    );
    println!("{} Publishing from a non-polling sender...", "→".blue());
    let status = api_client.publish(&outsider).await?;
    if status != StatusCode::OK {
        return Ok(failed("broadcast", format!("Publish answered {status}"), start));
    }

    for poll in [&mut *poll1, &mut *poll2] {
        match poll.wait_for_message(DELIVERY_TIMEOUT).await {
            Ok(delivery) if delivery.message == outsider => {
                print_delivery(&poll.label, &delivery);
            }
            Ok(delivery) => {
                return Ok(failed(
                    "broadcast",
                    format!("{} received {:?}, expected {:?}", poll.label, delivery.message, outsider),
                    start,
                ));
            }
            Err(e) => return Ok(failed("broadcast", e.to_string(), start)),
        }
    }

    let own = Message::new(poll1.session_id.clone(), "bro?", false);
    println!("{} Client 1 publishing under its own session id...", "→".blue());
    let status = api_client.publish(&own).await?;
    if status != StatusCode::OK {
        return Ok(failed("broadcast", format!("Publish answered {status}"), start));
    }

    match poll2.wait_for_message(DELIVERY_TIMEOUT).await {
        Ok(delivery) if delivery.message == own => print_delivery(&poll2.label, &delivery),
        Ok(delivery) => {
            return Ok(failed(
                "broadcast",
                format!("{} received {:?}, expected {:?}", poll2.label, delivery.message, own),
                start,
            ));
        }
        Err(e) => return Ok(failed("broadcast", e.to_string(), start)),
    }

    if let Err(e) = poll1.expect_silence(SILENCE_WINDOW).await {
        return Ok(failed("broadcast", e.to_string(), start));
    }
    println!("{} Sender did not receive its own message", "✓".green());

    Ok(TestResult {
        scenario: "broadcast".to_string(),
        passed: true,
        message: None,
        duration: start.elapsed(),
    })
}

pub async fn test_conflict(api_client: &ApiClient, poll1: &mut Connection) -> Result<TestResult> {
    let start = Instant::now();

    println!("\n{}", "=== TEST: Session Id Conflict ===".bright_cyan().bold());

    println!(
        "{} Opening a second poll with the live id {}...",
        "→".blue(),
        poll1.session_id
    );
    let response = api_client.open_poll(&poll1.session_id).await?;
    let status = response.status();

    if status != StatusCode::CONFLICT {
        return Ok(failed(
            "conflict",
            format!("Expected 409 Conflict, got {status}"),
            start,
        ));
    }
    println!("{} Second poll rejected with {}", "✓".green(), status);

    if !poll1.is_open() {
        return Ok(failed(
            "conflict",
            "The original poll stream closed after the conflict".to_string(),
            start,
        ));
    }
    println!("{} Original poll stream is still open", "✓".green());

    Ok(TestResult {
        scenario: "conflict".to_string(),
        passed: true,
        message: None,
        duration: start.elapsed(),
    })
}
