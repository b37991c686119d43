// Testing Tools Library
//
// This crate provides testing utilities and tools for the bro relay.
// Currently includes:
// - relay-test-client: end-to-end testing tool for a running relay

pub mod api_client;
pub mod output;
pub mod poll_client;
pub mod scenarios;
