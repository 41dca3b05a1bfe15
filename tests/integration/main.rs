//! Integration tests for Link-Auditor
//!
//! These tests use wiremock to create mock HTTP servers and run full page
//! audits end-to-end through the reqwest transport.

mod audit_tests;
mod output_tests;
