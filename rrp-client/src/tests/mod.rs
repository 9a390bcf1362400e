//! Unit tests for the RRP client
//!
//! This module contains tests for the components of the client.

pub mod support;

pub mod config_tests;
pub mod interceptor_tests;
