//! Shared helpers for the integration suites
#![allow(dead_code)]

pub mod fleet;
pub mod mocks;
