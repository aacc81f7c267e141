// Shared helpers for the integration tests. Each test file pulls this in
// with `#[path = "../common/mod.rs"]`, so not every helper is used everywhere.
#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;
