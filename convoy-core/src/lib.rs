//! Convoy Core
//!
//! Core types for the convoy migration-verification harness.
//!
//! This crate contains:
//! - Domain types: operation identity, status snapshots, poll outcomes
//! - Errors: capability failures shared between the poller and its sources

pub mod domain;
pub mod error;
