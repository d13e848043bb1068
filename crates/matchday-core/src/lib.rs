//! Core types and trait definitions for the Matchday service.
//!
//! Teams, matches and their event logs, the status state machine, standings
//! and the [`engine::MatchEngine`] that runs them over a storage backend.
//! This crate is free of HTTP and database dependencies.

pub mod audit;
pub mod engine;
pub mod error;
pub mod fixture;
pub mod lifecycle;
pub mod standings;
pub mod store;
pub mod team;

pub use error::{Error, ErrorKind, Result};
