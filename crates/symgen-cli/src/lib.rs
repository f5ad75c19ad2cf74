//! CLI support and pipeline driver for the symgen wrapper generator.
//!
//! This crate provides the `symgen` binary and the generation pipeline: it
//! loads modules through a `SymbolProvider`, enumerates and deduplicates
//! their symbols, materializes the UserType graph and drives emission,
//! optionally followed by a compile step.

pub mod args;
pub mod compiler;
pub mod config;
pub mod driver;
pub mod generator;
pub mod json_provider;
pub mod reporter;
pub mod tracing_config;

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod config_tests;
#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod driver_tests;
