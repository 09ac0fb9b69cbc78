//! Core library for the `zbx-nginx-stats` agent.
//!
//! This crate provides the building blocks used by the binary: CLI argument
//! types, configuration parsing, cursor persistence, log tailing, per-minute
//! window aggregation, and the collector wire protocol. The primary
//! user-facing interface is the `zbx-nginx-stats` command-line application;
//! library APIs may evolve as the agent grows.
pub mod app;
pub mod args;
pub mod collector;
pub mod config;
pub mod cursor;
pub mod entry;
pub mod error;
pub mod logger;
pub mod parse;
pub mod tail;
pub mod window;
