//! Reef Monitor - aquarium pH, temperature and outlet dashboard API
//!
//! This library exposes the core modules for testing and reuse.

pub mod common;
pub mod config;
pub mod entity;
pub mod error;
pub mod poller;
pub mod routes;
pub mod series;
pub mod store;
