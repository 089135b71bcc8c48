//! Sodavend API — library crate for the vending machine REST server.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `sv-e2e-tests`) can access internal types like `AppState`,
//! `build_router`, and `IntentParser`.

pub mod config;
pub mod db;
pub mod error;
pub mod inference;
pub mod routes;
pub mod seed;
pub mod state;
