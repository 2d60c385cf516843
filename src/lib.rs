//! FridgeNutri Library
//!
//! Day-by-day nutrition tracking from fridge photos: the day ledger, the diet
//! score engine, persistence and the MCP tools built on them.

pub mod analysis;
pub mod build_info;
pub mod config;
pub mod db;
pub mod ledger;
pub mod mcp;
pub mod models;
pub mod scoring;
pub mod store;
pub mod tools;
