//! MCP server module
//!
//! Exposes the FridgeNutri tools over the Model Context Protocol.

mod server;

pub use server::FridgeNutriService;
