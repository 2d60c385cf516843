//! FridgeNutri Tools module
//!
//! Tool implementations behind the MCP server. Each returns a serializable
//! response or an error message.

pub mod days;
pub mod goals;
pub mod photo;
pub mod scores;
pub mod session;
pub mod status;

pub use session::Session;
