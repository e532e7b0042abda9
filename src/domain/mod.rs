//! Tool, resource and formatting logic exposed over the MCP protocol

pub mod format;
pub mod resources;
pub mod tools;
