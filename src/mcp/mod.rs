//! Model Context Protocol message types and request dispatch
//!
//! Transport-independent: both the stdio and HTTP transports decode into
//! `rpc::Request` and hand it to `server::Dispatcher`.

pub mod params;
pub mod rpc;
pub mod server;
