// Command bridge to the desktop backend
//
// The backend exposes its commands over a loopback HTTP bridge. Each
// command is a named request/response pair; this module keeps transport
// (client.rs) apart from the per-capability endpoint methods.

pub mod client;
pub mod connections;
pub mod models;
pub mod tasks;

pub use client::BridgeClient;
