// bodhi-api: Async client for the Bodhi desktop backend command bridge

pub mod bridge;
pub mod error;
pub mod transport;

pub use bridge::BridgeClient;
pub use error::Error;
