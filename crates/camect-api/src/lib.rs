// camect-api: Async Rust client for the Camect hub REST API and event stream

mod alerts;
pub mod auth;
mod cameras;
pub mod client;
pub mod error;
mod home;
pub mod models;
pub mod transport;
pub mod websocket;

pub use auth::{DEFAULT_PORT, HubEndpoint, Scheme};
pub use client::HubClient;
pub use error::Error;
pub use models::{Camera, HomeInfo};
pub use transport::{TlsMode, TransportConfig};
pub use websocket::{
    Backoff, ConnectionState, EventStream, ReconnectConfig, StreamObserver, StreamStatus,
    StreamTarget,
};
