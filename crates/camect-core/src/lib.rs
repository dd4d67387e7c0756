// camect-core: Hub sessions and host-side integration layer between camect-api and consumers.

pub mod config;
pub mod delegate;
pub mod error;
pub mod event;
pub mod registry;
pub mod rules;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::SessionConfig;
pub use delegate::{ChannelDelegate, HubNotification, HubStatus, SessionDelegate};
pub use error::CoreError;
pub use event::{EventKind, HubEvent};
pub use registry::{HubRegistry, HubState};
pub use rules::{CameraTransition, EventRule, ObjectFilter, RuleKind, Selector};
pub use session::Session;

// Re-export the api types consumers need alongside a session.
pub use camect_api::{
    Camera, ConnectionState, DEFAULT_PORT, HomeInfo, HubEndpoint, ReconnectConfig, Scheme,
    StreamStatus, TlsMode, TransportConfig,
};
