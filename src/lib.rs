/// APRS data model: addresses, packets, information field.
pub mod aprs;
/// TTL cache and its background sweeper.
pub mod cache;
/// Radio framing: KISS and AX.25 UI frames.
pub mod codec;
/// Settings loading: defaults, TOML file, environment, command line.
pub mod config;
/// Common error types for every subsystem.
pub mod error;
/// Supervisor wiring sources, broadcaster and subscribers.
pub mod gateway;
/// Packet sources: APRS-IS feed and KISS radio.
pub mod ingest;
/// Flexible logging (formatting, filters, sinks).
pub mod logging;
/// Republishing server, HTTP submission and startup banner.
pub mod network;
/// Dedup, routing and delivery of notifications.
pub mod notify;
/// Pub/Sub: Broadcaster, Subscription, statistics.
pub mod pubsub;
/// Diagnostic packet logger and the info sink capability.
pub mod reporter;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Packets and their parts.
pub use aprs::{Address, AddressedMessage, Body, BodyKind, Message, Position};
/// Dedup cache.
pub use cache::{spawn_sweeper, TtlCache};
/// Configuration.
pub use config::{Cli, Settings};
/// Operation errors and result types.
pub use error::{
    DeliveryError, FeedError, FrameError, GateError, GateResult, LoggingError, NotifierError,
    ParseError, RadioError, ServerError,
};
/// Supervisor.
pub use gateway::Gateway;
/// Logging.
pub use logging::{init_logging, LoggingConfig, LoggingHandle};
/// Pub/Sub API.
pub use pubsub::{BroadcastSnapshot, Broadcaster, SharedMessage, SubscriberId, Subscription};
/// Info sink.
pub use reporter::{InfoSink, TracingInfoSink};
