pub mod availability;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod device;
pub mod envelope;
pub mod error;
pub mod message;
pub mod probe;
pub mod properties;
pub mod transport;

// Re-export the main client types for easy access
pub use config::ClientConfig;
pub use crypto::{DeviceKey, ProtocolVersion};
pub use device::{DeviceEndpoint, GreeDevice};
pub use error::{ErrorKind, GreeError, Result};
pub use message::{CommandAck, CommandValue, ModeCode};
pub use transport::{Transport, UdpTransport};
