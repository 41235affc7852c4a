//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use gree_lib::crypto::{DeviceCipher, DeviceKey, ProtocolVersion};
#[allow(unused_imports)]
pub use gree_lib::device::{DeviceEndpoint, GreeDevice};
#[allow(unused_imports)]
pub use gree_lib::error::{ErrorKind, GreeError};
#[allow(unused_imports)]
pub use gree_lib::message::CommandValue;
#[allow(unused_imports)]
pub use serde_json::{Value, json};

use async_trait::async_trait;
use gree_lib::envelope::{self, Envelope};
use gree_lib::transport::Transport;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[allow(dead_code)]
pub const DEVICE_ID: &str = "f4911e123456";

/// Key the fake device hands out on bind
#[allow(dead_code)]
pub const DEVICE_KEY: &[u8; 16] = b"0123456789abcdef";

#[derive(Default)]
struct Script {
    replies: VecDeque<gree_lib::Result<Bytes>>,
    requests: Vec<Vec<u8>>,
}

/// Transport that replays queued replies and records every request.
///
/// Clones share the same script, so a test keeps one handle for
/// inspection after giving the other to the client.
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<Script>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, datagram: Bytes) {
        self.script.lock().unwrap().replies.push_back(Ok(datagram));
    }

    pub fn push_error(&self, error: GreeError) {
        self.script.lock().unwrap().replies.push_back(Err(error));
    }

    /// Number of datagrams sent so far
    pub fn calls(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }

    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> Vec<u8> {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn exchange(&self, request: &[u8]) -> gree_lib::Result<Bytes> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(request.to_vec());
        script.replies.pop_front().unwrap_or_else(|| {
            Err(GreeError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "mock device has no scripted reply",
            )))
        })
    }
}

/// Route library logs to the test harness; honours RUST_LOG
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn endpoint() -> DeviceEndpoint {
    DeviceEndpoint::new("192.168.1.50", 7000, "F4:91:1E:12:34:56", Duration::from_secs(1))
}

/// Unbound client plus a handle on its transport
#[allow(dead_code)]
pub fn unbound_device(version: ProtocolVersion) -> (GreeDevice<MockTransport>, MockTransport) {
    let transport = MockTransport::new();
    let device = GreeDevice::with_transport(endpoint(), version, transport.clone());
    (device, transport)
}

/// Client already holding [`DEVICE_KEY`]
#[allow(dead_code)]
pub fn bound_device(version: ProtocolVersion) -> (GreeDevice<MockTransport>, MockTransport) {
    let (device, transport) = unbound_device(version);
    (device.with_key(device_key()), transport)
}

#[allow(dead_code)]
pub fn device_key() -> DeviceKey {
    DeviceKey::from_bytes(*DEVICE_KEY)
}

#[allow(dead_code)]
pub fn device_cipher(version: ProtocolVersion) -> DeviceCipher {
    DeviceCipher::for_version(version, &device_key())
}

#[allow(dead_code)]
pub fn generic_cipher(version: ProtocolVersion) -> DeviceCipher {
    DeviceCipher::for_version(version, &version.generic_key())
}

/// Forge the datagram a device would send back with `inner` as its payload
#[allow(dead_code)]
pub fn device_reply(cipher: &DeviceCipher, inner: &Value) -> Bytes {
    let encoded = envelope::encode(cipher, &inner.to_string()).expect("Failed to encrypt reply");
    let bytes = Envelope::new(0, encoded, "app").to_bytes().expect("Failed to serialize reply");
    Bytes::from(bytes)
}

/// Typical bind acknowledgement carrying [`DEVICE_KEY`]
#[allow(dead_code)]
pub fn bind_reply(version: ProtocolVersion) -> Bytes {
    let key = std::str::from_utf8(DEVICE_KEY).unwrap();
    device_reply(
        &generic_cipher(version),
        &json!({"t": "bindok", "mac": DEVICE_ID, "key": key, "r": 200}),
    )
}

/// Status reply for `cols` with values `dat`
#[allow(dead_code)]
pub fn status_reply(version: ProtocolVersion, cols: &[&str], dat: Value) -> Bytes {
    device_reply(
        &device_cipher(version),
        &json!({"t": "dat", "mac": DEVICE_ID, "r": 200, "cols": cols, "dat": dat}),
    )
}

/// Outer JSON envelope of a sent datagram
#[allow(dead_code)]
pub fn outer(request: &[u8]) -> Value {
    serde_json::from_slice(request).expect("request is not JSON")
}

/// Decrypt the inner payload of a sent datagram
#[allow(dead_code)]
pub fn inner(cipher: &DeviceCipher, request: &[u8]) -> Value {
    Value::Object(envelope::decode(cipher, request).expect("Failed to decrypt request"))
}
