// Protocol constants for Gree-protocol air conditioners

use std::time::Duration;

/// UDP port the device listens on
pub const DEFAULT_PORT: u16 = 7000;

/// Default time to wait for a reply datagram
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Receive buffer size, large enough for the biggest observed reply
pub const RECV_BUFFER_SIZE: usize = 64_000;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Length of every device key and generic key
pub const KEY_SIZE: usize = 16;

/// Length of the GCM authentication tag
pub const GCM_TAG_SIZE: usize = 16;

/// Generic key used to encrypt the V1 (ECB) bind request and its reply
pub const GENERIC_KEY_V1: &[u8; KEY_SIZE] = b"a3K8Bx%2r8Y7#xDh";

/// Generic key used to encrypt the V2 (GCM) bind request and its reply
pub const GENERIC_KEY_V2: &[u8; KEY_SIZE] = b"{yxAHAY_Lm6pbC/<";

/// GCM nonce used for all V2 traffic.
///
/// Fixed by the device firmware and reused for every message. Nonce reuse
/// under GCM is unsafe in general; it is reproduced here only because the
/// device will not talk to anything else.
pub const GCM_NONCE: &[u8; 12] = b"\x54\x40\x78\x44\x49\x67\x5a\x51\x6c\x5e\x63\x13";

/// Additional authenticated data bound into every V2 tag
pub const GCM_AAD: &[u8] = b"qualcomm-test";

/// Outer envelope `cid` value
pub const ENVELOPE_CID: &str = "app";

/// Outer envelope `t` value
pub const ENVELOPE_TYPE: &str = "pack";

/// Envelope `i` value for ordinary traffic
pub const ENVELOPE_I_NORMAL: u8 = 0;

/// Envelope `i` value for the bind handshake
pub const ENVELOPE_I_BIND: u8 = 1;
