//! Outer JSON envelope and the encrypted `pack` it carries.
//!
//! Every datagram, in both directions, is a small JSON object:
//!
//! ```text
//! {"cid":"app","i":0,"pack":"<base64>","t":"pack","tcid":"<mac>","uid":0,"tag":"<base64>"}
//! ```
//!
//! `tag` is present for V2 (GCM) only. `pack` is the encrypted inner payload.

use crate::constants::{ENVELOPE_CID, ENVELOPE_TYPE};
use crate::crypto::DeviceCipher;
use crate::error::{GreeError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Outer envelope as sent to the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub cid: String,
    pub i: u8,
    pub pack: String,
    pub t: String,
    pub tcid: String,
    pub uid: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Envelope {
    pub fn new(i: u8, encoded: EncodedPack, device_id: &str) -> Self {
        Self {
            cid: ENVELOPE_CID.to_string(),
            i,
            pack: encoded.pack,
            t: ENVELOPE_TYPE.to_string(),
            tcid: device_id.to_string(),
            uid: 0,
            tag: encoded.tag,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Base64 ciphertext and, for GCM, base64 tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPack {
    pub pack: String,
    pub tag: Option<String>,
}

/// Only the fields of a reply envelope that matter for decoding
#[derive(Debug, Deserialize)]
struct ReplyEnvelope {
    pack: Option<String>,
    tag: Option<String>,
}

/// Encrypt an inner JSON payload into an envelope `pack` (and `tag` for GCM)
pub fn encode(cipher: &DeviceCipher, inner_json: &str) -> Result<EncodedPack> {
    let sealed = cipher.seal(inner_json.as_bytes())?;
    Ok(EncodedPack {
        pack: BASE64.encode(&sealed.ciphertext),
        tag: sealed.tag.map(|tag| BASE64.encode(tag)),
    })
}

/// Build the complete outgoing datagram for an inner payload
pub fn seal_request(cipher: &DeviceCipher, i: u8, inner_json: &str, device_id: &str) -> Result<Vec<u8>> {
    let encoded = encode(cipher, inner_json)?;
    Envelope::new(i, encoded, device_id).to_bytes()
}

/// Unwrap a reply datagram and decrypt its `pack` into a JSON object.
///
/// The decrypted text usually carries trailing padding bytes, so it is cut
/// after the last `}` before parsing. Text without any `}` is parsed as-is
/// and fails as invalid JSON.
pub fn decode(cipher: &DeviceCipher, reply: &[u8]) -> Result<Map<String, Value>> {
    let envelope: ReplyEnvelope = serde_json::from_slice(reply)?;
    let pack = envelope.pack.ok_or(GreeError::MissingField("pack"))?;
    let ciphertext = BASE64.decode(pack.as_bytes()).map_err(GreeError::base64("pack"))?;

    let tag = envelope
        .tag
        .map(|tag| BASE64.decode(tag.as_bytes()))
        .transpose()
        .map_err(GreeError::base64("tag"))?;

    let plaintext = cipher.open(&ciphertext, tag.as_deref())?;

    let text = String::from_utf8(plaintext).map_err(|_| GreeError::InvalidUtf8)?;
    let json = truncate_after_last_brace(&text);
    debug!("Decrypted pack: {} bytes of JSON", json.len());

    match serde_json::from_str::<Value>(json)? {
        Value::Object(map) => Ok(map),
        _ => Err(GreeError::InvalidField {
            field: "pack",
            expected: "JSON object",
        }),
    }
}

fn truncate_after_last_brace(text: &str) -> &str {
    match text.rfind('}') {
        Some(index) => &text[..=index],
        None => text,
    }
}
