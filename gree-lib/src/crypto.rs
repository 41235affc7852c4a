//! Block padding and the two cipher flavours spoken by the device.
//!
//! # Protocol versions
//!
//! - V1: AES-128-ECB, plaintext PKCS#7-padded to the block size.
//! - V2: AES-128-GCM with a fixed nonce ([`GCM_NONCE`]) and fixed AAD
//!   ([`GCM_AAD`]). The tag travels next to the ciphertext in the envelope.
//!
//! Both versions bind with a generic key known in advance
//! ([`GENERIC_KEY_V1`], [`GENERIC_KEY_V2`]) and then switch to the
//! per-device key returned by the handshake.

use crate::constants::{BLOCK_SIZE, GCM_AAD, GCM_NONCE, GCM_TAG_SIZE, GENERIC_KEY_V1, GENERIC_KEY_V2, KEY_SIZE};
use crate::error::{GreeError, Result};
use aes::Aes128;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes_gcm::aead::AeadInPlace;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::{Aes128Gcm, Nonce};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Encryption scheme negotiated with the device, fixed for the lifetime of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ProtocolVersion {
    #[strum(to_string = "V1 (ECB)")]
    V1Ecb = 1,
    #[strum(to_string = "V2 (GCM)")]
    V2Gcm = 2,
}

impl ProtocolVersion {
    /// Parse a numeric version as found in configuration
    pub fn from_number(version: u8) -> Result<Self> {
        Self::try_from(version).map_err(|e| GreeError::UnsupportedVersion(e.number))
    }

    /// Key used to encrypt the bind request and decrypt its reply
    pub fn generic_key(&self) -> DeviceKey {
        match self {
            ProtocolVersion::V1Ecb => DeviceKey(*GENERIC_KEY_V1),
            ProtocolVersion::V2Gcm => DeviceKey(*GENERIC_KEY_V2),
        }
    }
}

/// 16-byte AES key, either generic or device-specific.
///
/// `Debug` never prints the key material.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DeviceKey([u8; KEY_SIZE]);

impl DeviceKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Keys handed out by the device are printable ASCII
    pub fn to_ascii_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).to_string()
    }
}

impl TryFrom<&[u8]> for DeviceKey {
    type Error = GreeError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| GreeError::InvalidKeyLength(bytes.len()))?;
        Ok(Self(key))
    }
}

impl TryFrom<&str> for DeviceKey {
    type Error = GreeError;

    fn try_from(key: &str) -> Result<Self> {
        Self::try_from(key.as_bytes())
    }
}

impl std::fmt::Debug for DeviceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DeviceKey(..)")
    }
}

/// PKCS#7-pad `plaintext` to the next multiple of 16 bytes.
///
/// A full block of padding is appended when the input is already aligned,
/// so the output is always strictly longer than the input.
pub fn pad(plaintext: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - plaintext.len() % BLOCK_SIZE;
    let mut padded = Vec::with_capacity(plaintext.len() + pad_len);
    padded.extend_from_slice(plaintext);
    padded.resize(plaintext.len() + pad_len, pad_len as u8);
    padded
}

/// Ciphertext produced by [`DeviceCipher::seal`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    /// GCM tag, V2 only
    pub tag: Option<[u8; GCM_TAG_SIZE]>,
}

/// A keyed cipher for one protocol version.
#[derive(Clone)]
pub enum DeviceCipher {
    Ecb(Aes128),
    Gcm(Aes128Gcm),
}

impl DeviceCipher {
    /// AES-128-ECB keyed with `key`
    pub fn ecb(key: &DeviceKey) -> Self {
        DeviceCipher::Ecb(Aes128::new(key.as_bytes().into()))
    }

    /// AES-128-GCM keyed with `key`; nonce and AAD are the protocol constants
    pub fn gcm(key: &DeviceKey) -> Self {
        DeviceCipher::Gcm(Aes128Gcm::new(key.as_bytes().into()))
    }

    pub fn for_version(version: ProtocolVersion, key: &DeviceKey) -> Self {
        match version {
            ProtocolVersion::V1Ecb => Self::ecb(key),
            ProtocolVersion::V2Gcm => Self::gcm(key),
        }
    }

    /// Encrypt a plaintext payload.
    ///
    /// ECB pads first; GCM encrypts as-is and returns the detached tag.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Sealed> {
        match self {
            DeviceCipher::Ecb(cipher) => {
                let mut buffer = pad(plaintext);
                for block in buffer.chunks_exact_mut(BLOCK_SIZE) {
                    cipher.encrypt_block(block.into());
                }
                Ok(Sealed {
                    ciphertext: buffer,
                    tag: None,
                })
            }
            DeviceCipher::Gcm(cipher) => {
                let mut buffer = plaintext.to_vec();
                let tag = cipher
                    .encrypt_in_place_detached(Nonce::from_slice(GCM_NONCE), GCM_AAD, &mut buffer)
                    // Only fails for messages beyond the GCM length limit
                    .map_err(|_| GreeError::Authentication)?;
                let mut tag_bytes = [0u8; GCM_TAG_SIZE];
                tag_bytes.copy_from_slice(&tag);
                Ok(Sealed {
                    ciphertext: buffer,
                    tag: Some(tag_bytes),
                })
            }
        }
    }

    /// Decrypt a ciphertext.
    ///
    /// ECB requires block-aligned input and ignores `tag`. GCM requires a
    /// 16-byte tag and fails with [`GreeError::Authentication`] if it does
    /// not verify; no plaintext is returned in that case.
    /// Padding is left in place for the envelope codec to deal with.
    pub fn open(&self, ciphertext: &[u8], tag: Option<&[u8]>) -> Result<Vec<u8>> {
        match self {
            DeviceCipher::Ecb(cipher) => {
                if ciphertext.len() % BLOCK_SIZE != 0 {
                    return Err(GreeError::UnalignedCiphertext(ciphertext.len()));
                }
                let mut buffer = ciphertext.to_vec();
                for block in buffer.chunks_exact_mut(BLOCK_SIZE) {
                    cipher.decrypt_block(block.into());
                }
                Ok(buffer)
            }
            DeviceCipher::Gcm(cipher) => {
                let tag = tag.ok_or(GreeError::MissingField("tag"))?;
                if tag.len() != GCM_TAG_SIZE {
                    return Err(GreeError::InvalidTagLength(tag.len()));
                }
                let mut buffer = ciphertext.to_vec();
                cipher
                    .decrypt_in_place_detached(
                        Nonce::from_slice(GCM_NONCE),
                        GCM_AAD,
                        &mut buffer,
                        GenericArray::from_slice(tag),
                    )
                    .map_err(|_| GreeError::Authentication)?;
                Ok(buffer)
            }
        }
    }
}

impl std::fmt::Debug for DeviceCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceCipher::Ecb(_) => f.write_str("DeviceCipher::Ecb"),
            DeviceCipher::Gcm(_) => f.write_str("DeviceCipher::Gcm"),
        }
    }
}
