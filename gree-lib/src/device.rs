use crate::crypto::{DeviceCipher, DeviceKey, ProtocolVersion};
use crate::envelope;
use crate::error::{GreeError, Result};
use crate::message::{BindResponse, CommandAck, CommandValue, Request, StatusResponse};
use crate::transport::{Transport, UdpTransport};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Where a device lives and how it identifies itself on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEndpoint {
    pub host: String,
    pub port: u16,
    /// Normalized MAC-like identifier, sent as `mac`/`tcid`/`cid`
    pub device_id: String,
    pub timeout: Duration,
}

impl DeviceEndpoint {
    pub fn new(host: impl Into<String>, port: u16, device_id: &str, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            device_id: normalize_device_id(device_id),
            timeout,
        }
    }
}

/// Lowercase the identifier and drop `:`, `-`, `.` separators and whitespace
pub fn normalize_device_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ':' | '-' | '.') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Key material held by a bound client.
///
/// V1 keeps the ECB cipher built from the key; V2 builds a fresh GCM
/// cipher for every exchange.
#[derive(Debug, Clone)]
enum Session {
    Ecb { key: DeviceKey, cipher: DeviceCipher },
    Gcm { key: DeviceKey },
}

impl Session {
    fn new(version: ProtocolVersion, key: DeviceKey) -> Self {
        match version {
            ProtocolVersion::V1Ecb => Session::Ecb {
                cipher: DeviceCipher::ecb(&key),
                key,
            },
            ProtocolVersion::V2Gcm => Session::Gcm { key },
        }
    }

    fn key(&self) -> DeviceKey {
        match self {
            Session::Ecb { key, .. } | Session::Gcm { key } => *key,
        }
    }

    fn cipher(&self) -> Cow<'_, DeviceCipher> {
        match self {
            Session::Ecb { cipher, .. } => Cow::Borrowed(cipher),
            Session::Gcm { key } => Cow::Owned(DeviceCipher::gcm(key)),
        }
    }
}

/// Unbound until a handshake succeeds or a key is installed; never goes back.
#[derive(Debug, Clone)]
enum BindingState {
    Unbound,
    Bound(Session),
}

/// Protocol client for one air conditioner.
///
/// All operations on one instance are serialized: the state lock is held
/// for the whole request/reply exchange, so a command can never go out
/// with a key that a concurrent bind is about to replace.
pub struct GreeDevice<T = UdpTransport> {
    endpoint: DeviceEndpoint,
    version: ProtocolVersion,
    transport: T,
    state: Mutex<BindingState>,
}

impl GreeDevice<UdpTransport> {
    /// Create a client talking UDP to `endpoint`
    pub fn new(endpoint: DeviceEndpoint, version: ProtocolVersion) -> Self {
        let transport = UdpTransport::new(endpoint.host.clone(), endpoint.port, endpoint.timeout);
        Self::with_transport(endpoint, version, transport)
    }
}

impl<T: Transport> GreeDevice<T> {
    pub fn with_transport(endpoint: DeviceEndpoint, version: ProtocolVersion, transport: T) -> Self {
        debug!(
            "Creating client for {}:{} ({}, id {})",
            endpoint.host, endpoint.port, version, endpoint.device_id
        );
        Self {
            endpoint,
            version,
            transport,
            state: Mutex::new(BindingState::Unbound),
        }
    }

    /// Start out bound with a key obtained earlier
    pub fn with_key(mut self, key: DeviceKey) -> Self {
        *self.state.get_mut() = BindingState::Bound(Session::new(self.version, key));
        self
    }

    pub fn endpoint(&self) -> &DeviceEndpoint {
        &self.endpoint
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub async fn is_bound(&self) -> bool {
        matches!(*self.state.lock().await, BindingState::Bound(_))
    }

    /// The device key, if bound
    pub async fn key(&self) -> Option<DeviceKey> {
        match &*self.state.lock().await {
            BindingState::Bound(session) => Some(session.key()),
            BindingState::Unbound => None,
        }
    }

    /// Install a key without a handshake (persisted or externally rotated key)
    pub async fn set_key(&self, key: DeviceKey) {
        debug!("Installing device key for {}", self.endpoint.device_id);
        *self.state.lock().await = BindingState::Bound(Session::new(self.version, key));
    }

    /// Run the bind handshake unless already bound.
    ///
    /// Returns whether the client is bound afterwards. Failures are logged
    /// and leave the client unbound; use [`try_bind`](Self::try_bind) to
    /// get the reason.
    pub async fn bind(&self) -> bool {
        match self.try_bind().await {
            Ok(_) => true,
            Err(e) => {
                warn!("Binding to {} failed: {}", self.endpoint.host, e);
                false
            }
        }
    }

    /// Run the bind handshake unless already bound and return the device key
    pub async fn try_bind(&self) -> Result<DeviceKey> {
        let mut state = self.state.lock().await;
        if let BindingState::Bound(session) = &*state {
            debug!("Already bound to {}", self.endpoint.device_id);
            return Ok(session.key());
        }

        info!("Binding to {} ({})...", self.endpoint.host, self.version);
        // The reply is encrypted with the generic key too, not the new one
        let generic = DeviceCipher::for_version(self.version, &self.version.generic_key());
        let request = Request::bind(self.version, &self.endpoint.device_id);
        let reply = self.exchange(&generic, &request).await?;
        let BindResponse { key } = BindResponse::try_from(reply)?;

        *state = BindingState::Bound(Session::new(self.version, key));
        info!("Bound to {}", self.endpoint.host);
        Ok(key)
    }

    /// Read properties; values come back in the order of `property_names`
    pub async fn get_status<S: AsRef<str>>(&self, property_names: &[S]) -> Result<Vec<Value>> {
        let state = self.state.lock().await;
        let session = bound_session(&state)?;

        let request = Request::status(property_names, &self.endpoint.device_id);
        let reply = self.exchange(&session.cipher(), &request).await?;
        StatusResponse::try_from(reply)?.into_aligned(property_names.len())
    }

    /// [`get_status`](Self::get_status) keyed by property name
    pub async fn get_values<S: AsRef<str>>(&self, property_names: &[S]) -> Result<Map<String, Value>> {
        let values = self.get_status(property_names).await?;
        Ok(property_names
            .iter()
            .map(|name| name.as_ref().to_string())
            .zip(values)
            .collect())
    }

    /// Write `values[i]` to `property_names[i]` in one command
    pub async fn send_command<S: AsRef<str>>(
        &self,
        property_names: &[S],
        values: Vec<CommandValue>,
    ) -> Result<CommandAck> {
        let state = self.state.lock().await;
        let session = bound_session(&state)?;

        let request = Request::command(property_names, values)?;
        let raw = self.exchange(&session.cipher(), &request).await?;
        Ok(CommandAck { raw })
    }

    /// One encrypted round trip
    async fn exchange(&self, cipher: &DeviceCipher, request: &Request) -> Result<Map<String, Value>> {
        let json = request.to_json()?;
        debug!("Request to {}: {}", self.endpoint.device_id, request_kind(request));
        let datagram = envelope::seal_request(cipher, request.envelope_i(), &json, &self.endpoint.device_id)?;
        let reply = self.transport.exchange(&datagram).await?;
        envelope::decode(cipher, &reply)
    }
}

fn bound_session(state: &BindingState) -> Result<&Session> {
    match state {
        BindingState::Bound(session) => Ok(session),
        BindingState::Unbound => Err(GreeError::NotBound),
    }
}

fn request_kind(request: &Request) -> &'static str {
    match request {
        Request::Bind(_) => "bind",
        Request::Status(_) => "status",
        Request::Command(_) => "cmd",
    }
}
