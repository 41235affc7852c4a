use crate::crypto::{DeviceKey, ProtocolVersion};
use crate::constants::{ENVELOPE_I_BIND, ENVELOPE_I_NORMAL};
use crate::error::{GreeError, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Inner payload of a request, before encryption
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Key handshake, encrypted with the generic key
    Bind(BindRequest),
    /// Read a list of properties
    Status(StatusRequest),
    /// Write values to a list of properties
    Command(CommandRequest),
}

/// `{"mac":…,"t":"bind","uid":0}` for V1, `{"cid":…,"mac":…,"t":"bind","uid":0}` for V2
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    pub mac: String,
    pub t: &'static str,
    pub uid: u32,
}

/// `{"cols":[…],"mac":…,"t":"status"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRequest {
    pub cols: Vec<String>,
    pub mac: String,
    pub t: &'static str,
}

/// `{"opt":[…],"p":[…],"t":"cmd"}`, with `opt[i]` paired to `p[i]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRequest {
    pub opt: Vec<String>,
    pub p: Vec<CommandValue>,
    pub t: &'static str,
}

impl Request {
    pub fn bind(version: ProtocolVersion, device_id: &str) -> Self {
        // V2 firmware wants the identifier in both fields
        let cid = match version {
            ProtocolVersion::V1Ecb => None,
            ProtocolVersion::V2Gcm => Some(device_id.to_string()),
        };
        Request::Bind(BindRequest {
            cid,
            mac: device_id.to_string(),
            t: "bind",
            uid: 0,
        })
    }

    pub fn status<S: AsRef<str>>(property_names: &[S], device_id: &str) -> Self {
        Request::Status(StatusRequest {
            cols: property_names.iter().map(|name| name.as_ref().to_string()).collect(),
            mac: device_id.to_string(),
            t: "status",
        })
    }

    /// Pair property names with values. Order is preserved exactly;
    /// a length mismatch is rejected rather than truncated.
    pub fn command<S: AsRef<str>>(property_names: &[S], values: Vec<CommandValue>) -> Result<Self> {
        if property_names.len() != values.len() {
            return Err(GreeError::CommandLengthMismatch {
                names: property_names.len(),
                values: values.len(),
            });
        }
        // serde_json writes NaN and infinities as null
        if let Some(CommandValue::Float(bad)) = values
            .iter()
            .find(|value| matches!(value, CommandValue::Float(f) if !f.is_finite()))
        {
            return Err(GreeError::UnsupportedValue(bad.to_string()));
        }
        Ok(Request::Command(CommandRequest {
            opt: property_names.iter().map(|name| name.as_ref().to_string()).collect(),
            p: values,
            t: "cmd",
        }))
    }

    /// Value of the envelope `i` field for this request
    pub fn envelope_i(&self) -> u8 {
        match self {
            Request::Bind(_) => ENVELOPE_I_BIND,
            Request::Status(_) | Request::Command(_) => ENVELOPE_I_NORMAL,
        }
    }

    /// Compact JSON text, fields in wire order
    pub fn to_json(&self) -> Result<String> {
        let json = match self {
            Request::Bind(request) => serde_json::to_string(request)?,
            Request::Status(request) => serde_json::to_string(request)?,
            Request::Command(request) => serde_json::to_string(request)?,
        };
        Ok(json)
    }
}

/// A scalar the device accepts in a command's `p` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Enumerated device settings that map onto a numeric protocol code
pub trait ModeCode {
    fn code(&self) -> i64;
}

impl CommandValue {
    pub fn from_mode<M: ModeCode + ?Sized>(mode: &M) -> Self {
        CommandValue::Int(mode.code())
    }
}

impl From<bool> for CommandValue {
    fn from(value: bool) -> Self {
        CommandValue::Int(i64::from(value))
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for CommandValue {
                fn from(value: $ty) -> Self {
                    CommandValue::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(u8, u16, u32, i8, i16, i32, i64);

impl From<f64> for CommandValue {
    fn from(value: f64) -> Self {
        CommandValue::Float(value)
    }
}

impl From<&str> for CommandValue {
    fn from(value: &str) -> Self {
        CommandValue::Text(value.to_string())
    }
}

impl From<String> for CommandValue {
    fn from(value: String) -> Self {
        CommandValue::Text(value)
    }
}

impl TryFrom<Value> for CommandValue {
    type Error = GreeError;

    /// Booleans become 0/1; `null`, arrays and objects are rejected.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(flag) => Ok(flag.into()),
            Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    Ok(CommandValue::Int(int))
                } else if let Some(float) = number.as_f64() {
                    Ok(CommandValue::Float(float))
                } else {
                    Err(GreeError::UnsupportedValue(number.to_string()))
                }
            }
            Value::String(text) => Ok(CommandValue::Text(text)),
            other => Err(GreeError::UnsupportedValue(other.to_string())),
        }
    }
}

/// Reply to a bind request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindResponse {
    pub key: DeviceKey,
}

impl TryFrom<Map<String, Value>> for BindResponse {
    type Error = GreeError;

    fn try_from(pack: Map<String, Value>) -> Result<Self> {
        let key = pack.get("key").ok_or(GreeError::MissingField("key"))?;
        let key = key.as_str().ok_or(GreeError::InvalidField {
            field: "key",
            expected: "string",
        })?;
        let key = DeviceKey::try_from(key).map_err(|_| GreeError::InvalidField {
            field: "key",
            expected: "16-byte key",
        })?;
        Ok(Self { key })
    }
}

/// Reply to a status request, values in request order
#[derive(Debug, Clone, PartialEq)]
pub struct StatusResponse {
    pub values: Vec<Value>,
}

impl TryFrom<Map<String, Value>> for StatusResponse {
    type Error = GreeError;

    fn try_from(mut pack: Map<String, Value>) -> Result<Self> {
        match pack.remove("dat") {
            Some(Value::Array(values)) => Ok(Self { values }),
            Some(_) => Err(GreeError::InvalidField {
                field: "dat",
                expected: "array",
            }),
            None => Err(GreeError::MissingField("dat")),
        }
    }
}

impl StatusResponse {
    /// Return the values if there is exactly one per requested property
    pub fn into_aligned(self, expected: usize) -> Result<Vec<Value>> {
        if self.values.len() != expected {
            return Err(GreeError::StatusLengthMismatch {
                expected,
                actual: self.values.len(),
            });
        }
        Ok(self.values)
    }
}

/// Acknowledgement of a command, handed back undigested
#[derive(Debug, Clone, PartialEq)]
pub struct CommandAck {
    pub raw: Map<String, Value>,
}

impl CommandAck {
    /// The `r` result code, when the firmware sends one (200 on success)
    pub fn result_code(&self) -> Option<i64> {
        self.raw.get("r").and_then(Value::as_i64)
    }
}
