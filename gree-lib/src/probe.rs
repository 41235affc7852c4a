//! Capability discovery.
//!
//! The protocol has no capability negotiation: a property exists if the
//! device answers a single-property status query for it. Every failure is
//! read as "not supported". That soft-fail policy lives only here;
//! [`GreeDevice::get_status`] and [`GreeDevice::send_command`] always
//! surface their errors.

use crate::device::GreeDevice;
use crate::transport::Transport;
use tracing::debug;

impl<T: Transport> GreeDevice<T> {
    /// Whether the device answers a status query for `property_name`
    pub async fn probe(&self, property_name: &str) -> bool {
        match self.get_status(&[property_name]).await {
            Ok(_) => {
                debug!("Feature {} present", property_name);
                true
            }
            Err(e) => {
                debug!("Feature {} treated as absent: {}", property_name, e);
                false
            }
        }
    }

    /// Probe each name in turn and return the ones the device supports
    pub async fn probe_all<S: AsRef<str>>(&self, property_names: &[S]) -> Vec<String> {
        let mut present = Vec::new();
        for name in property_names {
            if self.probe(name.as_ref()).await {
                present.push(name.as_ref().to_string());
            }
        }
        present
    }
}
