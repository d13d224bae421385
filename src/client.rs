use crate::config::DspConfig;
use crate::connection::send_command;
use crate::error::{DspError, Result};
use crate::protocol::{
    parse_response, ControlGetResponse, ControlSetResponse, Request, StatusGetResponse,
    StatusReport,
};
use crate::types::{HardwareDetails, HostnameResolver};
use tokio_util::sync::CancellationToken;

/// Client for a QSC DSP core
///
/// The client holds only the device address and its settings. Every
/// operation opens a fresh connection, performs one exchange, and closes
/// it again, so a client can be cloned and shared freely.
#[derive(Debug, Clone)]
pub struct DspClient {
    address: String,
    config: DspConfig,
    cancel: Option<CancellationToken>,
}

impl DspClient {
    /// Create a client for the DSP at `address` using the default port and timeouts
    ///
    /// # Example
    ///
    /// ```no_run
    /// use qsc_dsp::DspClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let dsp = DspClient::new("10.0.0.5");
    ///     dsp.set_volume("Mic1", 50).await?;
    ///     Ok(())
    /// }
    /// ```
    pub fn new(address: impl Into<String>) -> Self {
        Self::with_config(address, DspConfig::default())
    }

    /// Create a client with explicit settings
    pub fn with_config(address: impl Into<String>, config: DspConfig) -> Self {
        Self {
            address: address.into(),
            config,
            cancel: None,
        }
    }

    /// Abort in-flight requests when `token` is cancelled
    ///
    /// A cancelled request fails with [`DspError::Cancelled`] and its
    /// connection is closed.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Get the device address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Get the client settings
    pub fn config(&self) -> &DspConfig {
        &self.config
    }

    /// Send a request and return the raw reply frame, delimiter stripped
    pub async fn send_command(&self, request: &Request) -> Result<Vec<u8>> {
        send_command(&self.address, &self.config, self.cancel.as_ref(), request).await
    }

    // ========== Generic Controls ==========

    /// Read a named control
    ///
    /// The result list is returned as the device sent it; callers look up
    /// the entry they need with [`ControlGetResponse::find`].
    pub async fn get_control_status(&self, name: &str) -> Result<ControlGetResponse> {
        let request = Request::control_get([name]);
        let reply = self.send_command(&request).await?;
        parse_response(&self.address, &reply)
    }

    /// Write a named control
    ///
    /// Fails with [`DspError::Validation`] if the acknowledgment names a
    /// different control.
    pub async fn set_control_status(&self, name: &str, value: f64) -> Result<ControlSetResponse> {
        tracing::debug!("Setting {} to {} on {}", name, value, self.address);

        let request = Request::control_set(name, value);
        let reply = self.send_command(&request).await?;
        let response: ControlSetResponse = parse_response(&self.address, &reply)?;

        if response.result.name != name {
            tracing::error!(
                "Invalid response, the name received does not match the name sent {}/{}",
                name,
                response.result.name
            );
            return Err(DspError::Validation {
                address: self.address.clone(),
                expected: name.to_string(),
                received: response.result.name,
            });
        }

        Ok(response)
    }

    /// Write a named control from its textual value
    pub async fn set_control_status_str(&self, name: &str, value: &str) -> Result<ControlSetResponse> {
        let parsed: f64 = value.trim().parse().map_err(|_| DspError::InvalidValue {
            name: name.to_string(),
            detail: format!("{:?} is not a float", value),
        })?;
        if !parsed.is_finite() {
            return Err(DspError::InvalidValue {
                name: name.to_string(),
                detail: format!("{:?} is not a finite number", value),
            });
        }
        self.set_control_status(name, parsed).await
    }

    // ========== Status ==========

    /// Get the platform and run state of the core
    pub async fn status(&self) -> Result<StatusReport> {
        let reply = self.send_command(&Request::status_get()).await?;
        let response: StatusGetResponse = parse_response(&self.address, &reply)?;
        Ok(response.result)
    }

    /// Get inventory details for the core
    ///
    /// The hostname comes from `resolver`; when it fails or finds nothing,
    /// the address is used instead.
    pub async fn details<R: HostnameResolver>(&self, resolver: &R) -> Result<HardwareDetails> {
        let hostname = match resolver.lookup(&self.address).await {
            Ok(names) => names
                .first()
                .map(|n| n.trim_matches('.').to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| self.address.clone()),
            Err(e) => {
                tracing::debug!("Hostname lookup for {} failed: {}", self.address, e);
                self.address.clone()
            }
        };

        let status = self.status().await?;
        tracing::info!("Status of {}: {:?}", self.address, status);

        Ok(HardwareDetails {
            hostname,
            model_name: status.platform,
            power_status: status.state,
            ip_address: self.address.clone(),
        })
    }
}
