use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io;

/// Gain value in decibels
pub type GainValue = f64;

/// Caller-facing volume level, 0 to 100
pub type VolumeLevel = u8;

/// Mute state
pub type MuteState = bool;

/// Highest volume level a caller can request
pub const MAX_VOLUME: VolumeLevel = 100;

/// Gain sent for volume 0, where the logarithm is undefined
pub const MIN_GAIN_DB: GainValue = -100.0;

/// Kind of control a named block exposes
///
/// The device names a block's controls by appending a fixed suffix to the
/// block name, e.g. block `Mic1` has controls `Mic1Gain` and `Mic1Mute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Gain in dB, suffix `Gain`
    Gain,
    /// Mute flag, suffix `Mute`
    Mute,
}

impl ControlKind {
    /// Suffix appended to a block name to address this control
    pub fn suffix(self) -> &'static str {
        match self {
            ControlKind::Gain => "Gain",
            ControlKind::Mute => "Mute",
        }
    }

    /// Build the device control name for `block`
    pub fn control_name(self, block: &str) -> String {
        format!("{}{}", block, self.suffix())
    }
}

/// Convert a volume level to a gain in dB
///
/// Volume 0 maps to [`MIN_GAIN_DB`] rather than negative infinity. This is a
/// one-way clamp: [`db_to_volume`] of `-100` gives back 0 only because the
/// value rounds down, not because the two are inverses there.
pub fn volume_to_db(level: VolumeLevel) -> GainValue {
    if level == 0 {
        return MIN_GAIN_DB;
    }
    20.0 * (f64::from(level) / 100.0).log10()
}

/// Convert a gain in dB to a volume level
///
/// Gains above 0 dB saturate at [`MAX_VOLUME`].
pub fn db_to_volume(gain: GainValue) -> VolumeLevel {
    let level = (100.0 * 10f64.powf(gain / 20.0)).round();
    if level.is_nan() || level <= 0.0 {
        0
    } else if level >= f64::from(MAX_VOLUME) {
        MAX_VOLUME
    } else {
        level as VolumeLevel
    }
}

/// Interpret a raw control value as a mute flag
///
/// Only exactly `1.0` and `0.0` are valid.
pub fn mute_from_value(value: f64) -> Option<MuteState> {
    if value == 1.0 {
        Some(true)
    } else if value == 0.0 {
        Some(false)
    } else {
        None
    }
}

/// Raw control value for a mute flag
pub fn mute_to_value(muted: MuteState) -> f64 {
    if muted {
        1.0
    } else {
        0.0
    }
}

/// Inventory details about a DSP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareDetails {
    /// Name the resolver found for the core, or its address
    pub hostname: String,

    /// Platform reported by the core (e.g. "Core 110f")
    pub model_name: String,

    /// Run state reported by the core (e.g. "Active", "Standby")
    pub power_status: String,

    /// Address the client connects to
    pub ip_address: String,
}

/// Reverse lookup used to fill in [`HardwareDetails::hostname`]
///
/// Hostnames are display metadata only; a failed lookup falls back to the
/// device address. Lookups run on the async runtime, so a resolver built on
/// a blocking call should be wrapped in [`BlockingLookup`].
pub trait HostnameResolver {
    /// Return the names registered for `address`
    fn lookup(&self, address: &str) -> impl Future<Output = io::Result<Vec<String>>> + Send;
}

/// Resolver that never resolves, so the hostname is always the address
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHostnameLookup;

impl HostnameResolver for NoHostnameLookup {
    fn lookup(&self, _address: &str) -> impl Future<Output = io::Result<Vec<String>>> + Send {
        std::future::ready(Ok(Vec::new()))
    }
}

/// Runs a blocking lookup function on tokio's blocking thread pool
#[derive(Debug, Clone)]
pub struct BlockingLookup<F>(pub F);

impl<F> HostnameResolver for BlockingLookup<F>
where
    F: Fn(&str) -> io::Result<Vec<String>> + Clone + Send + Sync + 'static,
{
    fn lookup(&self, address: &str) -> impl Future<Output = io::Result<Vec<String>>> + Send {
        let lookup = self.0.clone();
        let address = address.to_string();
        async move {
            tokio::task::spawn_blocking(move || lookup(&address))
                .await
                .map_err(io::Error::other)?
        }
    }
}
