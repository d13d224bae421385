//! Rust library for controlling QSC Q-SYS DSP cores
//!
//! This library provides an async API for reading and writing named control
//! values on a Q-SYS core over its TCP control protocol. It supports:
//!
//! - Generic get/set of named controls
//! - Volume control on a 0 to 100 scale, converted to and from dB gain
//! - Mute control, including toggling
//! - Batch reads of volume and mute across several blocks
//! - Core status and inventory details
//!
//! # Quick Start
//!
//! ```no_run
//! use qsc_dsp::DspClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dsp = DspClient::new("10.0.0.5");
//!
//!     // Block "Mic1" has controls "Mic1Gain" and "Mic1Mute"
//!     dsp.set_volume("Mic1", 50).await?;
//!     let muted = dsp.toggle_mute("Mic1").await?;
//!     println!("Mic1 muted: {}", muted);
//!
//!     let volumes = dsp.get_volumes(&["Mic1", "Mic2"]).await?;
//!     println!("{:?}", volumes);
//!     Ok(())
//! }
//! ```
//!
//! # Protocol
//!
//! Every message is a JSON document followed by a single `0x00` byte. On
//! each new connection the core first pushes an unsolicited status frame,
//! which is read and discarded before the request is written. Each
//! operation uses its own connection and closes it before returning.
//!
//! # Architecture
//!
//! - **Client**: Device address, settings and the generic get/set operations
//! - **Controls**: Volume and mute operations built on get/set
//! - **Connection**: Framed request/response exchange over TCP
//! - **Protocol**: JSON message structures and framing
//! - **Types**: Control naming and volume/gain conversion

mod client;
mod config;
mod connection;
mod controls;
mod error;
mod protocol;
mod types;

// Public exports
pub use client::DspClient;
pub use config::{DspConfig, DEFAULT_PORT};
pub use error::{DspError, ErrorKind, Result};
pub use protocol::{
    ControlGetResponse, ControlSetResponse, ControlValue, Request, Response, StatusGetResponse,
    StatusReport, FRAME_DELIMITER,
};
pub use types::{
    db_to_volume, volume_to_db, BlockingLookup, ControlKind, GainValue, HardwareDetails, HostnameResolver,
    MuteState, NoHostnameLookup, VolumeLevel, MAX_VOLUME, MIN_GAIN_DB,
};
pub use tokio_util::sync::CancellationToken;
