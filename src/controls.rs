use crate::client::DspClient;
use crate::error::{DspError, Result};
use crate::types::{
    db_to_volume, mute_from_value, mute_to_value, volume_to_db, ControlKind, MuteState,
    VolumeLevel, MAX_VOLUME,
};
use std::collections::BTreeMap;

impl DspClient {
    // ========== Volume Control ==========

    /// Get the volume of a block, 0 to 100
    pub async fn get_volume(&self, block: &str) -> Result<VolumeLevel> {
        let gain = self.get_value(block, ControlKind::Gain).await?;
        Ok(db_to_volume(gain))
    }

    /// Set the volume of a block, 0 to 100
    ///
    /// Returns the volume the device acknowledged.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use qsc_dsp::DspClient;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let dsp = DspClient::new("10.0.0.5");
    /// // Sends Mic1Gain = -6.02
    /// let level = dsp.set_volume("Mic1", 50).await?;
    /// assert_eq!(level, 50);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn set_volume(&self, block: &str, level: VolumeLevel) -> Result<VolumeLevel> {
        let name = ControlKind::Gain.control_name(block);
        if level > MAX_VOLUME {
            return Err(DspError::InvalidValue {
                name,
                detail: format!("volume {} is above {}", level, MAX_VOLUME),
            });
        }

        let gain = volume_to_db(level);
        tracing::debug!("Volume {} on {} is {} dB", level, name, gain);

        let response = self.set_control_status(&name, gain).await?;
        Ok(db_to_volume(response.result.value))
    }

    /// Get the volumes of several blocks, keyed by block name
    ///
    /// Blocks are read one at a time in the order given. The first failure
    /// aborts the batch and is returned on its own.
    pub async fn get_volumes<S: AsRef<str>>(&self, blocks: &[S]) -> Result<BTreeMap<String, VolumeLevel>> {
        let mut volumes = BTreeMap::new();
        for block in blocks {
            let block = block.as_ref();
            volumes.insert(block.to_string(), self.get_volume(block).await?);
        }
        Ok(volumes)
    }

    // ========== Mute Control ==========

    /// Get the mute state of a block
    pub async fn get_mute(&self, block: &str) -> Result<MuteState> {
        let name = ControlKind::Mute.control_name(block);
        let value = self.get_value(block, ControlKind::Mute).await?;
        self.mute_state(&name, value)
    }

    /// Set the mute state of a block
    ///
    /// Returns the state the device acknowledged.
    pub async fn set_mute(&self, block: &str, muted: MuteState) -> Result<MuteState> {
        let name = ControlKind::Mute.control_name(block);
        let response = self.set_control_status(&name, mute_to_value(muted)).await?;
        self.mute_state(&name, response.result.value)
    }

    /// Mute a block
    pub async fn mute(&self, block: &str) -> Result<MuteState> {
        self.set_mute(block, true).await
    }

    /// Unmute a block
    pub async fn unmute(&self, block: &str) -> Result<MuteState> {
        self.set_mute(block, false).await
    }

    /// Flip the mute state of a block, returning the new state
    pub async fn toggle_mute(&self, block: &str) -> Result<MuteState> {
        let muted = self.get_mute(block).await?;
        self.set_mute(block, !muted).await
    }

    /// Get the mute states of several blocks, keyed by block name
    ///
    /// Same ordering and failure rules as [`DspClient::get_volumes`].
    pub async fn get_mutes<S: AsRef<str>>(&self, blocks: &[S]) -> Result<BTreeMap<String, MuteState>> {
        let mut mutes = BTreeMap::new();
        for block in blocks {
            let block = block.as_ref();
            mutes.insert(block.to_string(), self.get_mute(block).await?);
        }
        Ok(mutes)
    }

    // ========== Helpers ==========

    /// Read one control of a block and return its raw value
    async fn get_value(&self, block: &str, kind: ControlKind) -> Result<f64> {
        let name = kind.control_name(block);
        let response = self.get_control_status(&name).await?;

        match response.find(&name) {
            Some(entry) => Ok(entry.value),
            None => {
                tracing::error!("No value returned from {} with the name {}", self.address(), name);
                Err(DspError::NotFound {
                    address: self.address().to_string(),
                    name,
                })
            }
        }
    }

    fn mute_state(&self, name: &str, value: f64) -> Result<MuteState> {
        mute_from_value(value).ok_or_else(|| {
            tracing::error!("Invalid mute value {} for {} from {}", value, name, self.address());
            DspError::Protocol {
                address: self.address().to_string(),
                detail: format!("invalid mute value {} for {}", value, name),
                frame: format!("{}={}", name, value),
            }
        })
    }
}
