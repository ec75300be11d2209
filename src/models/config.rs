use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Frame-count granularity at which the capture buffer size is aligned.
///
/// The capture buffer must hold an exact multiple of this many frames so the
/// encode worker always receives whole notification periods, never a torn
/// tail.
pub const NOTIFICATION_PERIOD_FRAMES: usize = 160;

/// PCM format of the capture stream.
///
/// Mono 16-bit at 44100 Hz is the only combination every input device is
/// required to support, and the only one this crate captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmSpec {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count (1 = mono).
    pub channels: u16,
    /// Bits per sample.
    pub bit_depth: u16,
}

impl PcmSpec {
    /// Bytes per frame (one sample per channel).
    pub fn bytes_per_frame(&self) -> usize {
        self.channels as usize * self.bit_depth as usize / 8
    }
}

impl Default for PcmSpec {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 1,
            bit_depth: 16,
        }
    }
}

/// Parameters handed to `EncoderProvider::create` at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderParams {
    pub in_sample_rate: u32,
    pub channels: u16,
    pub out_sample_rate: u32,
    pub bit_rate_kbps: u32,
    pub quality: u32,
}

/// Per-session recorder configuration.
///
/// Bit rate and maximum duration are plain instance fields; concurrent
/// sessions never share configuration. Changes take effect at the next
/// `start()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    pub pcm: PcmSpec,

    /// Output bit rate in kbps (default: 128).
    pub bit_rate_kbps: u32,

    /// Encoder quality setting (default: 7).
    pub quality: u32,

    /// Maximum recording duration (None = unlimited).
    pub max_duration: Option<Duration>,
}

impl RecorderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.pcm.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.pcm.channels != 1 {
            return Err(format!("unsupported channel count: {}", self.pcm.channels));
        }
        if self.pcm.bit_depth != 16 {
            return Err(format!("unsupported bit depth: {}", self.pcm.bit_depth));
        }
        if self.bit_rate_kbps == 0 {
            return Err("bit rate must be positive".into());
        }
        Ok(())
    }

    /// Encoder parameters for this configuration. The output sample rate
    /// matches the capture rate; no resampling happens in this crate.
    pub fn encoder_params(&self) -> EncoderParams {
        EncoderParams {
            in_sample_rate: self.pcm.sample_rate,
            channels: self.pcm.channels,
            out_sample_rate: self.pcm.sample_rate,
            bit_rate_kbps: self.bit_rate_kbps,
            quality: self.quality,
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            pcm: PcmSpec::default(),
            bit_rate_kbps: 128,
            quality: 7,
            max_duration: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RecorderConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_stereo() {
        let mut config = RecorderConfig::default();
        config.pcm.channels = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_bit_rate() {
        let mut config = RecorderConfig::default();
        config.bit_rate_kbps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn encoder_params_mirror_config() {
        let mut config = RecorderConfig::default();
        config.bit_rate_kbps = 96;
        let params = config.encoder_params();
        assert_eq!(params.in_sample_rate, 44_100);
        assert_eq!(params.out_sample_rate, 44_100);
        assert_eq!(params.channels, 1);
        assert_eq!(params.bit_rate_kbps, 96);
        assert_eq!(params.quality, 7);
    }

    #[test]
    fn bytes_per_frame_mono_16bit() {
        assert_eq!(PcmSpec::default().bytes_per_frame(), 2);
    }
}
