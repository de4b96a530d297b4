//! The top-level entry point: a shared registry plus a sampling policy that
//! picks full or header-only decoding per packet.

use std::sync::Arc;

use crate::config::DecoderConfig;
use crate::error::{ConfigError, DecodeError, DecoderInitError};
use crate::packet::{DecodeMode, Packet, decode_log_packet};
use crate::registry::PacketRegistry;

/// Deterministic rate limiter. Each packet adds `rate` credit; a packet is
/// fully decoded whenever a whole credit is available.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampler {
    rate: f64,
    credit: f64,
}

impl Sampler {
    pub fn new(rate: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidSampleRate(rate));
        }
        Ok(Sampler { rate, credit: 0.0 })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn next_mode(&mut self) -> DecodeMode {
        self.credit += self.rate;
        if self.credit >= 1.0 {
            self.credit -= 1.0;
            DecodeMode::Full
        } else {
            DecodeMode::HeaderOnly
        }
    }
}

/// Clones share the registry but sample independently, so one `Decoder`
/// per worker thread is the intended use.
#[derive(Debug, Clone)]
pub struct Decoder {
    registry: Arc<PacketRegistry>,
    config: DecoderConfig,
    sampler: Sampler,
}

impl Decoder {
    pub fn new(registry: Arc<PacketRegistry>, config: DecoderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Decoder {
            registry,
            sampler: Sampler::new(config.sample_rate)?,
            config,
        })
    }

    /// A decoder over every standard packet family.
    pub fn with_config(config: DecoderConfig) -> Result<Self, DecoderInitError> {
        let registry = Arc::new(PacketRegistry::with_standard_families()?);
        Ok(Decoder::new(registry, config)?)
    }

    pub fn registry(&self) -> &Arc<PacketRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes `buf`, fully or header-only as the sampler decides.
    pub fn decode(&mut self, buf: &[u8]) -> Result<Packet, DecodeError> {
        let mode = self.sampler.next_mode();
        self.decode_with_mode(buf, mode)
    }

    /// Decodes `buf` in `mode`, bypassing (and not advancing) the sampler.
    pub fn decode_with_mode(&self, buf: &[u8], mode: DecodeMode) -> Result<Packet, DecodeError> {
        decode_log_packet(&self.registry, buf, self.config.framing, mode)
    }
}
