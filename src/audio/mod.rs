//! Decoder adapter.
//!
//! Checks only see [`AudioHeader`] and [`AudioSamples`]; which backend
//! produced them is decided here by file extension. Header reads never
//! materialise sample data.

mod probe;
pub mod wav;

pub use probe::ProbeDecoder;
pub use wav::{WavDecoder, WavHeader};

use crate::error::DecodeError;
use crate::utils::{format_size, AudioFileRef};

use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Stream parameters read without decoding any audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioHeader {
    /// Container name, e.g. "wav" or "flac"
    pub container: String,
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bits per sample; `None` for lossy codecs without a fixed depth
    pub bits_per_sample: Option<u16>,
    /// Frames per channel, 0 when the container does not say
    pub frames: u64,
}

impl AudioHeader {
    /// Bytes per sample, rounded up (24-bit is 3 bytes)
    pub fn sample_width(&self) -> Option<u16> {
        self.bits_per_sample.map(|bits| bits.div_ceil(8))
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }

    pub fn format_info(&self) -> String {
        let depth = self
            .bits_per_sample
            .map(|bits| format!("{} bits", bits))
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            "Container: {}\n\
             Channels: {}\n\
             Sample Rate: {} Hz\n\
             Bits per Sample: {}\n\
             Frames: {}\n\
             Duration: {:.3} s",
            self.container.to_uppercase(),
            self.channels,
            self.sample_rate,
            depth,
            self.frames,
            self.duration(),
        )
    }
}

/// Fully decoded audio, interleaved and normalised to [-1.0, 1.0].
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSamples {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl AudioSamples {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }
}

/// A backend able to read one or more container formats.
pub trait AudioDecoder {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Whether this decoder claims files with the given lowercase extension
    fn handles(&self, ext: &str) -> bool;

    /// Reads stream parameters only
    fn read_header(&self, path: &Path) -> Result<AudioHeader, DecodeError>;

    /// Decodes the whole stream
    fn read_samples(&self, path: &Path) -> Result<AudioSamples, DecodeError>;
}

/// Ordered set of decoders; the first one claiming an extension wins.
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn AudioDecoder>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// WAV through the native RIFF reader, everything else through symphonia
    pub fn default_decoders() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(WavDecoder));
        registry.register(Box::new(ProbeDecoder));
        registry
    }

    pub fn register(&mut self, decoder: Box<dyn AudioDecoder>) {
        self.decoders.push(decoder);
    }

    fn decoder_for(&self, file: &AudioFileRef) -> Option<&dyn AudioDecoder> {
        let ext = file.extension()?;
        self.decoders
            .iter()
            .find(|decoder| decoder.handles(&ext))
            .map(|decoder| decoder.as_ref())
    }

    /// True when some decoder recognises the file's extension
    pub fn supports(&self, file: &AudioFileRef) -> bool {
        self.decoder_for(file).is_some()
    }

    fn select(&self, file: &AudioFileRef) -> Result<&dyn AudioDecoder, DecodeError> {
        let decoder = self
            .decoder_for(file)
            .ok_or_else(|| DecodeError::Invalid(format!("no decoder for {}", file.name)))?;
        if let Some(reason) = &file.stat_error {
            return Err(DecodeError::Unreadable(reason.clone()));
        }
        // Zero-length files never reach a backend
        if file.size == 0 {
            return Err(DecodeError::Unreadable("empty file".to_string()));
        }
        Ok(decoder)
    }

    pub fn read_header(&self, file: &AudioFileRef) -> Result<AudioHeader, DecodeError> {
        let decoder = self.select(file)?;
        debug!(
            "Reading header of {} with {}",
            file.relative.display(),
            decoder.name()
        );
        decoder.read_header(&file.path)
    }

    pub fn read_samples(&self, file: &AudioFileRef) -> Result<AudioSamples, DecodeError> {
        let decoder = self.select(file)?;
        debug!(
            "Decoding {} ({}) with {}",
            file.relative.display(),
            format_size(file.size),
            decoder.name()
        );
        decoder.read_samples(&file.path)
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::default_decoders()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_ref(name: &str, size: u64) -> AudioFileRef {
        AudioFileRef::new(Path::new("/music").join(name), Path::new("/music"), size)
    }

    #[test]
    fn test_sample_width_rounds_up() {
        let mut header = AudioHeader {
            container: "wav".to_string(),
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: Some(24),
            frames: 96000,
        };
        assert_eq!(header.sample_width(), Some(3));
        assert!((header.duration() - 2.0).abs() < 1e-9);

        header.bits_per_sample = Some(12);
        assert_eq!(header.sample_width(), Some(2));

        header.bits_per_sample = None;
        assert_eq!(header.sample_width(), None);
    }

    #[test]
    fn test_samples_frames_and_duration() {
        let samples = AudioSamples {
            channels: 2,
            sample_rate: 4,
            samples: vec![0.0; 16],
        };
        assert_eq!(samples.frames(), 8);
        assert!((samples.duration() - 2.0).abs() < 1e-9);
        assert!(!samples.is_empty());
    }

    #[test]
    fn test_default_registry_supports_by_extension() {
        let registry = DecoderRegistry::default();
        assert!(registry.supports(&file_ref("a.wav", 10)));
        assert!(registry.supports(&file_ref("a.FLAC", 10)));
        assert!(!registry.supports(&file_ref("notes.txt", 10)));
        assert!(!registry.supports(&file_ref("README", 10)));
    }

    #[test]
    fn test_empty_registry_supports_nothing() {
        let registry = DecoderRegistry::new();
        assert!(!registry.supports(&file_ref("a.wav", 10)));
    }

    #[test]
    fn test_stat_failure_is_unreadable() {
        let registry = DecoderRegistry::default();
        let file = file_ref("locked.wav", 0).with_stat_error("permission denied");
        assert_eq!(
            registry.read_header(&file),
            Err(DecodeError::Unreadable("permission denied".to_string()))
        );
        assert_eq!(
            registry.read_samples(&file),
            Err(DecodeError::Unreadable("permission denied".to_string()))
        );
    }

    #[test]
    fn test_zero_length_file_is_unreadable_without_io() {
        // The path does not exist; the size guard must answer first
        let registry = DecoderRegistry::default();
        let empty = file_ref("missing.wav", 0);
        assert_eq!(
            registry.read_samples(&empty),
            Err(DecodeError::Unreadable("empty file".to_string()))
        );
        assert_eq!(
            registry.read_header(&empty),
            Err(DecodeError::Unreadable("empty file".to_string()))
        );
    }
}
