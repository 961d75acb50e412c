use super::{AudioDecoder, AudioHeader, AudioSamples};
use crate::error::DecodeError;
use crate::utils::is_audio_file;

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// Backend for every container symphonia can probe (FLAC, MP3, AAC, OGG, ...).
pub struct ProbeDecoder;

fn open_format(path: &Path) -> Result<Box<dyn FormatReader>, DecodeError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    Ok(probed.format)
}

fn audio_track(format: &dyn FormatReader) -> Result<&Track, DecodeError> {
    format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DecodeError::Invalid("no audio track found".to_string()))
}

fn container_name(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

impl AudioDecoder for ProbeDecoder {
    fn name(&self) -> &'static str {
        "symphonia"
    }

    fn handles(&self, ext: &str) -> bool {
        is_audio_file(ext)
    }

    fn read_header(&self, path: &Path) -> Result<AudioHeader, DecodeError> {
        let format = open_format(path)?;
        let params = &audio_track(format.as_ref())?.codec_params;

        let sample_rate = params
            .sample_rate
            .ok_or_else(|| DecodeError::Invalid("unknown sample rate".to_string()))?;
        let channels = params
            .channels
            .ok_or_else(|| DecodeError::Invalid("unknown channel count".to_string()))?
            .count() as u16;

        Ok(AudioHeader {
            container: container_name(path),
            channels,
            sample_rate,
            bits_per_sample: params.bits_per_sample.map(|bits| bits as u16),
            frames: params.n_frames.unwrap_or(0),
        })
    }

    fn read_samples(&self, path: &Path) -> Result<AudioSamples, DecodeError> {
        let mut format = open_format(path)?;
        let track = audio_track(format.as_ref())?;
        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(0);

        let mut decoder =
            symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        let mut samples = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(reason)) => {
                    // 破損したパケットは読み飛ばす
                    debug!("Skipping corrupt packet in {}: {}", path.display(), reason);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            sample_rate = spec.rate;
            channels = spec.channels.count() as u16;

            let buf = sample_buf
                .get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, spec));
            if buf.capacity() < decoded.capacity() * spec.channels.count() {
                *buf = SampleBuffer::new(decoded.capacity() as u64, spec);
            }
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }

        Ok(AudioSamples {
            channels,
            sample_rate,
            samples,
        })
    }
}
