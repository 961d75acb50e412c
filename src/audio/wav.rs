use super::{AudioDecoder, AudioHeader, AudioSamples};
use crate::error::DecodeError;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use hound::WavReader;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Fields of the `fmt ` and `data` chunks of a RIFF/WAVE file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavHeader {
    pub riff_size: u32,
    pub audio_format: u16, // 1 = PCM, 3 = IEEE float, 0xFFFE = extensible
    /// Codec from the SubFormat GUID of an extensible header
    pub sub_format: Option<u16>,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

struct FmtChunk {
    audio_format: u16,
    num_channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
    sub_format: Option<u16>,
}

pub const WAVE_FORMAT_PCM: u16 = 0x0001;
pub const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

// 通常のfmtチャンクは16〜40バイト
const MAX_FMT_CHUNK: u32 = 1024;

impl FmtChunk {
    fn parse(mut body: &[u8]) -> Result<Self, DecodeError> {
        let mut fmt = FmtChunk {
            audio_format: body.read_u16::<LittleEndian>()?,
            num_channels: body.read_u16::<LittleEndian>()?,
            sample_rate: body.read_u32::<LittleEndian>()?,
            byte_rate: body.read_u32::<LittleEndian>()?,
            block_align: body.read_u16::<LittleEndian>()?,
            bits_per_sample: body.read_u16::<LittleEndian>()?,
            sub_format: None,
        };

        if fmt.audio_format == WAVE_FORMAT_EXTENSIBLE {
            // cbSize, wValidBitsPerSample, dwChannelMask, then the SubFormat GUID
            if body.len() < 24 {
                return Err(invalid("extensible fmt chunk too short"));
            }
            fmt.sub_format = Some(LittleEndian::read_u16(&body[8..10]));
        }
        Ok(fmt)
    }
}

fn invalid(reason: impl Into<String>) -> DecodeError {
    DecodeError::Invalid(reason.into())
}

// Chunks are word aligned: odd sizes carry one pad byte
fn skip_chunk<R: Seek>(reader: &mut R, size: u32) -> Result<(), DecodeError> {
    let padded = size as i64 + (size as i64 & 1);
    reader.seek(SeekFrom::Current(padded))?;
    Ok(())
}

impl WavHeader {
    /// Walks the RIFF chunk list up to the start of the `data` chunk.
    ///
    /// Unknown chunks (`LIST`, `fact`, ...) are skipped. Sample data is never
    /// read.
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, DecodeError> {
        let mut tag = [0u8; 4];
        reader.read_exact(&mut tag)?;
        if &tag != b"RIFF" {
            return Err(invalid("no RIFF tag found"));
        }
        let riff_size = reader.read_u32::<LittleEndian>()?;
        reader.read_exact(&mut tag)?;
        if &tag != b"WAVE" {
            return Err(invalid("no WAVE tag found"));
        }

        let mut fmt: Option<FmtChunk> = None;
        loop {
            let mut chunk_id = [0u8; 4];
            reader.read_exact(&mut chunk_id)?;
            let chunk_size = reader.read_u32::<LittleEndian>()?;

            match &chunk_id {
                b"fmt " => {
                    if chunk_size < 16 {
                        return Err(invalid(format!("fmt chunk too short ({chunk_size} bytes)")));
                    }
                    if chunk_size > MAX_FMT_CHUNK {
                        return Err(invalid(format!("fmt chunk too long ({chunk_size} bytes)")));
                    }
                    let mut body = vec![0u8; chunk_size as usize];
                    reader.read_exact(&mut body)?;
                    if chunk_size & 1 == 1 {
                        reader.seek(SeekFrom::Current(1))?;
                    }
                    fmt = Some(FmtChunk::parse(&body)?);
                }
                b"data" => {
                    let fmt = fmt.ok_or_else(|| invalid("data chunk before fmt chunk"))?;
                    let header = WavHeader {
                        riff_size,
                        audio_format: fmt.audio_format,
                        sub_format: fmt.sub_format,
                        num_channels: fmt.num_channels,
                        sample_rate: fmt.sample_rate,
                        byte_rate: fmt.byte_rate,
                        block_align: fmt.block_align,
                        bits_per_sample: fmt.bits_per_sample,
                        data_size: chunk_size,
                    };
                    header.validate()?;
                    return Ok(header);
                }
                _ => skip_chunk(reader, chunk_size)?,
            }
        }
    }

    pub fn read_from_file(path: &Path) -> Result<Self, DecodeError> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader)
    }

    /// Codec tag the samples are stored in, looking through the extensible wrapper
    pub fn codec(&self) -> u16 {
        self.sub_format.unwrap_or(self.audio_format)
    }

    fn validate(&self) -> Result<(), DecodeError> {
        let codec = self.codec();
        if codec != WAVE_FORMAT_PCM && codec != WAVE_FORMAT_IEEE_FLOAT {
            return Err(invalid(format!("unsupported codec 0x{:04x}", codec)));
        }
        if self.num_channels == 0 {
            return Err(invalid("zero channels"));
        }
        if self.sample_rate == 0 {
            return Err(invalid("zero sample rate"));
        }
        if self.bits_per_sample == 0 || self.block_align == 0 {
            return Err(invalid("zero sample width"));
        }
        Ok(())
    }

    pub fn frames(&self) -> u64 {
        self.data_size as u64 / self.block_align as u64
    }

    pub fn to_audio_header(&self) -> AudioHeader {
        AudioHeader {
            container: "wav".to_string(),
            channels: self.num_channels,
            sample_rate: self.sample_rate,
            bits_per_sample: Some(self.bits_per_sample),
            frames: self.frames(),
        }
    }
}

/// WAV backend: headers via [`WavHeader`], samples via hound.
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn name(&self) -> &'static str {
        "wav"
    }

    fn handles(&self, ext: &str) -> bool {
        ext == "wav" || ext == "wave"
    }

    fn read_header(&self, path: &Path) -> Result<AudioHeader, DecodeError> {
        Ok(WavHeader::read_from_file(path)?.to_audio_header())
    }

    fn read_samples(&self, path: &Path) -> Result<AudioSamples, DecodeError> {
        let reader = WavReader::open(path)?;
        let spec = reader.spec();

        // 振幅を-1.0から1.0の範囲に正規化
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<f32>, _>>()?,
            hound::SampleFormat::Int => {
                let max_value = (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|sample| sample.map(|s| s as f32 / max_value))
                    .collect::<Result<Vec<f32>, _>>()?
            }
        };

        Ok(AudioSamples {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            samples,
        })
    }
}
