use crate::error::AudioError;
use bytes::Bytes;
use std::io::Cursor;
use std::path::Path;

/// Raw audio read once at startup and shared without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    bytes: Bytes,
}

/// Header details of a WAV payload, used for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub frames: u32,
}

impl WavInfo {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }
}

impl AudioPayload {
    pub fn read(path: &Path) -> Result<Self, AudioError> {
        let data = std::fs::read(path)?;
        Ok(Self::from_bytes(data))
    }

    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self { bytes: data.into() }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Split into consecutive slices of at most `chunk_size` bytes.
    ///
    /// Slices share the underlying buffer; an empty payload yields nothing.
    pub fn chunks(&self, chunk_size: usize) -> impl Iterator<Item = Bytes> + '_ {
        let chunk_size = chunk_size.max(1);
        (0..self.bytes.len())
            .step_by(chunk_size)
            .map(move |start| {
                let end = (start + chunk_size).min(self.bytes.len());
                self.bytes.slice(start..end)
            })
    }

    /// Number of slices [`chunks`](Self::chunks) produces for `chunk_size`.
    pub fn chunk_count(&self, chunk_size: usize) -> usize {
        self.bytes.len().div_ceil(chunk_size.max(1))
    }

    /// Parse the RIFF/WAVE header without decoding samples.
    pub fn wav_info(&self) -> Result<WavInfo, AudioError> {
        let reader = hound::WavReader::new(Cursor::new(self.bytes.as_ref()))
            .map_err(|e| AudioError::WavParse(e.to_string()))?;
        let spec = reader.spec();
        Ok(WavInfo {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            frames: reader.duration(),
        })
    }
}
