//! Speech-to-text collaborator.
//!
//! The assessment core only consumes transcribed text. This module defines
//! the seam a recognizer plugs into, the WAV loading it expects, and an
//! optional native Whisper backend.

use std::path::Path;

use hound::{SampleFormat, WavReader};

/// Sample rate the Whisper backend expects.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("failed to read audio {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: hound::Error,
    },
    #[error("unsupported audio: {0}")]
    UnsupportedAudio(String),
    #[error("recognizer failed: {0}")]
    Backend(String),
}

/// Speech recognition backend.
pub trait Transcriber: Send + Sync {
    /// Backend name for display.
    fn name(&self) -> &str;

    /// Transcribe mono samples in [-1, 1] to text.
    fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<String, TranscriptionError>;
}

/// Read a mono 16-bit PCM WAV file.
///
/// Returns samples normalized to [-1, 1] and the sample rate. Other
/// layouts are rejected rather than converted.
pub fn read_wav(path: &Path) -> Result<(Vec<f32>, u32), TranscriptionError> {
    let reader = WavReader::open(path).map_err(|source| TranscriptionError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(TranscriptionError::UnsupportedAudio(format!(
            "audio must be mono, got {} channels",
            spec.channels
        )));
    }
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(TranscriptionError::UnsupportedAudio(format!(
            "audio must be 16-bit PCM, got {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }

    let samples = reader
        .into_samples::<i16>()
        .map(|s| s.map(|v| v as f32 / 32768.0))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TranscriptionError::Io {
            path: path.display().to_string(),
            source,
        })?;

    log::debug!(
        "Read {} samples at {} Hz from {}",
        samples.len(),
        spec.sample_rate,
        path.display()
    );
    Ok((samples, spec.sample_rate))
}

/// Read a WAV file and run it through `transcriber`.
pub fn transcribe_file(
    transcriber: &dyn Transcriber,
    path: &Path,
) -> Result<String, TranscriptionError> {
    let (samples, sample_rate) = read_wav(path)?;
    if samples.is_empty() {
        return Err(TranscriptionError::UnsupportedAudio(
            "audio contains no samples".to_string(),
        ));
    }
    let text = transcriber.transcribe(&samples, sample_rate)?;
    log::info!("Transcribed {} with {}: {}", path.display(), transcriber.name(), text);
    Ok(text)
}

/// Native whisper.cpp backend over a local GGML model file.
#[cfg(feature = "whisper-native")]
pub struct WhisperTranscriber {
    ctx: whisper_rs::WhisperContext,
    language: String,
}

#[cfg(feature = "whisper-native")]
impl WhisperTranscriber {
    pub fn new(model_path: &Path, language: &str) -> Result<Self, TranscriptionError> {
        use whisper_rs::{WhisperContext, WhisperContextParameters};

        let path = model_path.to_str().ok_or_else(|| {
            TranscriptionError::Backend(format!("invalid model path: {}", model_path.display()))
        })?;
        if !model_path.exists() {
            return Err(TranscriptionError::Backend(format!(
                "whisper model not found: {}",
                model_path.display()
            )));
        }
        let ctx = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .map_err(|e| TranscriptionError::Backend(format!("failed to load model: {}", e)))?;
        Ok(Self {
            ctx,
            language: language.to_string(),
        })
    }
}

#[cfg(feature = "whisper-native")]
impl Transcriber for WhisperTranscriber {
    fn name(&self) -> &str {
        "whisper"
    }

    fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<String, TranscriptionError> {
        use whisper_rs::{FullParams, SamplingStrategy};

        if sample_rate != WHISPER_SAMPLE_RATE {
            return Err(TranscriptionError::UnsupportedAudio(format!(
                "whisper needs {} Hz audio, got {} Hz",
                WHISPER_SAMPLE_RATE, sample_rate
            )));
        }

        let backend = |e: whisper_rs::WhisperError| TranscriptionError::Backend(e.to_string());

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(&self.language));

        let mut state = self.ctx.create_state().map_err(backend)?;
        state.full(params, samples).map_err(backend)?;

        let n_segments = state.full_n_segments().map_err(backend)?;
        let mut text_parts = Vec::new();
        for i in 0..n_segments {
            let segment_text = state.full_get_segment_text(i).map_err(backend)?;
            text_parts.push(segment_text.trim().to_string());
        }

        Ok(text_parts.join(" ").trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    struct Echo;

    impl Transcriber for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<String, TranscriptionError> {
            Ok(format!("{} samples at {}", samples.len(), sample_rate))
        }
    }

    fn write_test_wav(path: &Path, channels: u16, bits: u16, n: usize) {
        let spec = WavSpec {
            channels,
            sample_rate: 16000,
            bits_per_sample: bits,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..n * channels as usize {
            if bits == 16 {
                writer.write_sample((i as i16).wrapping_mul(100)).unwrap();
            } else {
                writer.write_sample(i as i32 * 1000).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    fn test_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("elocute_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_read_wav_mono_16bit() {
        let dir = test_dir("wav_mono");
        let path = dir.join("a.wav");
        write_test_wav(&path, 1, 16, 160);

        let (samples, sr) = read_wav(&path).unwrap();
        assert_eq!(sr, 16000);
        assert_eq!(samples.len(), 160);
        assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_wav_rejects_stereo() {
        let dir = test_dir("wav_stereo");
        let path = dir.join("a.wav");
        write_test_wav(&path, 2, 16, 10);

        let err = read_wav(&path).unwrap_err();
        assert!(matches!(err, TranscriptionError::UnsupportedAudio(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_wav_rejects_24bit() {
        let dir = test_dir("wav_24");
        let path = dir.join("a.wav");
        write_test_wav(&path, 1, 24, 10);

        let err = read_wav(&path).unwrap_err();
        assert!(matches!(err, TranscriptionError::UnsupportedAudio(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_wav_missing_file() {
        let err = read_wav(Path::new("/nonexistent/audio.wav")).unwrap_err();
        assert!(matches!(err, TranscriptionError::Io { .. }));
    }

    #[test]
    fn test_transcribe_file_uses_backend() {
        let dir = test_dir("wav_echo");
        let path = dir.join("a.wav");
        write_test_wav(&path, 1, 16, 32);

        let text = transcribe_file(&Echo, &path).unwrap();
        assert_eq!(text, "32 samples at 16000");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_transcribe_file_rejects_empty_audio() {
        let dir = test_dir("wav_empty");
        let path = dir.join("a.wav");
        write_test_wav(&path, 1, 16, 0);

        let err = transcribe_file(&Echo, &path).unwrap_err();
        assert!(matches!(err, TranscriptionError::UnsupportedAudio(_)));

        std::fs::remove_dir_all(&dir).ok();
    }
}
