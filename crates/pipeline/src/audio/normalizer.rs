//! Audio normalizer
//!
//! Decodes any container/codec symphonia understands, downmixes to mono,
//! resamples to 16 kHz and re-encodes as 16-bit PCM WAV. The WAV bytes are
//! base64 encoded for transport in the compute request.

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use akara_core::audio::canonical;

use crate::PipelineError;

/// Canonical WAV produced by the normalizer
#[derive(Debug, Clone)]
pub struct NormalizedAudio {
    /// Base64 of the WAV container bytes
    pub base64: String,
    /// Mono sample count at 16 kHz
    pub samples: usize,
}

impl NormalizedAudio {
    pub fn duration_secs(&self) -> f32 {
        self.samples as f32 / canonical::SAMPLE_RATE.as_u32() as f32
    }
}

/// Normalize an audio file on disk
pub fn normalize_file(path: &Path) -> Result<NormalizedAudio, PipelineError> {
    let data = std::fs::read(path).map_err(|e| {
        PipelineError::AudioProcessing(format!("read {}: {}", path.display(), e))
    })?;
    let extension = path.extension().and_then(|e| e.to_str());
    normalize_bytes(&data, extension)
}

/// Normalize an in-memory audio buffer
///
/// `extension` is an optional probe hint such as `"mp3"` or `"wav"`.
pub fn normalize_bytes(data: &[u8], extension: Option<&str>) -> Result<NormalizedAudio, PipelineError> {
    if data.is_empty() {
        return Err(PipelineError::AudioProcessing("empty audio input".to_string()));
    }

    let (samples, source_rate) = decode_to_mono(data, extension)?;
    let target_rate = canonical::SAMPLE_RATE.as_u32();

    let samples = if source_rate != target_rate {
        resample(&samples, source_rate, target_rate)?
    } else {
        samples
    };

    if samples.is_empty() {
        return Err(PipelineError::AudioProcessing("no audio samples decoded".to_string()));
    }

    let wav = encode_wav(&samples)?;

    tracing::debug!(
        source_rate,
        samples = samples.len(),
        wav_bytes = wav.len(),
        "Audio normalized to 16kHz mono PCM"
    );

    Ok(NormalizedAudio {
        base64: BASE64.encode(&wav),
        samples: samples.len(),
    })
}

fn decode_to_mono(data: &[u8], extension: Option<&str>) -> Result<(Vec<f32>, u32), PipelineError> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| PipelineError::AudioProcessing(format!("probe: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| PipelineError::AudioProcessing("no audio track found".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| PipelineError::AudioProcessing(format!("codec: {}", e)))?;

    let mut source_rate = codec_params.sample_rate;
    let mut mono: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => {
                return Err(PipelineError::AudioProcessing(format!("packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => {
                return Err(PipelineError::AudioProcessing(format!("decode: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let frames = decoded.frames();
        if frames == 0 {
            continue;
        }
        source_rate.get_or_insert(spec.rate);

        let channels = spec.channels.count().max(1);
        let mut buf = SampleBuffer::<f32>::new(frames as u64, spec);
        buf.copy_interleaved_ref(decoded);

        if channels > 1 {
            mono.extend(
                buf.samples()
                    .chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        } else {
            mono.extend_from_slice(buf.samples());
        }
    }

    if mono.is_empty() {
        return Err(PipelineError::AudioProcessing("zero-length audio stream".to_string()));
    }

    let rate = source_rate
        .ok_or_else(|| PipelineError::AudioProcessing("unknown sample rate".to_string()))?;

    Ok((mono, rate))
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, PipelineError> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let chunk_size = 1024;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1)
        .map_err(|e| PipelineError::AudioProcessing(format!("resampler init: {}", e)))?;

    let expected_len = (samples.len() as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected_len + delay + chunk_size);

    // Zero chunks after the input flush the filter so the tail survives the delay trim
    let silence = vec![0.0f32; chunk_size];
    let mut chunks = samples.chunks(chunk_size);
    while output.len() < expected_len + delay {
        let mut input = chunks.next().unwrap_or(silence.as_slice()).to_vec();
        input.resize(chunk_size, 0.0);

        let result = resampler
            .process(&[input], None)
            .map_err(|e| PipelineError::AudioProcessing(format!("resample: {}", e)))?;

        match result.first() {
            Some(channel) if !channel.is_empty() => output.extend_from_slice(channel),
            _ => break,
        }
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected_len);

    Ok(output)
}

fn encode_wav(samples: &[f32]) -> Result<Vec<u8>, PipelineError> {
    let spec = hound::WavSpec {
        channels: canonical::CHANNELS,
        sample_rate: canonical::SAMPLE_RATE.as_u32(),
        bits_per_sample: canonical::BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(quantize(sample))?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// f32 in [-1.0, 1.0) to i16, exact for values that came from i16
fn quantize(sample: f32) -> i16 {
    (sample * 32768.0).round().clamp(-32768.0, 32767.0) as i16
}
