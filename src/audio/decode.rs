//! Format-agnostic audio decoding via symphonia.
//!
//! Every corpus source funnels its file reads through [`read_audio`], which
//! enforces the shared sub-contract: the decoded track must already be at the
//! configured sampling rate (a mismatch is a hard error, never a silent
//! resample), only the first channel is kept, and an optional frame cap stops
//! decoding as soon as enough samples have been collected.

use crate::error::{Result, ScribeError};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::conv::FromSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode an audio file into f32 PCM samples of its first channel.
///
/// The track's intrinsic sampling rate must equal `expected_rate`, otherwise
/// decoding fails with [`ScribeError::RateMismatch`] before any packet is
/// read. When `max_frames` is given, decoding stops once that many samples
/// have been collected and the result is capped to exactly that length.
pub fn read_audio(path: &Path, expected_rate: u32, max_frames: Option<usize>) -> Result<Vec<f32>> {
    tracing::debug!(path = %path.display(), "decoding audio file");

    let file = File::open(path).map_err(|e| ScribeError::CorpusLayout {
        path: path.display().to_string(),
        message: format!("cannot open audio file: {e}"),
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decode_error(path, format!("unrecognized format: {e}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| decode_error(path, "no audio track found".to_string()))?;
    let track_id = track.id;

    let rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| decode_error(path, "sampling rate unknown".to_string()))?;
    if rate != expected_rate {
        return Err(ScribeError::RateMismatch {
            path: path.display().to_string(),
            expected: expected_rate,
            actual: rate,
        });
    }

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_error(path, format!("cannot create decoder: {e}")))?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(decode_error(path, format!("error reading packet: {e}"))),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| decode_error(path, format!("cannot decode packet: {e}")))?;
        extend_first_channel(&decoded, &mut samples);

        if let Some(max) = max_frames
            && samples.len() >= max
        {
            samples.truncate(max);
            break;
        }
    }

    if samples.is_empty() {
        return Err(decode_error(path, "decoded no audio frames".to_string()));
    }
    Ok(samples)
}

fn decode_error(path: &Path, message: String) -> ScribeError {
    ScribeError::AudioDecode {
        path: path.display().to_string(),
        message,
    }
}

/// Append the first channel of a decoded buffer, converted to f32.
fn extend_first_channel(decoded: &AudioBufferRef, out: &mut Vec<f32>) {
    macro_rules! first_channel {
        ($buf:expr) => {
            out.extend($buf.chan(0).iter().map(|&s| f32::from_sample(s)))
        };
    }
    match decoded {
        AudioBufferRef::F32(buf) => out.extend_from_slice(buf.chan(0)),
        AudioBufferRef::F64(buf) => first_channel!(buf),
        AudioBufferRef::U8(buf) => first_channel!(buf),
        AudioBufferRef::U16(buf) => first_channel!(buf),
        AudioBufferRef::U24(buf) => first_channel!(buf),
        AudioBufferRef::U32(buf) => first_channel!(buf),
        AudioBufferRef::S8(buf) => first_channel!(buf),
        AudioBufferRef::S16(buf) => first_channel!(buf),
        AudioBufferRef::S24(buf) => first_channel!(buf),
        AudioBufferRef::S32(buf) => first_channel!(buf),
    }
}
