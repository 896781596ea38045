//! PCM decoding via symphonia

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Sample rate and channel count of an audio stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub channels: usize,
}

struct OpenTrack {
    format: Box<dyn FormatReader>,
    track_id: u32,
    codec_params: CodecParameters,
}

fn open_track(path: &Path) -> Result<OpenTrack> {
    let file = File::open(path).with_context(|| format!("Failed to open audio file: {:?}", path))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("Failed to probe audio format: {:?}", path))?;

    let format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found")?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    Ok(OpenTrack {
        format,
        track_id,
        codec_params,
    })
}

/// Read the stream format without decoding any audio
pub fn probe_format(path: &Path) -> Result<StreamFormat> {
    let OpenTrack { codec_params, .. } = open_track(path)?;
    Ok(StreamFormat {
        sample_rate: codec_params
            .sample_rate
            .context("No sample rate in audio track")?,
        channels: codec_params
            .channels
            .map(|c| c.count())
            .context("No channel layout in audio track")?,
    })
}

/// Decode every sample of the first channel as f32 in [-1, 1]
///
/// Integer formats are scaled by their full-scale value, so 16-bit PCM
/// 16384 decodes to 0.5.
pub fn decode_first_channel(path: &Path) -> Result<Vec<f32>> {
    let OpenTrack {
        mut format,
        track_id,
        codec_params,
    } = open_track(path)?;

    let mut decoder: Box<dyn Decoder> = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .context("Failed to create audio decoder")?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("Error reading packet from {:?}: {:?}", path, e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Error decoding packet from {:?}: {:?}", path, e);
                continue;
            }
        };

        let spec = *decoded.spec();
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        // Interleaved frames: keep only the first channel
        let channels = spec.channels.count().max(1);
        samples.extend(sample_buf.samples().iter().step_by(channels));
    }

    log::debug!(
        "Decoded {} first-channel samples at {:?} Hz from {:?}",
        samples.len(),
        codec_params.sample_rate,
        path
    );

    Ok(samples)
}
