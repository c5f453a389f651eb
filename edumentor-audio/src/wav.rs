use std::io::Cursor;

use anyhow::{Context, bail};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Mono PCM pulled out of a WAV container.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedWav {
    pub sample_rate_hz: u32,
    pub samples: Vec<f32>,
}

/// 16-bit mono WAV, the format the backend accepts everywhere.
pub fn encode_wav(samples: &[f32], sample_rate_hz: u32) -> anyhow::Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: sample_rate_hz,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec).context("start WAV")?;
    for &s in samples {
        let s = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
        writer.write_sample(s).context("write WAV sample")?;
    }
    writer.finalize().context("finalize WAV")?;
    Ok(cursor.into_inner())
}

/// Decodes any PCM WAV and downmixes it to mono.
pub fn decode_wav(bytes: &[u8]) -> anyhow::Result<DecodedWav> {
    let mut reader = WavReader::new(Cursor::new(bytes)).context("read WAV header")?;
    let spec = reader.spec();
    log::debug!("decoding WAV: {spec:?}");

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("read WAV samples")?,
        (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let scale = (1_i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .context("read WAV samples")?
        }
        (format, bits) => bail!("unsupported WAV encoding: {format:?} {bits}-bit"),
    };

    let channels = usize::from(spec.channels.max(1));
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(DecodedWav {
        sample_rate_hz: spec.sample_rate,
        samples,
    })
}
