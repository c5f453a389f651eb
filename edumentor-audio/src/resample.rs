use anyhow::Context;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Converts mono PCM in [-1, 1] from `from_hz` to `to_hz` in one pass.
///
/// The output is aligned with the input and holds `ceil(len * to / from)`
/// samples; the filter's delay is flushed rather than cut off the end.
pub fn resample_mono(samples: &[f32], from_hz: u32, to_hz: u32) -> anyhow::Result<Vec<f32>> {
    if from_hz == to_hz || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    anyhow::ensure!(from_hz > 0 && to_hz > 0, "sample rate must be positive");

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = f64::from(to_hz) / f64::from(from_hz);
    let expected = (samples.len() as u64 * u64::from(to_hz)).div_ceil(u64::from(from_hz)) as usize;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, samples.len(), 1)
        .context("create resampler")?;
    let delay = resampler.output_delay();

    let mut out = mono(resampler.process(&[samples], None).context("resample")?);
    while out.len() < delay + expected {
        let tail = mono(
            resampler
                .process_partial(None::<&[&[f32]]>, None)
                .context("flush resampler")?,
        );
        if tail.is_empty() {
            break;
        }
        out.extend(tail);
    }

    out.drain(..delay.min(out.len()));
    out.truncate(expected);
    Ok(out)
}

fn mono(channels: Vec<Vec<f32>>) -> Vec<f32> {
    channels.into_iter().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_is_passthrough() {
        let x = vec![0.0, 0.5, -0.5, 0.25];
        assert_eq!(resample_mono(&x, 16_000, 16_000).unwrap(), x);
    }

    #[test]
    fn upsampling_produces_more_samples() {
        let x: Vec<f32> = (0..4_000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let y = resample_mono(&x, 8_000, 16_000).unwrap();
        assert_eq!(y.len(), 8_000);
        assert!(y.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn end_of_recording_survives() {
        // Silence, then a level of 0.5 over the last 1000 input samples.
        let mut x = vec![0.0_f32; 8_000];
        x[7_000..].fill(0.5);

        let y = resample_mono(&x, 8_000, 16_000).unwrap();
        assert_eq!(y.len(), 16_000);
        assert!(y[..1_000].iter().all(|s| s.abs() < 0.01));
        for i in [14_500, 15_000, 15_500] {
            assert!((y[i] - 0.5).abs() < 0.05, "sample {i} = {}", y[i]);
        }
    }

    #[test]
    fn downsampling_keeps_length_proportional() {
        let x = vec![0.25_f32; 44_100];
        let y = resample_mono(&x, 44_100, 16_000).unwrap();
        assert_eq!(y.len(), 16_000);
        assert!((y[8_000] - 0.25).abs() < 0.01);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(resample_mono(&[], 44_100, 16_000).unwrap().is_empty());
    }
}
