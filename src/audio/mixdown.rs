/// Averages interleaved frames of `channels` samples into `out`, one value per
/// frame. Values are added to what `out` already holds, so it should be zero
/// on entry; `SlidingDft::process` leaves its input that way.
///
/// Trailing samples that do not make up a whole frame are ignored. Returns the
/// number of frames mixed, which is at most `out.len()`.
pub fn mix_interleaved(interleaved: &[f32], channels: usize, out: &mut [f32]) -> usize {
    let channels = channels.max(1);
    if channels == 1 {
        let frames = interleaved.len().min(out.len());
        for (acc, &sample) in out.iter_mut().zip(&interleaved[..frames]) {
            *acc += sample;
        }
        return frames;
    }

    let scale = 1.0 / channels as f32;
    let mut frames = 0;
    for (acc, frame) in out.iter_mut().zip(interleaved.chunks_exact(channels)) {
        *acc += frame.iter().sum::<f32>() * scale;
        frames += 1;
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passes_through() {
        let mut out = [0.0f32; 4];
        assert_eq!(mix_interleaved(&[0.1, 0.2, 0.3], 1, &mut out), 3);
        assert_eq!(out, [0.1, 0.2, 0.3, 0.0]);
    }

    #[test]
    fn stereo_is_averaged() {
        let mut out = [0.0f32; 3];
        let frames = mix_interleaved(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2, &mut out);
        assert_eq!(frames, 3);
        assert_eq!(out, [0.5, 0.5, 0.0]);
    }

    #[test]
    fn accumulates_into_output() {
        let mut out = [0.25f32, 0.25];
        mix_interleaved(&[0.5, 0.5, 0.5, 0.5], 2, &mut out);
        assert_eq!(out, [0.75, 0.75]);
    }

    #[test]
    fn partial_frames_and_short_output() {
        let mut out = [0.0f32; 8];
        // Two whole 3-channel frames plus one stray sample.
        assert_eq!(mix_interleaved(&[0.3, 0.3, 0.3, 0.6, 0.6, 0.6, 9.0], 3, &mut out), 2);
        assert!((out[0] - 0.3).abs() < 1e-6);
        assert!((out[1] - 0.6).abs() < 1e-6);
        assert_eq!(out[2], 0.0);

        let mut short = [0.0f32; 1];
        assert_eq!(mix_interleaved(&[1.0, 1.0, 1.0, 1.0], 2, &mut short), 1);
        assert_eq!(short, [1.0]);
    }
}
