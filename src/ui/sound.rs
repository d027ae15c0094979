/// Sound effects: short procedural cues generated at start-up, played
/// through rodio.
///
/// Three cues: a bright "point" chirp when a pair is cleared, a falling
/// "hit" thud on collision and a rising sweep when a level starts.
///
/// Build without the "sound" feature to drop rodio; the stub engine then
/// accepts the same calls and plays nothing.

use crate::sim::event::GameEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    pub(super) const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_point: Arc<Vec<u8>>,
        sfx_hit: Arc<Vec<u8>>,
        sfx_level: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_point: Arc::new(make_wav(&gen_point())),
                sfx_hit: Arc::new(make_wav(&gen_hit())),
                sfx_level: Arc::new(make_wav(&gen_level())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("audio sink unavailable: {e}");
                    return;
                }
            };
            let cursor = Cursor::new(buf.as_ref().clone());
            if let Ok(src) = rodio::Decoder::new(cursor) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_point(&self) { self.play(&self.sfx_point); }
        pub fn play_hit(&self) { self.play(&self.sfx_hit); }
        pub fn play_level(&self) { self.play(&self.sfx_level); }
    }

    // ── Waveforms (mono f32) ──

    /// Two quick square-ish notes, E6 then A6.
    pub(super) fn gen_point() -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in &[(1319.0_f32, 0.04), (1760.0, 0.07)] {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Low thud: falling tone under a noise burst.
    pub(super) fn gen_hit() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.3) as usize;
        let mut lcg: u32 = 0x2545_f491;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                let freq = 180.0 - p * 120.0;
                let tone = (t * freq * TAU).sin();
                lcg = lcg.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let noise = (lcg as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let noise_env = (1.0 - p * 4.0).max(0.0);
                (tone * 0.7 + noise * 0.5 * noise_env) * (1.0 - p).powf(0.7) * 0.35
            })
            .collect()
    }

    /// Rising sweep, 400Hz to 1200Hz.
    pub(super) fn gen_level() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.35) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let freq = 400.0 + p * 800.0;
                phase += freq / SAMPLE_RATE as f32;
                let env = if p < 0.1 { p * 10.0 } else { 1.0 - (p - 0.1) / 0.9 };
                (phase * TAU).sin() * env * 0.25
            })
            .collect()
    }

    /// Wrap mono samples in a 16-bit PCM WAV container.
    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let channels: u16 = 1;
        let bits: u16 = 16;
        let byte_rate = SAMPLE_RATE * channels as u32 * bits as u32 / 8;
        let block_align = channels * bits / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_point(&self) {}
    pub fn play_hit(&self) {}
    pub fn play_level(&self) {}
}

/// Play the cue for each event, unless muted or audio is unavailable.
pub fn play_events(sound: Option<&SoundEngine>, events: &[GameEvent], muted: bool) {
    let Some(sound) = sound else { return };
    if muted { return; }
    for ev in events {
        match *ev {
            GameEvent::PointScored { score } => {
                log::trace!("point cue for score {score}");
                sound.play_point();
            }
            GameEvent::Collision => sound.play_hit(),
            GameEvent::LevelStarted { level } => {
                log::trace!("level cue for level {level}");
                sound.play_level();
            }
        }
    }
}

#[cfg(all(test, feature = "sound"))]
mod tests {
    use super::inner::*;

    #[test]
    fn wav_header_describes_payload() {
        let samples = gen_point();
        let wav = make_wav(&samples);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + samples.len() * 2);
        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_size as usize, samples.len() * 2);
        let rate = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(rate, SAMPLE_RATE);
    }

    #[test]
    fn cues_stay_in_range() {
        for samples in [gen_point(), gen_hit(), gen_level()] {
            assert!(!samples.is_empty());
            assert!(samples.iter().all(|s| s.abs() <= 1.0));
        }
    }
}
