//! Dual-layer ambience mixer.
//!
//! Composes a scenario base layer and a functional-noise overlay, plus a
//! non-looping chime channel for the ritual transition sound. All per-layer
//! volumes derive from a single master volume; only the phase engine writes
//! the master, the mixer just stages it across layers.

use serde::{Deserialize, Serialize};

use super::channel::{AudioChannel, AudioSink};
use crate::storage::AudioConfig;

/// Base-layer attenuation while the overlay is active.
pub const BASE_DUCK: f32 = 0.65;
/// Overlay gain relative to master.
pub const OVERLAY_GAIN: f32 = 0.8;

/// Which functional-noise overlay accompanies the scenario track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbianceMode {
    /// Scenario track only.
    Original,
    /// Pink-noise overlay.
    Sleep,
    /// Brown-noise overlay.
    Meditate,
}

pub struct DualLayerMixer {
    base: AudioChannel,
    overlay: AudioChannel,
    chime: AudioChannel,
    mode: AmbianceMode,
    master: f32,
    pink_noise_url: String,
    brown_noise_url: String,
}

impl DualLayerMixer {
    pub fn new(
        base_sink: Box<dyn AudioSink>,
        overlay_sink: Box<dyn AudioSink>,
        chime_sink: Box<dyn AudioSink>,
        audio: &AudioConfig,
    ) -> Self {
        let mut chime = AudioChannel::new(chime_sink, false);
        chime.set_url(&audio.chime_url);
        let mut mixer = Self {
            base: AudioChannel::new(base_sink, true),
            overlay: AudioChannel::new(overlay_sink, true),
            chime,
            mode: AmbianceMode::Original,
            master: 1.0,
            pink_noise_url: audio.pink_noise_url.clone(),
            brown_noise_url: audio.brown_noise_url.clone(),
        };
        mixer.apply_volumes();
        mixer
    }

    pub fn mode(&self) -> AmbianceMode {
        self.mode
    }

    pub fn master(&self) -> f32 {
        self.master
    }

    pub fn base(&self) -> &AudioChannel {
        &self.base
    }

    pub fn overlay(&self) -> &AudioChannel {
        &self.overlay
    }

    /// The overlay URL a mode selects, or `None` for `Original`.
    pub fn overlay_url(&self, mode: AmbianceMode) -> Option<&str> {
        match mode {
            AmbianceMode::Original => None,
            AmbianceMode::Sleep => Some(&self.pink_noise_url),
            AmbianceMode::Meditate => Some(&self.brown_noise_url),
        }
    }

    /// Switch ambiance mode. The overlay follows the base layer's play
    /// state; switching back to `Original` silences the overlay.
    pub fn set_mode(&mut self, mode: AmbianceMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        match self.overlay_url(mode).map(str::to_owned) {
            Some(url) => {
                self.overlay.set_url(&url);
                self.overlay.set_playing(self.base.is_playing());
            }
            None => self.overlay.set_playing(false),
        }
        self.apply_volumes();
    }

    /// Set the master volume (clamped) and restage both layers from it.
    pub fn set_master(&mut self, volume: f32) {
        self.master = volume.clamp(0.0, 1.0);
        self.apply_volumes();
    }

    pub fn set_base_url(&mut self, url: &str) {
        self.base.set_url(url);
    }

    /// Start the base layer (and the overlay, when a mode selects one).
    pub fn play(&mut self) {
        self.base.set_playing(true);
        if self.overlay_url(self.mode).is_some() {
            self.overlay.set_playing(true);
        }
    }

    pub fn pause(&mut self) {
        self.base.set_playing(false);
        self.overlay.set_playing(false);
    }

    /// Fire the one-shot transition chime at full master volume.
    pub fn play_chime(&mut self) {
        self.chime.set_volume(1.0);
        self.chime.retrigger();
    }

    fn apply_volumes(&mut self) {
        if self.overlay_url(self.mode).is_some() {
            self.base.set_volume(self.master * BASE_DUCK);
            self.overlay.set_volume(self.master * OVERLAY_GAIN);
        } else {
            self.base.set_volume(self.master);
            self.overlay.set_volume(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullSink;
    use crate::storage::AudioConfig;

    fn mixer() -> DualLayerMixer {
        DualLayerMixer::new(
            Box::new(NullSink),
            Box::new(NullSink),
            Box::new(NullSink),
            &AudioConfig::default(),
        )
    }

    #[test]
    fn sleep_mode_selects_pink_noise_and_ducks_base() {
        let mut m = mixer();
        let pink = AudioConfig::default().pink_noise_url;
        m.set_master(1.0);
        m.set_mode(AmbianceMode::Sleep);

        assert_eq!(m.overlay_url(AmbianceMode::Sleep), Some(pink.as_str()));
        assert_eq!(m.overlay().url(), pink);
        assert!((m.base().volume() - BASE_DUCK).abs() < 1e-6);
        assert!((m.overlay().volume() - OVERLAY_GAIN).abs() < 1e-6);
    }

    #[test]
    fn original_mode_plays_base_at_full_master() {
        let mut m = mixer();
        m.set_master(0.5);
        assert!((m.base().volume() - 0.5).abs() < 1e-6);
        assert!(m.overlay_url(AmbianceMode::Original).is_none());
    }

    #[test]
    fn overlay_follows_base_play_state() {
        let mut m = mixer();
        m.set_base_url("scene.mp3");
        m.play();
        m.set_mode(AmbianceMode::Meditate);
        assert!(m.overlay().is_playing());

        m.set_mode(AmbianceMode::Original);
        assert!(!m.overlay().is_playing());
    }

    #[test]
    fn master_is_clamped() {
        let mut m = mixer();
        m.set_master(3.0);
        assert_eq!(m.master(), 1.0);
        m.set_master(-1.0);
        assert_eq!(m.master(), 0.0);
    }

    #[test]
    fn layer_volumes_scale_with_master() {
        let mut m = mixer();
        m.set_mode(AmbianceMode::Sleep);
        m.set_master(0.5);
        assert!((m.base().volume() - 0.5 * BASE_DUCK).abs() < 1e-6);
        assert!((m.overlay().volume() - 0.5 * OVERLAY_GAIN).abs() < 1e-6);
    }
}
