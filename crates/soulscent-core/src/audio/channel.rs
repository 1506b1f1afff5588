//! Single-source audio channel controller.

use tracing::warn;

use crate::error::PlaybackError;

/// The platform playback handle behind one channel.
///
/// Implementations wrap whatever the host can actually play through (a
/// browser media element, a native output stream, a test recorder). All
/// methods are expected to return quickly; decoding and buffering happen
/// behind the sink.
pub trait AudioSink: Send {
    /// Swap the source URL. The sink reloads from the new source and is
    /// left paused at position zero.
    fn set_source(&mut self, url: &str) -> Result<(), PlaybackError>;

    /// Request playback. May be refused by platform policy (autoplay).
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Pause playback. Idempotent.
    fn pause(&mut self);

    /// Apply a volume in [0, 1]. Callers clamp before invoking.
    fn set_volume(&mut self, volume: f32);

    /// Enable or disable looping.
    fn set_looping(&mut self, looping: bool);
}

/// A sink that plays nothing. For headless hosts and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn set_source(&mut self, _url: &str) -> Result<(), PlaybackError> {
        Ok(())
    }
    fn play(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }
    fn pause(&mut self) {}
    fn set_volume(&mut self, _volume: f32) {}
    fn set_looping(&mut self, _looping: bool) {}
}

/// Controller for one playable audio source.
///
/// Holds the desired `(url, playing, volume)` triple and keeps the
/// underlying sink in agreement with it. Play-request rejections are
/// swallowed here: the channel logs and stays paused, and the caller
/// never sees an error.
pub struct AudioChannel {
    sink: Box<dyn AudioSink>,
    url: String,
    playing: bool,
    volume: f32,
}

impl AudioChannel {
    /// Create a channel over `sink`. Looping is fixed for the lifetime of
    /// the channel: always on for ambience layers, off for one-shots.
    pub fn new(mut sink: Box<dyn AudioSink>, looping: bool) -> Self {
        sink.set_looping(looping);
        sink.set_volume(1.0);
        Self {
            sink,
            url: String::new(),
            playing: false,
            volume: 1.0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Swap the source URL.
    ///
    /// Captures whether the channel was playing, reloads, and resumes only
    /// if it was. A paused channel never starts playing because of an
    /// unrelated URL change.
    pub fn set_url(&mut self, url: &str) {
        if self.url == url {
            return;
        }
        let was_playing = self.playing;
        self.sink.pause();
        self.playing = false;
        if let Err(e) = self.sink.set_source(url) {
            warn!(url, error = %e, "audio source swap failed; channel stays paused");
            self.url = url.to_string();
            return;
        }
        self.url = url.to_string();
        if was_playing {
            self.try_play();
        }
    }

    /// Request play (`true`) or pause (`false`). Pause is idempotent; a
    /// refused play request leaves the channel paused.
    pub fn set_playing(&mut self, playing: bool) {
        if playing {
            self.try_play();
        } else {
            self.sink.pause();
            self.playing = false;
        }
    }

    /// Pause then play, restarting a one-shot source from the top.
    pub fn retrigger(&mut self) {
        self.sink.pause();
        self.playing = false;
        self.try_play();
    }

    /// Apply a volume, clamped to [0, 1], regardless of play state.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.sink.set_volume(self.volume);
    }

    fn try_play(&mut self) {
        match self.sink.play() {
            Ok(()) => self.playing = true,
            Err(e) => {
                warn!(url = %self.url, error = %e, "play request rejected; channel stays paused");
                self.playing = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Source(String),
        Play,
        Pause,
        Volume(f32),
        Looping(bool),
    }

    struct MockSink {
        log: Arc<Mutex<Vec<Op>>>,
        reject_play: bool,
    }

    impl MockSink {
        fn new(reject_play: bool) -> (Self, Arc<Mutex<Vec<Op>>>) {
            let log = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    log: log.clone(),
                    reject_play,
                },
                log,
            )
        }
    }

    impl AudioSink for MockSink {
        fn set_source(&mut self, url: &str) -> Result<(), PlaybackError> {
            self.log.lock().unwrap().push(Op::Source(url.into()));
            Ok(())
        }
        fn play(&mut self) -> Result<(), PlaybackError> {
            self.log.lock().unwrap().push(Op::Play);
            if self.reject_play {
                Err(PlaybackError::Rejected("autoplay policy".into()))
            } else {
                Ok(())
            }
        }
        fn pause(&mut self) {
            self.log.lock().unwrap().push(Op::Pause);
        }
        fn set_volume(&mut self, volume: f32) {
            self.log.lock().unwrap().push(Op::Volume(volume));
        }
        fn set_looping(&mut self, looping: bool) {
            self.log.lock().unwrap().push(Op::Looping(looping));
        }
    }

    #[test]
    fn rejected_play_leaves_channel_paused() {
        let (sink, _log) = MockSink::new(true);
        let mut ch = AudioChannel::new(Box::new(sink), true);
        ch.set_playing(true);
        assert!(!ch.is_playing());
    }

    #[test]
    fn pause_is_idempotent() {
        let (sink, log) = MockSink::new(false);
        let mut ch = AudioChannel::new(Box::new(sink), true);
        ch.set_playing(false);
        ch.set_playing(false);
        assert!(!ch.is_playing());
        let pauses = log
            .lock()
            .unwrap()
            .iter()
            .filter(|op| **op == Op::Pause)
            .count();
        assert_eq!(pauses, 2);
    }

    #[test]
    fn url_swap_resumes_only_if_playing() {
        let (sink, _log) = MockSink::new(false);
        let mut ch = AudioChannel::new(Box::new(sink), true);
        ch.set_url("a.mp3");
        assert!(!ch.is_playing(), "paused channel must not auto-resume");

        ch.set_playing(true);
        ch.set_url("b.mp3");
        assert!(ch.is_playing(), "playing channel resumes after swap");
        assert_eq!(ch.url(), "b.mp3");
    }

    #[test]
    fn url_swap_to_same_url_is_a_no_op() {
        let (sink, log) = MockSink::new(false);
        let mut ch = AudioChannel::new(Box::new(sink), true);
        ch.set_url("a.mp3");
        let before = log.lock().unwrap().len();
        ch.set_url("a.mp3");
        assert_eq!(log.lock().unwrap().len(), before);
    }

    #[test]
    fn volume_applies_while_paused() {
        let (sink, log) = MockSink::new(false);
        let mut ch = AudioChannel::new(Box::new(sink), true);
        ch.set_volume(0.4);
        assert!(log.lock().unwrap().contains(&Op::Volume(0.4)));
        assert!(!ch.is_playing());
    }

    proptest! {
        /// Volume stays in [0, 1] for any sequence of set operations.
        #[test]
        fn volume_always_clamped(values in proptest::collection::vec(-10.0f32..10.0, 1..32)) {
            let (sink, _log) = MockSink::new(false);
            let mut ch = AudioChannel::new(Box::new(sink), true);
            for v in values {
                ch.set_volume(v);
                prop_assert!((0.0..=1.0).contains(&ch.volume()));
            }
        }
    }
}
