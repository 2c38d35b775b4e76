// Autoplay: advances the carousel on a fixed interval until the user takes over.

use crate::types::*;

/// Recurring "next item" timer with play/pause state.
#[derive(Debug, Clone)]
pub struct AutoplayController {
    interval_ms: u64,
    playing: bool,
    next_due: Option<Timestamp>,
}

impl AutoplayController {
    pub fn new(settings: AutoplaySettings) -> Self {
        AutoplayController {
            interval_ms: settings.interval_ms.max(1),
            playing: settings.enabled,
            next_due: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start playing; the first advance is one interval from `now`.
    /// Returns `true` if this changed the state.
    pub fn start(&mut self, now: Timestamp) -> bool {
        let changed = !self.playing;
        self.playing = true;
        self.next_due = Some(now.plus_millis(self.interval_ms));
        changed
    }

    /// Returns `true` if this changed the state.
    pub fn stop(&mut self) -> bool {
        let changed = self.playing;
        self.playing = false;
        self.next_due = None;
        changed
    }

    /// Flip between playing and paused. Returns the new state.
    pub fn toggle(&mut self, now: Timestamp) -> bool {
        if self.playing {
            self.stop();
        } else {
            self.start(now);
        }
        self.playing
    }

    /// Whether the carousel should advance at `now`.
    /// Fires at most once per call; missed intervals are not replayed.
    pub fn poll(&mut self, now: Timestamp) -> bool {
        if !self.playing {
            return false;
        }

        match self.next_due {
            None => {
                self.next_due = Some(now.plus_millis(self.interval_ms));
                false
            }
            Some(due) if now >= due => {
                self.next_due = Some(now.plus_millis(self.interval_ms));
                true
            }
            Some(_) => false,
        }
    }

    /// Show the pause icon while playing and the play icon while paused.
    pub fn icon_patches(&self) -> Vec<ViewPatch> {
        let (play, pause) = if self.playing {
            ("none", "block")
        } else {
            ("block", "none")
        };
        vec![
            ViewPatch::style(Target::PlayIcon, StyleProperty::Display, play),
            ViewPatch::style(Target::PauseIcon, StyleProperty::Display, pause),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(ms: u64) -> Timestamp {
        Timestamp::from_micros(ms * 1000)
    }

    #[test]
    fn fires_every_interval_after_first_poll() {
        let mut autoplay = AutoplayController::new(AutoplaySettings::default());
        assert!(!autoplay.poll(ts(100)));
        assert!(!autoplay.poll(ts(3099)));
        assert!(autoplay.poll(ts(3100)));
        assert!(!autoplay.poll(ts(3200)));
        assert!(autoplay.poll(ts(6100)));
    }

    #[test]
    fn late_poll_fires_once() {
        let mut autoplay = AutoplayController::new(AutoplaySettings::default());
        autoplay.poll(ts(0));
        assert!(autoplay.poll(ts(20_000)));
        assert!(!autoplay.poll(ts(20_001)));
    }

    #[test]
    fn stop_and_toggle() {
        let mut autoplay = AutoplayController::new(AutoplaySettings::default());
        autoplay.poll(ts(0));
        assert!(autoplay.stop());
        assert!(!autoplay.stop());
        assert!(!autoplay.poll(ts(10_000)));

        assert!(autoplay.toggle(ts(10_000)));
        assert!(!autoplay.poll(ts(12_999)));
        assert!(autoplay.poll(ts(13_000)));
        assert!(!autoplay.toggle(ts(13_500)));
    }

    #[test]
    fn disabled_settings_start_paused() {
        let mut autoplay = AutoplayController::new(AutoplaySettings {
            enabled: false,
            interval_ms: 1000,
        });
        assert!(!autoplay.is_playing());
        assert!(!autoplay.poll(ts(5000)));
        assert_eq!(
            autoplay.icon_patches()[0],
            ViewPatch::style(Target::PlayIcon, StyleProperty::Display, "block")
        );
    }
}
