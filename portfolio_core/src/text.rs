// Clock-driven text animators: typewriter reveal and rotating labels.
// Each animator owns its own phase and index; `advance(now)` emits whatever is due.

use crate::error::PortfolioError;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq)]
enum TypewriterPhase {
    Idle,
    Waiting { until: Timestamp },
    Typing { revealed: usize, next_at: Timestamp },
    Holding { until: Timestamp },
    Done,
}

/// Reveals a text one character at a time, then hides the blinking cursor.
#[derive(Debug, Clone)]
pub struct Typewriter {
    chars: Vec<char>,
    settings: TypewriterSettings,
    phase: TypewriterPhase,
}

impl Typewriter {
    pub fn new(settings: TypewriterSettings) -> Self {
        Typewriter {
            chars: settings.text.chars().collect(),
            settings,
            phase: TypewriterPhase::Idle,
        }
    }

    /// Schedule the reveal. Only the first call has an effect.
    pub fn arm(&mut self, now: Timestamp) {
        if self.phase == TypewriterPhase::Idle {
            self.phase = TypewriterPhase::Waiting {
                until: now.plus_millis(self.settings.start_delay_ms),
            };
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase == TypewriterPhase::Done
    }

    /// Characters shown so far.
    pub fn revealed(&self) -> usize {
        match self.phase {
            TypewriterPhase::Idle | TypewriterPhase::Waiting { .. } => 0,
            TypewriterPhase::Typing { revealed, .. } => revealed,
            TypewriterPhase::Holding { .. } | TypewriterPhase::Done => self.chars.len(),
        }
    }

    pub fn advance(&mut self, now: Timestamp) -> Vec<ViewPatch> {
        let mut patches = Vec::new();
        let mut text_dirty = false;

        loop {
            match self.phase {
                TypewriterPhase::Waiting { until } if now >= until => {
                    text_dirty = true;
                    self.phase = TypewriterPhase::Typing {
                        revealed: 0,
                        next_at: until,
                    };
                }
                TypewriterPhase::Typing { revealed, next_at } if now >= next_at => {
                    if revealed < self.chars.len() {
                        text_dirty = true;
                        self.phase = TypewriterPhase::Typing {
                            revealed: revealed + 1,
                            next_at: next_at.plus_millis(self.settings.char_delay_ms),
                        };
                    } else {
                        self.phase = TypewriterPhase::Holding {
                            until: next_at.plus_millis(self.settings.cursor_hide_delay_ms),
                        };
                    }
                }
                TypewriterPhase::Holding { until } if now >= until => {
                    if text_dirty {
                        patches.push(self.text_patch());
                        text_dirty = false;
                    }
                    patches.push(ViewPatch::style(
                        Target::TypewriterCursor,
                        StyleProperty::Opacity,
                        "0",
                    ));
                    self.phase = TypewriterPhase::Done;
                }
                _ => break,
            }
        }

        if text_dirty {
            patches.push(self.text_patch());
        }
        patches
    }

    fn text_patch(&self) -> ViewPatch {
        let shown: String = self.chars[..self.revealed()].iter().collect();
        ViewPatch::text(Target::TypewriterName, shown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RotatorPhase {
    Idle,
    Scheduled {
        next_cycle: Timestamp,
    },
    Fading {
        swap_at: Timestamp,
        next_cycle: Timestamp,
    },
}

/// A label that fades out, swaps to the next text, and fades back in on a fixed interval.
#[derive(Debug, Clone)]
pub struct LabelRotator {
    target: Target,
    settings: RotatorSettings,
    next_index: usize,
    phase: RotatorPhase,
}

impl LabelRotator {
    pub fn new(target: Target, settings: RotatorSettings) -> Result<Self, PortfolioError> {
        if settings.labels.is_empty() {
            return Err(PortfolioError::InvalidConfig(format!(
                "rotating label {:?} has no labels",
                target
            )));
        }
        if settings.interval_ms == 0 {
            return Err(PortfolioError::InvalidConfig(format!(
                "rotating label {:?} needs a non-zero interval",
                target
            )));
        }

        Ok(LabelRotator {
            target,
            next_index: settings.next_index % settings.labels.len(),
            settings,
            phase: RotatorPhase::Idle,
        })
    }

    pub fn is_running(&self) -> bool {
        self.phase != RotatorPhase::Idle
    }

    /// Index of the label the next swap will show.
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Begin cycling. The first fade starts one interval after the initial delay.
    pub fn start(&mut self, now: Timestamp) -> Vec<ViewPatch> {
        if self.is_running() {
            return Vec::new();
        }

        self.phase = RotatorPhase::Scheduled {
            next_cycle: now
                .plus_millis(self.settings.initial_delay_ms)
                .plus_millis(self.settings.interval_ms),
        };

        self.settings
            .setup_transition
            .iter()
            .map(|t| ViewPatch::style(self.target, StyleProperty::Transition, t.clone()))
            .collect()
    }

    pub fn advance(&mut self, now: Timestamp) -> Vec<ViewPatch> {
        let mut patches = Vec::new();
        let interval = self.settings.interval_ms;

        loop {
            match self.phase {
                RotatorPhase::Scheduled { next_cycle } if now >= next_cycle => {
                    // Skip cycles missed while the page was throttled.
                    let missed = now.millis_since(next_cycle) / interval;
                    let cycle = next_cycle.plus_millis(missed * interval);

                    if let Some(transition) = &self.settings.cycle_transition {
                        patches.push(ViewPatch::style(
                            self.target,
                            StyleProperty::Transition,
                            transition.clone(),
                        ));
                    }
                    patches.push(ViewPatch::style(self.target, StyleProperty::Opacity, "0"));
                    patches.push(ViewPatch::style(
                        self.target,
                        StyleProperty::Transform,
                        "translateY(20px)",
                    ));
                    self.phase = RotatorPhase::Fading {
                        swap_at: cycle.plus_millis(self.settings.fade_ms),
                        next_cycle: cycle.plus_millis(interval),
                    };
                }
                RotatorPhase::Fading {
                    swap_at,
                    next_cycle,
                } if now >= swap_at => {
                    let label = self.settings.labels[self.next_index].clone();
                    patches.push(ViewPatch::text(self.target, label));
                    patches.push(ViewPatch::style(self.target, StyleProperty::Opacity, "1"));
                    patches.push(ViewPatch::style(
                        self.target,
                        StyleProperty::Transform,
                        "translateY(0)",
                    ));
                    self.next_index = (self.next_index + 1) % self.settings.labels.len();
                    self.phase = RotatorPhase::Scheduled { next_cycle };
                }
                _ => break,
            }
        }

        patches
    }
}
