// Page controller: owns every component and routes events and clock ticks to them.

use tracing::{debug, trace, warn};

use crate::autoplay::AutoplayController;
use crate::carousel::Carousel;
use crate::error::PortfolioError;
use crate::gesture::SwipeRecognizer;
use crate::menu::MobileMenu;
use crate::scroll::ScrollHighlighter;
use crate::text::{LabelRotator, Typewriter};
use crate::types::*;

/// All interactive state of the page.
#[derive(Debug, Clone)]
pub struct Page {
    carousel: Carousel,
    autoplay: AutoplayController,
    swipe: SwipeRecognizer,
    scroll: ScrollHighlighter,
    menu: MobileMenu,
    typewriter: Typewriter,
    roles: LabelRotator,
    stats: Vec<LabelRotator>,
    reveal_threshold: f32,
    revealed: bool,
    stats_started: bool,
    form_message: String,
}

impl Page {
    pub fn new(config: PortfolioConfig) -> Result<Self, PortfolioError> {
        let stats = config
            .stats
            .into_iter()
            .enumerate()
            .map(|(i, settings)| LabelRotator::new(Target::StatLabel(i), settings))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            carousel: Carousel::new(config.carousel)?,
            autoplay: AutoplayController::new(config.autoplay),
            swipe: SwipeRecognizer::new(config.swipe),
            scroll: ScrollHighlighter::new(config.scroll, config.menu.clone()),
            menu: MobileMenu::new(config.menu),
            typewriter: Typewriter::new(config.typewriter),
            roles: LabelRotator::new(Target::RoleLabel, config.roles)?,
            stats,
            reveal_threshold: config.reveal_threshold,
            revealed: false,
            stats_started: false,
            form_message: config.form_message,
        })
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn autoplay(&self) -> &AutoplayController {
        &self.autoplay
    }

    pub fn menu(&self) -> &MobileMenu {
        &self.menu
    }

    pub fn scroll(&self) -> &ScrollHighlighter {
        &self.scroll
    }

    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    /// Whether the about header animations have been triggered.
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// First paint: carousel layout, dots, caption, autoplay icon.
    pub fn initial_patches(&self) -> Vec<ViewPatch> {
        let mut patches = self.carousel.patches();
        patches.extend(self.autoplay.icon_patches());
        patches
    }

    /// Process a batch in order. A failing event is skipped and logged; the patches of every
    /// other event are kept, so the host always sees each committed state change.
    pub fn handle_batch(&mut self, batch: &EventBatch) -> Vec<ViewPatch> {
        let mut patches = Vec::new();
        let mut skipped = 0usize;
        for event in &batch.events {
            match self.handle(event) {
                Ok(more) => patches.extend(more),
                Err(err) => {
                    skipped += 1;
                    warn!(event = ?event.event_type, %err, "event skipped");
                }
            }
        }
        trace!(
            events = batch.events.len(),
            skipped,
            patches = patches.len(),
            "batch handled"
        );
        patches
    }

    /// Handle one event. On error no state has changed.
    pub fn handle(&mut self, event: &InputEvent) -> Result<Vec<ViewPatch>, PortfolioError> {
        let now = event.timestamp;
        self.carousel.release_expired_lock(now);

        let mut patches = Vec::new();
        match &event.event_type {
            EventType::Navigate { direction } => {
                self.user_took_over(&mut patches);
                self.navigate(*direction, now, &mut patches);
            }
            EventType::ItemClick { index } | EventType::DotClick { index } => {
                let moved = self.carousel.go_to_index(*index, now)?;
                self.user_took_over(&mut patches);
                if moved {
                    patches.extend(self.carousel.patches());
                }
            }
            EventType::TouchStart { x, y } => self.swipe.touch_start(*x, *y),
            EventType::TouchMove { x, y } => self.swipe.touch_move(*x, *y),
            EventType::TouchEnd { x, y } => {
                if let Some(direction) = self.swipe.touch_end(*x, *y) {
                    debug!(?direction, "swipe recognized");
                    self.user_took_over(&mut patches);
                    self.navigate(direction, now, &mut patches);
                }
            }
            EventType::TransitionEnd => {
                self.carousel.on_transition_end();
            }
            EventType::AutoplayToggle => {
                let playing = self.autoplay.toggle(now);
                debug!(playing, "autoplay toggled");
                patches.extend(self.autoplay.icon_patches());
            }
            EventType::ImageLoaded { index, src } => {
                self.image_event(*index, |c| c.mark_loaded(*index))?;
                patches.push(ViewPatch::class(
                    Target::Item(*index),
                    Class::ImageLoading,
                    false,
                ));
                patches.extend(reflection_patches(*index, src));
            }
            EventType::ImageFailed { index } => {
                self.image_event(*index, |c| c.mark_failed(*index))?;
                patches.push(ViewPatch::class(
                    Target::Item(*index),
                    Class::ImageLoading,
                    true,
                ));
            }
            EventType::Scroll { scroll_y, sections } => {
                patches.extend(self.scroll.update(*scroll_y, sections));
            }
            EventType::AboutHeaderVisibility { ratio } => {
                if !self.revealed && *ratio >= self.reveal_threshold {
                    debug!(ratio, "about header revealed");
                    self.revealed = true;
                    patches.push(ViewPatch::class(Target::AboutHeader, Class::AnimateIn, true));
                    self.typewriter.arm(now);
                    patches.extend(self.roles.start(now));
                }
            }
            EventType::MenuToggleClick => patches.extend(self.menu.toggle()),
            EventType::MenuItemClick { index } => {
                patches.extend(self.menu.entry_clicked(*index)?);
            }
            EventType::OutsideClick => patches.extend(self.menu.close()),
            EventType::LogoClick | EventType::ScrollTopClick => {
                patches.push(ViewPatch::ScrollTo { top: 0.0 });
            }
            EventType::FormSubmit => {
                patches.push(ViewPatch::Notify {
                    message: self.form_message.clone(),
                });
                patches.push(ViewPatch::ResetForm);
            }
        }

        Ok(patches)
    }

    /// Advance every clock-driven component to `now`.
    pub fn tick(&mut self, now: Timestamp) -> Vec<ViewPatch> {
        let mut patches = Vec::new();
        self.carousel.release_expired_lock(now);

        if !self.stats_started {
            self.stats_started = true;
            for stat in &mut self.stats {
                patches.extend(stat.start(now));
            }
        }

        if self.autoplay.poll(now) {
            self.navigate(Direction::Forward, now, &mut patches);
        }

        patches.extend(self.typewriter.advance(now));
        patches.extend(self.roles.advance(now));
        for stat in &mut self.stats {
            patches.extend(stat.advance(now));
        }

        if !patches.is_empty() {
            trace!(patches = patches.len(), "tick");
        }
        patches
    }

    fn navigate(&mut self, direction: Direction, now: Timestamp, patches: &mut Vec<ViewPatch>) {
        if self.carousel.navigate(direction, now) {
            patches.extend(self.carousel.patches());
        }
    }

    /// Manual navigation pauses autoplay.
    fn user_took_over(&mut self, patches: &mut Vec<ViewPatch>) {
        if self.autoplay.stop() {
            debug!("autoplay stopped by user interaction");
            patches.extend(self.autoplay.icon_patches());
        }
    }

    fn image_event(
        &mut self,
        index: usize,
        update: impl FnOnce(&mut Carousel) -> Result<(), PortfolioError>,
    ) -> Result<(), PortfolioError> {
        update(&mut self.carousel).map_err(|err| {
            warn!(index, %err, "image event for unknown item");
            err
        })
    }
}

fn reflection_patches(index: usize, src: &str) -> Vec<ViewPatch> {
    let target = Target::Reflection(index);
    let url = format!("url({})", src);
    vec![
        ViewPatch::style(target, StyleProperty::BgImageVar, url.clone()),
        ViewPatch::style(target, StyleProperty::BackgroundImage, url),
        ViewPatch::style(target, StyleProperty::BackgroundSize, "cover"),
        ViewPatch::style(target, StyleProperty::BackgroundPosition, "center"),
    ]
}
