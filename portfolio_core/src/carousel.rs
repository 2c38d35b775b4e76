// Coverflow view-model: selected index, navigation lock, and per-item placement.
// Layout math is pure; patches are produced separately and applied by a Surface.

use tracing::debug;

use crate::error::PortfolioError;
use crate::types::*;

/// One carousel entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselItem {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub load_state: LoadState,
}

impl From<ItemConfig> for CarouselItem {
    fn from(config: ItemConfig) -> Self {
        CarouselItem {
            title: config.title,
            description: config.description,
            image: config.image,
            load_state: LoadState::Pending,
        }
    }
}

/// Computed placement of one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemLayout {
    pub translate_x: f64,
    pub translate_z: f64,
    pub rotate_y: f64,
    pub scale: f64,
    pub opacity: f64,
    pub z_index: i32,
    pub active: bool,
}

impl ItemLayout {
    /// CSS `transform` value for this placement.
    pub fn css_transform(&self) -> String {
        format!(
            "translateX({}px) translateZ({}px) rotateY({}deg) scale({})",
            self.translate_x, self.translate_z, self.rotate_y, self.scale
        )
    }
}

/// Signed shortest circular distance from `current` to `index` over `len` items.
pub fn circular_offset(index: usize, current: usize, len: usize) -> isize {
    let len_i = len as isize;
    let half = len as f64 / 2.0;
    let mut offset = index as isize - current as isize;

    if offset as f64 > half {
        offset -= len_i;
    } else if (offset as f64) < -half {
        offset += len_i;
    }

    offset
}

/// Placement for an item `offset` positions away from the centre.
pub fn layout_for_offset(offset: isize, geometry: &CoverflowGeometry) -> ItemLayout {
    let abs_offset = offset.unsigned_abs();
    let abs = abs_offset as f64;
    let sign = offset.signum() as f64;

    let mut translate_x = offset as f64 * geometry.spacing_x;
    let translate_z = -abs * geometry.depth_step;
    let rotate_y = -sign * (abs * geometry.rotation_step).min(geometry.max_rotation);
    let mut opacity = 1.0 - abs * geometry.opacity_step;
    let scale = 1.0 - abs * geometry.scale_step;

    // Far items are parked offscreen instead of piling up behind the neighbours.
    if abs_offset > geometry.visible_radius {
        opacity = 0.0;
        translate_x = sign * geometry.offscreen_x;
    }

    ItemLayout {
        translate_x: no_negative_zero(translate_x),
        translate_z: no_negative_zero(translate_z),
        rotate_y: no_negative_zero(rotate_y),
        scale,
        opacity,
        z_index: geometry.base_z_index - abs_offset as i32,
        active: offset == 0,
    }
}

fn no_negative_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

/// Carousel state: current index, transition lock, and the derived layout.
#[derive(Debug, Clone)]
pub struct Carousel {
    items: Vec<CarouselItem>,
    geometry: CoverflowGeometry,
    lock_policy: LockPolicy,
    current_index: usize,
    locked_at: Option<Timestamp>,
    layout: Vec<ItemLayout>,
}

impl Carousel {
    pub fn new(config: CarouselConfig) -> Result<Self, PortfolioError> {
        let len = config.items.len();
        if len == 0 {
            return Err(PortfolioError::InvalidConfig(
                "carousel needs at least one item".to_string(),
            ));
        }

        let current_index = config.initial_index.unwrap_or(len / 2);
        if current_index >= len {
            return Err(PortfolioError::InvalidIndex {
                index: current_index,
                len,
            });
        }

        let mut carousel = Carousel {
            items: config.items.into_iter().map(CarouselItem::from).collect(),
            geometry: config.geometry,
            lock_policy: config.lock,
            current_index,
            locked_at: None,
            layout: Vec::with_capacity(len),
        };
        // The first paint does not lock navigation.
        carousel.recompute_layout();
        Ok(carousel)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_item(&self) -> &CarouselItem {
        &self.items[self.current_index]
    }

    pub fn items(&self) -> &[CarouselItem] {
        &self.items
    }

    pub fn layout(&self) -> &[ItemLayout] {
        &self.layout
    }

    /// Dot states, one per item. Exactly one is `true`.
    pub fn dots(&self) -> Vec<bool> {
        (0..self.len()).map(|i| i == self.current_index).collect()
    }

    pub fn is_animating(&self) -> bool {
        self.locked_at.is_some()
    }

    /// Step one item in `direction`, wrapping at both ends.
    /// Returns `false` without touching anything while a transition holds the lock.
    pub fn navigate(&mut self, direction: Direction, now: Timestamp) -> bool {
        if self.is_animating() {
            debug!(?direction, "navigation dropped, transition in progress");
            return false;
        }

        let len = self.len() as isize;
        let next = (self.current_index as isize + direction.step()).rem_euclid(len);
        self.current_index = next as usize;
        debug!(index = self.current_index, ?direction, "carousel navigated");

        self.engage_lock(now);
        self.recompute_layout();
        true
    }

    /// Jump straight to `target`.
    /// Returns `Ok(false)` when locked or already there; out-of-range targets are rejected.
    pub fn go_to_index(&mut self, target: usize, now: Timestamp) -> Result<bool, PortfolioError> {
        self.check_index(target)?;
        if self.is_animating() || target == self.current_index {
            return Ok(false);
        }

        self.current_index = target;
        debug!(index = target, "carousel jumped");

        self.engage_lock(now);
        self.recompute_layout();
        Ok(true)
    }

    /// Release a timed lock once its duration has elapsed.
    pub fn release_expired_lock(&mut self, now: Timestamp) -> bool {
        match (self.lock_policy, self.locked_at) {
            (LockPolicy::Timed { duration_ms }, Some(since))
                if now.millis_since(since) >= duration_ms =>
            {
                self.locked_at = None;
                true
            }
            _ => false,
        }
    }

    /// Release the lock when the host reports the end of the CSS transition.
    pub fn on_transition_end(&mut self) -> bool {
        if self.lock_policy == LockPolicy::TransitionEnd && self.locked_at.is_some() {
            self.locked_at = None;
            true
        } else {
            false
        }
    }

    pub fn mark_loaded(&mut self, index: usize) -> Result<(), PortfolioError> {
        self.check_index(index)?;
        self.items[index].load_state = LoadState::Loaded;
        Ok(())
    }

    pub fn mark_failed(&mut self, index: usize) -> Result<(), PortfolioError> {
        self.check_index(index)?;
        self.items[index].load_state = LoadState::Failed;
        Ok(())
    }

    /// Patches that bring the page in line with the current layout.
    pub fn patches(&self) -> Vec<ViewPatch> {
        let mut patches = Vec::with_capacity(self.len() * 3 + 2);

        for (index, layout) in self.layout.iter().enumerate() {
            patches.push(ViewPatch::ItemTransform {
                index,
                transform: layout.css_transform(),
                opacity: layout.opacity,
                z_index: layout.z_index,
            });
            patches.push(ViewPatch::class(Target::Item(index), Class::Active, layout.active));
        }

        for (index, active) in self.dots().into_iter().enumerate() {
            patches.push(ViewPatch::class(Target::Dot(index), Class::Active, active));
        }

        let current = self.current_item();
        patches.push(ViewPatch::text(Target::CaptionTitle, current.title.clone()));
        patches.push(ViewPatch::text(
            Target::CaptionDescription,
            current.description.clone(),
        ));

        patches
    }

    fn check_index(&self, index: usize) -> Result<(), PortfolioError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(PortfolioError::InvalidIndex {
                index,
                len: self.len(),
            })
        }
    }

    fn engage_lock(&mut self, now: Timestamp) {
        if self.lock_policy != LockPolicy::Disabled {
            self.locked_at = Some(now);
        }
    }

    fn recompute_layout(&mut self) {
        let len = self.len();
        let current = self.current_index;
        let geometry = self.geometry;
        self.layout = (0..len)
            .map(|i| layout_for_offset(circular_offset(i, current, len), &geometry))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn carousel_with(len: usize, initial: usize, lock: LockPolicy) -> Carousel {
        let items = (0..len)
            .map(|i| ItemConfig::new(&format!("Item {}", i), ""))
            .collect();
        Carousel::new(CarouselConfig {
            items,
            initial_index: Some(initial),
            geometry: CoverflowGeometry::default(),
            lock,
        })
        .expect("valid carousel")
    }

    fn ts(ms: u64) -> Timestamp {
        Timestamp::from_micros(ms * 1000)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn stock_page_starts_at_middle_item() {
        let carousel = Carousel::new(CarouselConfig::default()).unwrap();
        assert_eq!(carousel.current_index(), 3);
        assert_eq!(carousel.current_item().title, "Ocean Sunset");
        assert!(!carousel.is_animating());
    }

    #[test]
    fn rejects_empty_and_out_of_range_config() {
        let empty = CarouselConfig {
            items: vec![],
            ..Default::default()
        };
        assert!(matches!(
            Carousel::new(empty),
            Err(PortfolioError::InvalidConfig(_))
        ));

        let bad_initial = CarouselConfig {
            initial_index: Some(7),
            ..Default::default()
        };
        assert_eq!(
            Carousel::new(bad_initial).unwrap_err(),
            PortfolioError::InvalidIndex { index: 7, len: 7 }
        );
    }

    #[test]
    fn navigate_forward_from_three_of_seven() {
        let mut carousel = carousel_with(7, 3, LockPolicy::Disabled);
        assert!(carousel.navigate(Direction::Forward, ts(0)));
        assert_eq!(carousel.current_index(), 4);

        // Item 0: offset -4 wraps to 3.
        let item0 = carousel.layout()[0];
        assert_eq!(circular_offset(0, 4, 7), 3);
        assert!(close(item0.opacity, 0.4));
        assert!(close(item0.translate_x, 660.0));
        assert!(close(item0.translate_z, -600.0));
        assert!(close(item0.rotate_y, -60.0));
        assert!(close(item0.scale, 0.7));
        assert_eq!(item0.z_index, 97);
        assert!(!item0.active);
        assert!(carousel.layout()[4].active);
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let mut carousel = carousel_with(5, 0, LockPolicy::Disabled);
        carousel.navigate(Direction::Backward, ts(0));
        assert_eq!(carousel.current_index(), 4);
        carousel.navigate(Direction::Forward, ts(0));
        assert_eq!(carousel.current_index(), 0);
    }

    #[test]
    fn centre_item_layout_is_neutral() {
        let layout = layout_for_offset(0, &CoverflowGeometry::default());
        assert_eq!(layout.translate_x, 0.0);
        assert_eq!(layout.rotate_y, 0.0);
        assert!(layout.rotate_y.is_sign_positive());
        assert_eq!(layout.opacity, 1.0);
        assert_eq!(layout.scale, 1.0);
        assert_eq!(layout.z_index, 100);
        assert_eq!(
            layout.css_transform(),
            "translateX(0px) translateZ(0px) rotateY(0deg) scale(1)"
        );
    }

    #[test]
    fn neighbours_rotate_towards_centre() {
        let geometry = CoverflowGeometry::default();
        assert!(close(layout_for_offset(1, &geometry).rotate_y, -60.0));
        assert!(close(layout_for_offset(-1, &geometry).rotate_y, 60.0));
        assert!(close(layout_for_offset(-2, &geometry).translate_x, -440.0));
    }

    #[test]
    fn timed_lock_blocks_until_duration_elapses() {
        let mut carousel = carousel_with(7, 3, LockPolicy::Timed { duration_ms: 600 });
        assert!(carousel.navigate(Direction::Forward, ts(1000)));
        assert!(carousel.is_animating());

        assert!(!carousel.navigate(Direction::Forward, ts(1100)));
        assert_eq!(carousel.go_to_index(0, ts(1100)), Ok(false));
        assert_eq!(carousel.current_index(), 4);

        assert!(!carousel.release_expired_lock(ts(1599)));
        assert!(carousel.release_expired_lock(ts(1600)));
        assert!(carousel.navigate(Direction::Forward, ts(1600)));
        assert_eq!(carousel.current_index(), 5);
    }

    #[test]
    fn transition_end_lock_waits_for_host() {
        let mut carousel = carousel_with(7, 3, LockPolicy::TransitionEnd);
        carousel.navigate(Direction::Backward, ts(0));
        assert!(!carousel.release_expired_lock(ts(60_000)));
        assert!(carousel.is_animating());
        assert!(carousel.on_transition_end());
        assert!(!carousel.is_animating());
        assert!(!carousel.on_transition_end());
    }

    #[test]
    fn go_to_current_index_is_noop() {
        let mut carousel = carousel_with(7, 3, LockPolicy::default());
        let before = carousel.layout().to_vec();
        assert_eq!(carousel.go_to_index(3, ts(0)), Ok(false));
        assert!(!carousel.is_animating());
        assert_eq!(carousel.layout(), &before[..]);
    }

    #[test]
    fn go_to_index_rejects_out_of_range() {
        let mut carousel = carousel_with(7, 3, LockPolicy::default());
        assert_eq!(
            carousel.go_to_index(7, ts(0)),
            Err(PortfolioError::InvalidIndex { index: 7, len: 7 })
        );
        assert_eq!(carousel.current_index(), 3);
        assert!(!carousel.is_animating());
    }

    #[test]
    fn image_states_are_tracked() {
        let mut carousel = carousel_with(3, 1, LockPolicy::default());
        carousel.mark_loaded(0).unwrap();
        carousel.mark_failed(2).unwrap();
        assert_eq!(carousel.items()[0].load_state, LoadState::Loaded);
        assert_eq!(carousel.items()[1].load_state, LoadState::Pending);
        assert_eq!(carousel.items()[2].load_state, LoadState::Failed);
        assert!(carousel.mark_loaded(3).is_err());
    }

    #[test]
    fn patches_cover_items_dots_and_caption() {
        let carousel = Carousel::new(CarouselConfig::default()).unwrap();
        let patches = carousel.patches();
        let transforms = patches
            .iter()
            .filter(|p| matches!(p, ViewPatch::ItemTransform { .. }))
            .count();
        assert_eq!(transforms, 7);
        assert!(patches.contains(&ViewPatch::class(Target::Dot(3), Class::Active, true)));
        assert!(patches.contains(&ViewPatch::class(Target::Dot(2), Class::Active, false)));
        assert!(patches.contains(&ViewPatch::text(Target::CaptionTitle, "Ocean Sunset")));
    }

    mod property_tests {
        use super::*;

        proptest! {
            /// Exactly one item and one dot are active, and they agree.
            #[test]
            fn single_active_item_and_dot(
                len in 1usize..20,
                start in 0usize..20,
                steps in prop::collection::vec((any::<bool>(), 0usize..20), 0..12)
            ) {
                let mut carousel = carousel_with(len, start % len, LockPolicy::Disabled);
                for (forward, jump) in steps {
                    if forward {
                        carousel.navigate(Direction::Forward, ts(0));
                    } else {
                        let _ = carousel.go_to_index(jump % len, ts(0));
                    }
                    let active: Vec<usize> = carousel.layout().iter().enumerate()
                        .filter(|(_, l)| l.active).map(|(i, _)| i).collect();
                    let dots: Vec<usize> = carousel.dots().iter().enumerate()
                        .filter(|(_, d)| **d).map(|(i, _)| i).collect();
                    prop_assert_eq!(active.len(), 1);
                    prop_assert_eq!(&active, &dots);
                    prop_assert_eq!(active[0], carousel.current_index());
                }
            }

            /// Navigating forward N times returns to the start.
            #[test]
            fn forward_navigation_is_cyclic(len in 1usize..30, start in 0usize..30) {
                let start = start % len;
                let mut carousel = carousel_with(len, start, LockPolicy::Disabled);
                for _ in 0..len {
                    prop_assert!(carousel.navigate(Direction::Forward, ts(0)));
                }
                prop_assert_eq!(carousel.current_index(), start);
            }

            /// Offsets take the shortest way around the ring.
            #[test]
            fn offset_is_bounded_by_half_ring(len in 1usize..50, a in 0usize..50, b in 0usize..50) {
                let (index, current) = (a % len, b % len);
                let offset = circular_offset(index, current, len) as f64;
                let half = len as f64 / 2.0;
                prop_assert!(offset >= -half && offset <= half);
                prop_assert_eq!(
                    (current as isize + offset as isize).rem_euclid(len as isize) as usize,
                    index
                );
            }

            /// Items beyond the visible radius are transparent and parked at ±offscreen_x.
            #[test]
            fn far_items_are_parked_offscreen(offset in -40isize..40) {
                prop_assume!(offset.unsigned_abs() > 3);
                let layout = layout_for_offset(offset, &CoverflowGeometry::default());
                prop_assert_eq!(layout.opacity, 0.0);
                prop_assert_eq!(layout.translate_x, offset.signum() as f64 * 800.0);
                prop_assert!(layout.rotate_y.abs() <= 60.0);
            }
        }
    }
}
