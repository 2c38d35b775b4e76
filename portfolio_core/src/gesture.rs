// Touch swipe recognition for the carousel.

use crate::types::*;

/// Classify a finished touch as a swipe.
///
/// Dragging left (start right of end) moves forward. Horizontal travel must dominate
/// vertical travel and exceed `threshold`.
pub fn classify_swipe(start: (f32, f32), end: (f32, f32), threshold: f32) -> Option<Direction> {
    let diff_x = start.0 - end.0;
    let diff_y = start.1 - end.1;

    if diff_x.abs() > diff_y.abs() && diff_x.abs() > threshold {
        if diff_x > 0.0 {
            Some(Direction::Forward)
        } else {
            Some(Direction::Backward)
        }
    } else {
        None
    }
}

/// Captures one touch at a time.
#[derive(Debug, Clone)]
pub struct SwipeRecognizer {
    threshold: f32,
    start: Option<(f32, f32)>,
    last: Option<(f32, f32)>,
}

impl SwipeRecognizer {
    pub fn new(settings: SwipeSettings) -> Self {
        SwipeRecognizer {
            threshold: settings.threshold,
            start: None,
            last: None,
        }
    }

    pub fn touch_start(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
        self.last = Some((x, y));
    }

    pub fn touch_move(&mut self, x: f32, y: f32) {
        if self.start.is_some() {
            self.last = Some((x, y));
        }
    }

    /// Finish the touch. A touch end with no matching start is ignored.
    pub fn touch_end(&mut self, x: f32, y: f32) -> Option<Direction> {
        self.last = None;
        let start = self.start.take()?;
        classify_swipe(start, (x, y), self.threshold)
    }

    /// Latest known finger position of the touch in progress.
    pub fn current(&self) -> Option<(f32, f32)> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn left_drag_goes_forward() {
        let mut swipe = SwipeRecognizer::new(SwipeSettings::default());
        swipe.touch_start(200.0, 300.0);
        assert_eq!(swipe.touch_end(150.0, 300.0), Some(Direction::Forward));
    }

    #[test]
    fn right_drag_goes_backward() {
        assert_eq!(
            classify_swipe((100.0, 0.0), (160.0, 10.0), 30.0),
            Some(Direction::Backward)
        );
    }

    #[test]
    fn short_or_vertical_drags_are_ignored() {
        assert_eq!(classify_swipe((200.0, 0.0), (175.0, 0.0), 30.0), None);
        assert_eq!(classify_swipe((200.0, 0.0), (170.0, 0.0), 30.0), None);
        assert_eq!(classify_swipe((200.0, 0.0), (100.0, 200.0), 30.0), None);
    }

    #[test]
    fn end_without_start_is_ignored() {
        let mut swipe = SwipeRecognizer::new(SwipeSettings::default());
        assert_eq!(swipe.touch_end(0.0, 0.0), None);

        swipe.touch_start(300.0, 0.0);
        swipe.touch_move(250.0, 0.0);
        assert_eq!(swipe.current(), Some((250.0, 0.0)));
        assert_eq!(swipe.touch_end(100.0, 0.0), Some(Direction::Forward));
        assert_eq!(swipe.touch_end(0.0, 0.0), None);
    }

    proptest! {
        #[test]
        fn swipe_requires_dominant_horizontal_travel(
            sx in -500f32..500.0, sy in -500f32..500.0,
            ex in -500f32..500.0, ey in -500f32..500.0
        ) {
            let result = classify_swipe((sx, sy), (ex, ey), 30.0);
            let dx = sx - ex;
            let dy = sy - ey;
            if let Some(direction) = result {
                prop_assert!(dx.abs() > dy.abs() && dx.abs() > 30.0);
                prop_assert_eq!(direction == Direction::Forward, dx > 0.0);
            } else {
                prop_assert!(dx.abs() <= dy.abs() || dx.abs() <= 30.0);
            }
        }
    }
}
