// Scroll-driven page chrome: active menu entry, header style, scroll-to-top button.

use crate::types::*;

/// Index of the section containing `probe`. The last match wins, like a forward sweep.
pub fn section_at(probe: f64, sections: &[SectionBounds]) -> Option<usize> {
    sections.iter().rposition(|section| section.contains(probe))
}

/// Tracks what the page chrome currently shows so only changes are emitted.
#[derive(Debug, Clone)]
pub struct ScrollHighlighter {
    settings: ScrollSettings,
    menu: Vec<MenuEntry>,
    active_menu: Option<usize>,
    menu_synced: bool,
    header_scrolled: bool,
    scroll_top_visible: bool,
}

impl ScrollHighlighter {
    pub fn new(settings: ScrollSettings, menu: Vec<MenuEntry>) -> Self {
        ScrollHighlighter {
            settings,
            menu,
            active_menu: None,
            menu_synced: false,
            header_scrolled: false,
            scroll_top_visible: false,
        }
    }

    pub fn active_menu(&self) -> Option<usize> {
        self.active_menu
    }

    pub fn header_scrolled(&self) -> bool {
        self.header_scrolled
    }

    pub fn scroll_top_visible(&self) -> bool {
        self.scroll_top_visible
    }

    /// Re-evaluate the chrome for a new scroll position.
    pub fn update(&mut self, scroll_y: f64, sections: &[SectionBounds]) -> Vec<ViewPatch> {
        let mut patches = Vec::new();

        // Outside every section the previous highlight stays.
        if let Some(section) = section_at(scroll_y + self.settings.probe_offset, sections) {
            let next = self
                .menu
                .get(section)
                .filter(|entry| !entry.external)
                .map(|_| section);
            self.highlight(next, &mut patches);
        }

        let scrolled = scroll_y > self.settings.header_offset;
        if scrolled != self.header_scrolled {
            self.header_scrolled = scrolled;
            patches.push(ViewPatch::class(Target::Header, Class::Scrolled, scrolled));
        }

        let visible = scroll_y > self.settings.scroll_top_offset;
        if visible != self.scroll_top_visible {
            self.scroll_top_visible = visible;
            patches.push(ViewPatch::class(Target::ScrollToTop, Class::Visible, visible));
        }

        patches
    }

    fn highlight(&mut self, next: Option<usize>, patches: &mut Vec<ViewPatch>) {
        if !self.menu_synced {
            // First match: clear whatever the markup shipped with.
            self.menu_synced = true;
            for (index, entry) in self.menu.iter().enumerate() {
                if !entry.external && Some(index) != next {
                    patches.push(ViewPatch::class(Target::MenuItem(index), Class::Active, false));
                }
            }
        } else if next == self.active_menu {
            return;
        } else if let Some(previous) = self.active_menu {
            patches.push(ViewPatch::class(
                Target::MenuItem(previous),
                Class::Active,
                false,
            ));
        }

        if let Some(index) = next {
            patches.push(ViewPatch::class(Target::MenuItem(index), Class::Active, true));
        }
        self.active_menu = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Vec<MenuEntry> {
        vec![
            MenuEntry::internal("#home"),
            MenuEntry::internal("#about"),
            MenuEntry::external("https://github.com/"),
            MenuEntry::internal("#contact"),
        ]
    }

    fn sections() -> Vec<SectionBounds> {
        vec![
            SectionBounds::new(0.0, 800.0),
            SectionBounds::new(800.0, 600.0),
            SectionBounds::new(1400.0, 600.0),
            SectionBounds::new(2000.0, 700.0),
        ]
    }

    #[test]
    fn section_lookup_uses_half_open_bounds() {
        assert_eq!(section_at(799.0, &sections()), Some(0));
        assert_eq!(section_at(800.0, &sections()), Some(1));
        assert_eq!(section_at(5000.0, &sections()), None);
    }

    #[test]
    fn first_update_clears_other_internal_entries() {
        let mut highlighter = ScrollHighlighter::new(ScrollSettings::default(), menu());
        let patches = highlighter.update(0.0, &sections());
        assert_eq!(
            patches,
            vec![
                ViewPatch::class(Target::MenuItem(1), Class::Active, false),
                ViewPatch::class(Target::MenuItem(3), Class::Active, false),
                ViewPatch::class(Target::MenuItem(0), Class::Active, true),
            ]
        );
        assert_eq!(highlighter.active_menu(), Some(0));
    }

    #[test]
    fn probe_is_offset_below_scroll_position() {
        let mut highlighter = ScrollHighlighter::new(ScrollSettings::default(), menu());
        highlighter.update(0.0, &sections());

        // 700 + 100 lands in the second section.
        let patches = highlighter.update(700.0, &sections());
        assert!(patches.contains(&ViewPatch::class(Target::MenuItem(0), Class::Active, false)));
        assert!(patches.contains(&ViewPatch::class(Target::MenuItem(1), Class::Active, true)));
        assert_eq!(highlighter.active_menu(), Some(1));
    }

    #[test]
    fn external_entries_are_never_highlighted() {
        let mut highlighter = ScrollHighlighter::new(ScrollSettings::default(), menu());
        highlighter.update(700.0, &sections());
        let patches = highlighter.update(1400.0, &sections());
        assert!(patches.contains(&ViewPatch::class(Target::MenuItem(1), Class::Active, false)));
        assert!(!patches
            .iter()
            .any(|p| matches!(p, ViewPatch::ToggleClass { target: Target::MenuItem(2), .. })));
        assert_eq!(highlighter.active_menu(), None);
    }

    #[test]
    fn highlight_survives_gap_between_sections() {
        let mut highlighter = ScrollHighlighter::new(ScrollSettings::default(), menu());
        highlighter.update(2000.0, &sections());
        assert_eq!(highlighter.active_menu(), Some(3));
        highlighter.update(9000.0, &sections());
        assert_eq!(highlighter.active_menu(), Some(3));
    }

    #[test]
    fn header_and_scroll_top_thresholds() {
        let mut highlighter = ScrollHighlighter::new(ScrollSettings::default(), vec![]);
        assert!(highlighter.update(50.0, &[]).is_empty());

        let patches = highlighter.update(51.0, &[]);
        assert_eq!(
            patches,
            vec![ViewPatch::class(Target::Header, Class::Scrolled, true)]
        );

        let patches = highlighter.update(501.0, &[]);
        assert_eq!(
            patches,
            vec![ViewPatch::class(Target::ScrollToTop, Class::Visible, true)]
        );

        let patches = highlighter.update(0.0, &[]);
        assert_eq!(patches.len(), 2);
        assert!(!highlighter.header_scrolled());
        assert!(!highlighter.scroll_top_visible());
    }

    #[test]
    fn unchanged_position_emits_nothing() {
        let mut highlighter = ScrollHighlighter::new(ScrollSettings::default(), menu());
        highlighter.update(900.0, &sections());
        assert!(highlighter.update(910.0, &sections()).is_empty());
    }
}
