// Mobile navigation toggle and in-page anchor scrolling.

use crate::error::PortfolioError;
use crate::types::*;

/// Open/closed state of the collapsible navigation menu.
#[derive(Debug, Clone)]
pub struct MobileMenu {
    entries: Vec<MenuEntry>,
    open: bool,
}

impl MobileMenu {
    pub fn new(entries: Vec<MenuEntry>) -> Self {
        MobileMenu {
            entries,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> Vec<ViewPatch> {
        self.set_open(!self.open)
    }

    /// Close the menu; emits nothing when it is already closed.
    pub fn close(&mut self) -> Vec<ViewPatch> {
        if self.open {
            self.set_open(false)
        } else {
            Vec::new()
        }
    }

    /// A menu entry was clicked. Internal entries close the menu; anchors scroll smoothly.
    pub fn entry_clicked(&mut self, index: usize) -> Result<Vec<ViewPatch>, PortfolioError> {
        let entry = self
            .entries
            .get(index)
            .cloned()
            .ok_or(PortfolioError::InvalidIndex {
                index,
                len: self.entries.len(),
            })?;

        let mut patches = if entry.external {
            Vec::new()
        } else {
            self.close()
        };

        if let Some(anchor) = entry.anchor() {
            patches.push(ViewPatch::ScrollIntoView {
                anchor: anchor.to_string(),
            });
        }

        Ok(patches)
    }

    fn set_open(&mut self, open: bool) -> Vec<ViewPatch> {
        self.open = open;
        vec![
            ViewPatch::class(Target::MenuToggle, Class::Active, open),
            ViewPatch::class(Target::MainMenu, Class::Active, open),
        ]
    }
}
