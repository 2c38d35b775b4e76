// Applying patches: the seam between pure engine state and a rendering surface.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::PortfolioError;
use crate::types::*;

/// Something that can apply [`ViewPatch`]es, such as the live DOM or a test double.
pub trait Surface {
    fn apply(&mut self, patch: &ViewPatch) -> Result<(), PortfolioError>;

    /// Apply patches in order, stopping at the first failure.
    fn apply_all(&mut self, patches: &[ViewPatch]) -> Result<(), PortfolioError> {
        for patch in patches {
            self.apply(patch)?;
        }
        Ok(())
    }
}

/// Placement last written to an item.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedTransform {
    pub transform: String,
    pub opacity: f64,
    pub z_index: i32,
}

/// In-memory surface that keeps the resulting page state.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    classes: BTreeSet<(Target, Class)>,
    texts: BTreeMap<Target, String>,
    styles: BTreeMap<(Target, StyleProperty), String>,
    transforms: BTreeMap<usize, AppliedTransform>,
    scrolls: Vec<ViewPatch>,
    notifications: Vec<String>,
    form_resets: usize,
}

impl RecordingSurface {
    pub fn has_class(&self, target: Target, class: Class) -> bool {
        self.classes.contains(&(target, class))
    }

    pub fn text(&self, target: Target) -> Option<&str> {
        self.texts.get(&target).map(String::as_str)
    }

    pub fn style(&self, target: Target, property: StyleProperty) -> Option<&str> {
        self.styles.get(&(target, property)).map(String::as_str)
    }

    pub fn transform(&self, index: usize) -> Option<&AppliedTransform> {
        self.transforms.get(&index)
    }

    /// `ScrollTo` and `ScrollIntoView` requests, oldest first.
    pub fn scrolls(&self) -> &[ViewPatch] {
        &self.scrolls
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    pub fn form_resets(&self) -> usize {
        self.form_resets
    }
}

impl Surface for RecordingSurface {
    fn apply(&mut self, patch: &ViewPatch) -> Result<(), PortfolioError> {
        match patch {
            ViewPatch::ItemTransform {
                index,
                transform,
                opacity,
                z_index,
            } => {
                self.transforms.insert(
                    *index,
                    AppliedTransform {
                        transform: transform.clone(),
                        opacity: *opacity,
                        z_index: *z_index,
                    },
                );
            }
            ViewPatch::ToggleClass { target, class, on } => {
                if *on {
                    self.classes.insert((*target, *class));
                } else {
                    self.classes.remove(&(*target, *class));
                }
            }
            ViewPatch::SetText { target, text } => {
                self.texts.insert(*target, text.clone());
            }
            ViewPatch::SetStyle {
                target,
                property,
                value,
            } => {
                self.styles.insert((*target, *property), value.clone());
            }
            ViewPatch::ScrollTo { .. } | ViewPatch::ScrollIntoView { .. } => {
                self.scrolls.push(patch.clone());
            }
            ViewPatch::Notify { message } => self.notifications.push(message.clone()),
            ViewPatch::ResetForm => self.form_resets += 1,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_patches_win() {
        let mut surface = RecordingSurface::default();
        surface
            .apply_all(&[
                ViewPatch::class(Target::Header, Class::Scrolled, true),
                ViewPatch::text(Target::RoleLabel, "Computer Programmer"),
                ViewPatch::text(Target::RoleLabel, "IT Technician"),
                ViewPatch::class(Target::Header, Class::Scrolled, false),
            ])
            .unwrap();
        assert!(!surface.has_class(Target::Header, Class::Scrolled));
        assert_eq!(surface.text(Target::RoleLabel), Some("IT Technician"));
    }

    #[test]
    fn records_transforms_and_one_shot_effects() {
        let mut surface = RecordingSurface::default();
        surface
            .apply_all(&[
                ViewPatch::ItemTransform {
                    index: 0,
                    transform: "scale(1)".to_string(),
                    opacity: 1.0,
                    z_index: 100,
                },
                ViewPatch::ScrollTo { top: 0.0 },
                ViewPatch::Notify {
                    message: "thanks".to_string(),
                },
                ViewPatch::ResetForm,
            ])
            .unwrap();
        assert_eq!(surface.transform(0).map(|t| t.z_index), Some(100));
        assert_eq!(surface.scrolls().len(), 1);
        assert_eq!(surface.notifications(), &["thanks".to_string()]);
        assert_eq!(surface.form_resets(), 1);
    }
}
