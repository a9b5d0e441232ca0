//! The single main content region

use crate::dashboard::markup::Markup;
use crate::dashboard::registry::ScreenId;

/// Holds the one mounted screen. Mounting replaces the previous screen in a
/// single assignment, so there is never a moment with two screens or a
/// half-applied fragment.
#[derive(Debug, Default)]
pub struct ContentRegion {
    mounted: Option<(ScreenId, Markup)>,
    mount_generation: u64,
}

impl ContentRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Option<ScreenId> {
        self.mounted.as_ref().map(|(screen, _)| *screen)
    }

    pub fn markup(&self) -> Option<&Markup> {
        self.mounted.as_ref().map(|(_, markup)| markup)
    }

    /// Incremented on every mount, including re-mounts of the same screen
    pub fn mount_generation(&self) -> u64 {
        self.mount_generation
    }

    pub fn is_visible(&self, screen: ScreenId) -> bool {
        self.screen() == Some(screen)
    }

    /// All screens currently shown; never more than one
    pub fn visible_screens(&self) -> Vec<ScreenId> {
        ScreenId::ALL.into_iter().filter(|s| self.is_visible(*s)).collect()
    }

    /// Replace the mounted screen, returning the new mount generation
    pub(crate) fn swap(&mut self, screen: ScreenId, markup: Markup) -> u64 {
        self.mount_generation += 1;
        self.mounted = Some((screen, markup));
        self.mount_generation
    }

    /// Inner HTML of a panel inside the mounted screen
    pub fn panel(&self, element_id: &str) -> Option<&str> {
        self.markup().and_then(|markup| markup.element_inner(element_id))
    }

    /// Overwrite one panel of the mounted screen. False when nothing is mounted or the panel is absent.
    pub fn replace_panel(&mut self, element_id: &str, html: &str) -> bool {
        match self.mounted.as_mut() {
            Some((_, markup)) => markup.set_element_inner(element_id, html),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_replaces_previous_screen() {
        let mut region = ContentRegion::new();
        assert!(region.visible_screens().is_empty());

        let first = region.swap(ScreenId::Home, Markup::new("<h1>Home</h1>"));
        let second = region.swap(ScreenId::Courses, Markup::new("<h1>Courses</h1>"));

        assert_eq!(region.visible_screens(), vec![ScreenId::Courses]);
        assert!(second > first);
        assert_eq!(region.markup().map(Markup::as_str), Some("<h1>Courses</h1>"));
    }

    #[test]
    fn test_remount_same_screen_bumps_generation() {
        let mut region = ContentRegion::new();
        let a = region.swap(ScreenId::Home, Markup::new("<p>a</p>"));
        let b = region.swap(ScreenId::Home, Markup::new("<p>b</p>"));
        assert_eq!(b, a + 1);
    }

    #[test]
    fn test_replace_panel() {
        let mut region = ContentRegion::new();
        assert!(!region.replace_panel("x", "y"));

        region.swap(ScreenId::LectureAnalysis, Markup::new(r#"<div id="reflections-panel"><p>all</p></div>"#));
        assert!(region.replace_panel("reflections-panel", "<p>one</p>"));
        assert_eq!(region.panel("reflections-panel"), Some("<p>one</p>"));
    }
}
