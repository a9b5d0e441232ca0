//! Snapshot of the aggregate reflections panel

use crate::dashboard::content::ContentRegion;

pub const REFLECTIONS_PANEL: &str = "reflections-panel";
pub const REFLECTIONS_TITLE: &str = "reflections-title";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightSnapshot {
    pub html: String,
    pub title: String,
}

/// Holds the unfiltered reflections markup so a drill-down can be undone
/// without re-fetching. Captured at most once per screen mount.
#[derive(Debug, Default)]
pub struct InsightPanelCache {
    snapshot: Option<(u64, InsightSnapshot)>,
}

impl InsightPanelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<&InsightSnapshot> {
        self.snapshot.as_ref().map(|(_, snapshot)| snapshot)
    }

    /// Store the current panel. Returns false if this mount already has a
    /// snapshot or the panel is missing.
    pub fn capture(&mut self, content: &ContentRegion) -> bool {
        let generation = content.mount_generation();
        if matches!(&self.snapshot, Some((captured, _)) if *captured == generation) {
            return false;
        }
        let Some(html) = content.panel(REFLECTIONS_PANEL) else {
            log::debug!("No reflections panel to capture");
            return false;
        };
        let title = content.panel(REFLECTIONS_TITLE).unwrap_or_default();
        self.snapshot = Some((
            generation,
            InsightSnapshot { html: html.to_string(), title: title.to_string() },
        ));
        true
    }

    /// Put the captured markup back verbatim. Only applies to the mount it was captured from.
    pub fn restore(&self, content: &mut ContentRegion) -> bool {
        match &self.snapshot {
            Some((generation, snapshot)) if *generation == content.mount_generation() => {
                let restored = content.replace_panel(REFLECTIONS_PANEL, &snapshot.html);
                content.replace_panel(REFLECTIONS_TITLE, &snapshot.title);
                restored
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }
}
