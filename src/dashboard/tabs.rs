//! Tab panes within a screen

use std::collections::HashMap;
use std::fmt;

use crate::api::Lecture;
use crate::dashboard::markup::Markup;
use crate::dashboard::registry::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabId {
    Overview,
    Lectures,
    Assignments,
}

impl TabId {
    pub const ALL: [TabId; 3] = [TabId::Overview, TabId::Lectures, TabId::Assignments];

    pub fn as_str(&self) -> &'static str {
        match self {
            TabId::Overview => "overview",
            TabId::Lectures => "lectures",
            TabId::Assignments => "assignments",
        }
    }

    /// Element id of the pane (`tab-lectures`)
    pub fn pane_id(&self) -> String {
        format!("tab-{}", self.as_str())
    }

    /// Element id of the control that activates the pane, by convention (`tab-btn-lectures`)
    pub fn control_id(&self) -> String {
        format!("tab-btn-{}", self.as_str())
    }

    pub fn label(&self) -> &'static str {
        match self {
            TabId::Overview => "Overview",
            TabId::Lectures => "Lectures",
            TabId::Assignments => "Assignments",
        }
    }

    pub fn next(&self) -> TabId {
        match self {
            TabId::Overview => TabId::Lectures,
            TabId::Lectures => TabId::Assignments,
            TabId::Assignments => TabId::Overview,
        }
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active pane of one screen and the control carrying the active style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTab {
    pub tab: TabId,
    pub control: Option<String>,
}

/// Side effect a tab asks for when it is entered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEntryEffect {
    None,
    /// Re-fetch lectures, scoped to the course when one is known
    SyncLectures { course_id: Option<String> },
    SyncAssignments { course_id: String },
}

#[derive(Debug, Default)]
pub struct TabController {
    active: HashMap<ScreenId, ActiveTab>,
}

impl TabController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self, screen: ScreenId) -> Option<&ActiveTab> {
        self.active.get(&screen)
    }

    pub fn active_tab(&self, screen: ScreenId) -> Option<TabId> {
        self.active(screen).map(|active| active.tab)
    }

    /// Show `tab` on `screen`, hiding its siblings. When `control` is omitted the
    /// control is looked up by convention in `markup`; not finding one is fine.
    pub fn show_tab(
        &mut self,
        screen: ScreenId,
        tab: TabId,
        control: Option<&str>,
        markup: Option<&Markup>,
        course_id: Option<&str>,
    ) -> TabEntryEffect {
        let control = match control {
            Some(id) => Some(id.to_string()),
            None => {
                let id = tab.control_id();
                if markup.is_some_and(|m| m.has_element(&id)) {
                    Some(id)
                } else {
                    log::debug!("No control for tab {} on {}", tab, screen);
                    None
                }
            }
        };
        self.active.insert(screen, ActiveTab { tab, control });

        match tab {
            TabId::Lectures => TabEntryEffect::SyncLectures { course_id: course_id.map(str::to_string) },
            TabId::Assignments => match course_id {
                Some(id) => TabEntryEffect::SyncAssignments { course_id: id.to_string() },
                None => {
                    log::warn!("Assignments tab entered without a course");
                    TabEntryEffect::None
                }
            },
            TabId::Overview => TabEntryEffect::None,
        }
    }

    /// Forget the active pane, e.g. when the screen is re-mounted
    pub fn reset(&mut self, screen: ScreenId) {
        self.active.remove(&screen);
    }

    /// Whether a pane is showing; every pane other than the active one is hidden
    pub fn is_visible(&self, screen: ScreenId, tab: TabId) -> bool {
        self.active_tab(screen) == Some(tab)
    }
}

/// Lectures of one course split by analysis completion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LectureListing {
    pub course_id: Option<String>,
    pub past: Vec<Lecture>,
    pub upcoming: Vec<Lecture>,
}

impl LectureListing {
    /// Partition on `has_analysis` alone. A lecture whose analysis is still
    /// running stays in `upcoming` whatever its status string says.
    pub fn partition(course_id: Option<String>, lectures: Vec<Lecture>) -> Self {
        let (past, upcoming) = lectures.into_iter().partition(|lecture| lecture.has_analysis);
        Self { course_id, past, upcoming }
    }

    /// Upcoming lectures with a background analysis in progress
    pub fn pending(&self) -> impl Iterator<Item = &Lecture> {
        self.upcoming.iter().filter(|lecture| lecture.is_analysis_pending())
    }

    pub fn len(&self) -> usize {
        self.past.len() + self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Past first, then upcoming; the order lectures are listed in
    pub fn iter(&self) -> impl Iterator<Item = &Lecture> {
        self.past.iter().chain(self.upcoming.iter())
    }

    pub fn find(&self, lecture_id: &str) -> Option<&Lecture> {
        self.iter().find(|lecture| lecture.id == lecture_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lecture(id: &str, has_analysis: bool, status: Option<&str>) -> Lecture {
        Lecture {
            id: id.to_string(),
            class_id: "c1".to_string(),
            title: id.to_string(),
            lecture_number: None,
            date: None,
            topics: vec![],
            has_analysis,
            analysis_status: status.map(str::to_string),
            video_path: None,
        }
    }

    #[test]
    fn test_processing_lecture_stays_upcoming() {
        let listing = LectureListing::partition(
            Some("c1".into()),
            vec![
                lecture("done", true, Some("complete")),
                lecture("running", false, Some("processing")),
                lecture("new", false, None),
            ],
        );
        let past: Vec<_> = listing.past.iter().map(|l| l.id.as_str()).collect();
        let upcoming: Vec<_> = listing.upcoming.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(past, vec!["done"]);
        assert_eq!(upcoming, vec!["running", "new"]);
        assert_eq!(listing.pending().map(|l| l.id.as_str()).collect::<Vec<_>>(), vec!["running"]);
    }

    #[test]
    fn test_control_resolved_by_convention() {
        let markup = Markup::new(r#"<button id="tab-btn-lectures">Lectures</button>"#);
        let mut tabs = TabController::new();

        let effect = tabs.show_tab(ScreenId::CourseHub, TabId::Lectures, None, Some(&markup), Some("c1"));
        assert_eq!(effect, TabEntryEffect::SyncLectures { course_id: Some("c1".into()) });
        assert_eq!(tabs.active(ScreenId::CourseHub).and_then(|a| a.control.as_deref()), Some("tab-btn-lectures"));

        tabs.show_tab(ScreenId::CourseHub, TabId::Overview, None, Some(&markup), Some("c1"));
        let active = tabs.active(ScreenId::CourseHub).unwrap();
        assert_eq!(active.tab, TabId::Overview);
        assert_eq!(active.control, None);
        assert!(!tabs.is_visible(ScreenId::CourseHub, TabId::Lectures));
    }

    #[test]
    fn test_assignments_need_a_course() {
        let mut tabs = TabController::new();
        assert_eq!(
            tabs.show_tab(ScreenId::CourseHub, TabId::Assignments, Some("btn"), None, None),
            TabEntryEffect::None
        );
        assert_eq!(
            tabs.show_tab(ScreenId::CourseHub, TabId::Assignments, None, None, Some("c9")),
            TabEntryEffect::SyncAssignments { course_id: "c9".into() }
        );
    }
}
