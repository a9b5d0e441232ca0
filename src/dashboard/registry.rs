//! Screen and modal identifiers
//!
//! Every view the dashboard can show is a variant here, and the mapping to
//! its template is a total function, so an unknown identifier can only
//! enter through `FromStr` at the boundary (CLI flags, entry URL).

use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Full-page views occupying the main content region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScreenId {
    Home,
    Courses,
    CourseHub,
    AddLecture,
    LectureEdit,
    LectureAnalysis,
    LecturePlanning,
    Survey,
}

impl ScreenId {
    pub const ALL: [ScreenId; 8] = [
        ScreenId::Home,
        ScreenId::Courses,
        ScreenId::CourseHub,
        ScreenId::AddLecture,
        ScreenId::LectureEdit,
        ScreenId::LectureAnalysis,
        ScreenId::LecturePlanning,
        ScreenId::Survey,
    ];

    /// Element id used by the markup (`screen-course-hub`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenId::Home => "screen-home",
            ScreenId::Courses => "screen-courses",
            ScreenId::CourseHub => "screen-course-hub",
            ScreenId::AddLecture => "screen-add-lecture",
            ScreenId::LectureEdit => "screen-lecture-edit",
            ScreenId::LectureAnalysis => "screen-lecture-analysis",
            ScreenId::LecturePlanning => "screen-lecture-planning",
            ScreenId::Survey => "screen-survey",
        }
    }

    pub fn template_key(&self) -> TemplateKey {
        let name = match self {
            ScreenId::Home => "home",
            ScreenId::Courses => "courses",
            ScreenId::CourseHub => "course-hub",
            ScreenId::AddLecture => "add-lecture",
            ScreenId::LectureEdit => "lecture-edit",
            ScreenId::LectureAnalysis => "lecture-analysis",
            ScreenId::LecturePlanning => "lecture-planning",
            ScreenId::Survey => "survey",
        };
        TemplateKey::screen(name)
    }

    /// Root screens have no meaningful back target
    pub fn is_root(&self) -> bool {
        matches!(self, ScreenId::Home | ScreenId::Courses)
    }

    /// Screens scoped to a single lecture; going back from them lands on the course hub
    pub fn is_lecture_view(&self) -> bool {
        matches!(self, ScreenId::LectureEdit | ScreenId::LectureAnalysis | ScreenId::LecturePlanning)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ScreenId::Home => "Home",
            ScreenId::Courses => "Courses",
            ScreenId::CourseHub => "Course",
            ScreenId::AddLecture => "Add Lecture",
            ScreenId::LectureEdit => "Lecture",
            ScreenId::LectureAnalysis => "Lecture Analysis",
            ScreenId::LecturePlanning => "Lecture Planning",
            ScreenId::Survey => "Survey",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScreenId {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScreenId::ALL
            .into_iter()
            .find(|screen| screen.as_str() == s)
            .ok_or_else(|| DashboardError::NotFound(format!("screen '{}'", s)))
    }
}

/// How a modal's mounted instance may be reused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPolicy {
    /// Mounted once, then only shown and hidden
    Reusable,
    /// Content depends on the call site; discarded and refetched on every show
    EvictOnShow,
    /// Shell fetched once; each open overwrites its inner content
    GeneratedContent,
}

/// Overlay dialogs stacked above the current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModalId {
    AddClass,
    Homework,
    AddAssignment,
    GenerateSurvey,
    Feedback,
    TopicDetail,
}

impl ModalId {
    pub const ALL: [ModalId; 6] = [
        ModalId::AddClass,
        ModalId::Homework,
        ModalId::AddAssignment,
        ModalId::GenerateSurvey,
        ModalId::Feedback,
        ModalId::TopicDetail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModalId::AddClass => "modal-add-class",
            ModalId::Homework => "modal-hw1",
            ModalId::AddAssignment => "modal-add-assignment",
            ModalId::GenerateSurvey => "modal-generate-survey",
            ModalId::Feedback => "modal-feedback",
            ModalId::TopicDetail => "modal-topic-detail",
        }
    }

    pub fn template_key(&self) -> TemplateKey {
        let name = match self {
            ModalId::AddClass => "add-class",
            ModalId::Homework => "hw1",
            ModalId::AddAssignment => "add-assignment",
            ModalId::GenerateSurvey => "generate-survey",
            ModalId::Feedback => "feedback",
            ModalId::TopicDetail => "topic-detail",
        };
        TemplateKey::modal(name)
    }

    pub fn policy(&self) -> ModalPolicy {
        match self {
            ModalId::AddClass => ModalPolicy::EvictOnShow,
            ModalId::TopicDetail => ModalPolicy::GeneratedContent,
            _ => ModalPolicy::Reusable,
        }
    }

    /// The one modal whose template is known to go stale between opens
    pub fn is_volatile(&self) -> bool {
        matches!(self, ModalId::AddClass)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ModalId::AddClass => "Add Class",
            ModalId::Homework => "Homework 1",
            ModalId::AddAssignment => "Add Assignment",
            ModalId::GenerateSurvey => "Generate Survey",
            ModalId::Feedback => "Course Feedback",
            ModalId::TopicDetail => "Topic",
        }
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModalId {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModalId::ALL
            .into_iter()
            .find(|modal| modal.as_str() == s)
            .ok_or_else(|| DashboardError::NotFound(format!("modal '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Screen,
    Modal,
}

/// Cache key and path of a view fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    pub kind: TemplateKind,
    pub name: &'static str,
}

impl TemplateKey {
    pub const fn screen(name: &'static str) -> Self {
        Self { kind: TemplateKind::Screen, name }
    }

    pub const fn modal(name: &'static str) -> Self {
        Self { kind: TemplateKind::Modal, name }
    }

    /// Conventional relative path: `screens/<name>.html` or `modals/<name>.html`
    pub fn path(&self) -> String {
        match self.kind {
            TemplateKind::Screen => format!("screens/{}.html", self.name),
            TemplateKind::Modal => format!("modals/{}.html", self.name),
        }
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Top-level navigation elements that can carry the "active" style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavItem {
    Home,
    Courses,
}

impl NavItem {
    pub const ALL: [NavItem; 2] = [NavItem::Home, NavItem::Courses];

    pub fn label(&self) -> &'static str {
        match self {
            NavItem::Home => "Home",
            NavItem::Courses => "Courses",
        }
    }

    pub fn screen(&self) -> ScreenId {
        match self {
            NavItem::Home => ScreenId::Home,
            NavItem::Courses => ScreenId::Courses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_screen_ids_round_trip_through_markup_ids() {
        for screen in ScreenId::ALL {
            assert_eq!(screen.as_str().parse::<ScreenId>().unwrap(), screen);
        }
        for modal in ModalId::ALL {
            assert_eq!(modal.as_str().parse::<ModalId>().unwrap(), modal);
        }
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let err = "screen-gradebook".parse::<ScreenId>().unwrap_err();
        assert!(matches!(err, DashboardError::NotFound(_)));
        assert!("modal-nope".parse::<ModalId>().is_err());
    }

    #[test]
    fn test_template_paths_follow_convention() {
        assert_eq!(ScreenId::CourseHub.template_key().path(), "screens/course-hub.html");
        assert_eq!(ModalId::Homework.template_key().path(), "modals/hw1.html");
    }

    #[test]
    fn test_template_keys_are_unique() {
        let keys: HashSet<_> = ScreenId::ALL.iter().map(|s| s.template_key()).collect();
        assert_eq!(keys.len(), ScreenId::ALL.len());
        let keys: HashSet<_> = ModalId::ALL.iter().map(|m| m.template_key()).collect();
        assert_eq!(keys.len(), ModalId::ALL.len());
    }

    #[test]
    fn test_root_set() {
        let roots: Vec<_> = ScreenId::ALL.into_iter().filter(ScreenId::is_root).collect();
        assert_eq!(roots, vec![ScreenId::Home, ScreenId::Courses]);
    }

    #[test]
    fn test_modal_policies() {
        assert_eq!(ModalId::AddClass.policy(), ModalPolicy::EvictOnShow);
        assert_eq!(ModalId::Homework.policy(), ModalPolicy::Reusable);
        assert_eq!(ModalId::TopicDetail.policy(), ModalPolicy::GeneratedContent);
        assert!(ModalId::AddClass.is_volatile());
        assert!(!ModalId::Feedback.is_volatile());
    }
}
