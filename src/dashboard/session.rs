//! Session-scoped navigation state
//!
//! Owned by the router. Reads are public; writes go through router and job
//! tracker entry points so that concurrently completing fetches re-check
//! current values instead of overwriting them blindly.

use crate::api::PendingUpload;
use crate::dashboard::registry::ScreenId;

/// Where a survey was opened from, so "back" can reconstruct the analysis view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyOrigin {
    pub lecture_id: String,
    pub course_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    current_course_id: Option<String>,
    current_lecture_id: Option<String>,
    current_screen: Option<ScreenId>,
    current_survey_id: Option<String>,
    pending_video: Option<PendingUpload>,
    pending_materials: Option<PendingUpload>,
    survey_origin: Option<SurveyOrigin>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_course_id(&self) -> Option<&str> {
        self.current_course_id.as_deref()
    }

    pub fn current_lecture_id(&self) -> Option<&str> {
        self.current_lecture_id.as_deref()
    }

    pub fn current_screen(&self) -> Option<ScreenId> {
        self.current_screen
    }

    pub fn current_survey_id(&self) -> Option<&str> {
        self.current_survey_id.as_deref()
    }

    pub fn pending_video(&self) -> Option<&PendingUpload> {
        self.pending_video.as_ref()
    }

    pub fn pending_materials(&self) -> Option<&PendingUpload> {
        self.pending_materials.as_ref()
    }

    pub fn survey_origin(&self) -> Option<&SurveyOrigin> {
        self.survey_origin.as_ref()
    }

    /// True when a result fetched for `course_id` still matches what the user is looking at
    pub fn is_current_course(&self, course_id: Option<&str>) -> bool {
        self.current_course_id() == course_id
    }

    pub(crate) fn set_screen(&mut self, screen: ScreenId) {
        self.current_screen = Some(screen);
    }

    pub(crate) fn set_course(&mut self, course_id: impl Into<String>) {
        let course_id = course_id.into();
        if self.current_course_id.as_deref() != Some(course_id.as_str()) {
            // A lecture belongs to one course
            self.current_lecture_id = None;
        }
        self.current_course_id = Some(course_id);
    }

    pub(crate) fn set_lecture(&mut self, lecture_id: impl Into<String>) {
        let lecture_id = lecture_id.into();
        if self.current_lecture_id.as_deref() != Some(lecture_id.as_str()) {
            self.pending_video = None;
            self.pending_materials = None;
        }
        self.current_lecture_id = Some(lecture_id);
    }

    pub(crate) fn set_survey(&mut self, survey_id: impl Into<String>, origin: Option<SurveyOrigin>) {
        self.current_survey_id = Some(survey_id.into());
        if origin.is_some() {
            self.survey_origin = origin;
        }
    }

    pub(crate) fn stage_video(&mut self, upload: PendingUpload) {
        self.pending_video = Some(upload);
    }

    pub(crate) fn stage_materials(&mut self, upload: PendingUpload) {
        self.pending_materials = Some(upload);
    }

    pub(crate) fn clear_pending_uploads(&mut self) {
        self.pending_video = None;
        self.pending_materials = None;
    }

    pub(crate) fn take_survey_origin(&mut self) -> Option<SurveyOrigin> {
        self.survey_origin.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switching_course_forgets_lecture() {
        let mut session = SessionState::new();
        session.set_course("c1");
        session.set_lecture("l1");
        session.set_course("c1");
        assert_eq!(session.current_lecture_id(), Some("l1"));

        session.set_course("c2");
        assert_eq!(session.current_lecture_id(), None);
        assert!(session.is_current_course(Some("c2")));
        assert!(!session.is_current_course(Some("c1")));
    }

    #[test]
    fn test_switching_lecture_drops_staged_files() {
        let mut session = SessionState::new();
        session.set_lecture("l1");
        session.stage_video(PendingUpload::new("/tmp/lecture.mp4"));
        session.set_lecture("l1");
        assert!(session.pending_video().is_some());

        session.set_lecture("l2");
        assert!(session.pending_video().is_none());
    }

    #[test]
    fn test_survey_origin_is_kept_until_taken() {
        let mut session = SessionState::new();
        let origin = SurveyOrigin { lecture_id: "l1".into(), course_id: Some("c1".into()) };
        session.set_survey("s1", Some(origin.clone()));
        session.set_survey("s1", None);
        assert_eq!(session.survey_origin(), Some(&origin));
        assert_eq!(session.take_survey_origin(), Some(origin));
        assert_eq!(session.survey_origin(), None);
    }
}
