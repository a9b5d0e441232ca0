//! Wire models for the Praxis REST API
//!
//! Course records use the backend's camelCase field names. Analysis documents
//! are produced by an external pipeline, so they are kept as JSON with typed
//! accessors for the parts the dashboard renders.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A class (course) as returned by `GET /classes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub total_lectures: u32,
    #[serde(default)]
    pub current_lecture: u32,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Course {
    /// Heading shown on the course hub
    pub fn display_name(&self) -> String {
        if self.code.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.code, self.name)
        }
    }
}

/// Body for `POST /classes` and `PUT /classes/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub code: String,
    pub name: String,
    pub total_lectures: u32,
    pub semester: String,
    #[serde(default)]
    pub description: String,
}

/// Aggregate numbers for the course overview tab
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseOverview {
    #[serde(default)]
    pub total_lectures: u32,
    #[serde(default)]
    pub analyzed_lectures: u32,
    #[serde(default)]
    pub survey_responses: u32,
    #[serde(default)]
    pub average_understanding: Option<f64>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// Body for `POST /classes/{id}/feedback`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseFeedback {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lecture_id: Option<String>,
}

/// Lecture list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: String,
    #[serde(alias = "classId")]
    pub class_id: String,
    pub title: String,
    #[serde(default)]
    pub lecture_number: Option<u32>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Completion flag; the only thing that moves a lecture into "past"
    #[serde(default)]
    pub has_analysis: bool,
    /// `"processing"` while a background analysis job runs
    #[serde(default)]
    pub analysis_status: Option<String>,
    #[serde(default)]
    pub video_path: Option<String>,
}

impl Lecture {
    pub fn is_analysis_pending(&self) -> bool {
        !self.has_analysis
            && matches!(self.analysis_status.as_deref(), Some("processing") | Some("queued"))
    }
}

/// Body for `POST /lectures` and `PUT /lectures`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LectureDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub class_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lecture_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// A file chosen locally but not yet sent to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub path: PathBuf,
}

impl PendingUpload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string())
    }

    pub fn mime_type(&self) -> &'static str {
        mime_for_path(&self.path)
    }
}

/// Mime type by extension, defaulting per family the way the analysis backend does
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "pdf" => "application/pdf",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Result of `POST /lectures/{id}/analyze`
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeOutcome {
    /// The server finished the analysis within the request
    Completed(LectureAnalysis),
    /// The server accepted the job and keeps working in the background
    Processing { message: Option<String> },
}

impl AnalyzeOutcome {
    pub fn from_value(value: Value) -> Self {
        let status = value.get("status").and_then(Value::as_str);
        match status {
            Some("processing") | Some("queued") | Some("accepted") => AnalyzeOutcome::Processing {
                message: value.get("message").and_then(Value::as_str).map(str::to_string),
            },
            _ => AnalyzeOutcome::Completed(LectureAnalysis::new(value)),
        }
    }
}

/// One AI reflection from `ai_reflections.insights`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(default, rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    #[serde(default)]
    pub priority: String,
    pub item: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCoverage {
    pub topic: String,
    #[serde(default)]
    pub covered: bool,
    #[serde(default)]
    pub notes: String,
}

/// Video analysis document from `GET /lectures/{id}/analysis`
#[derive(Debug, Clone, PartialEq)]
pub struct LectureAnalysis {
    raw: Value,
}

impl LectureAnalysis {
    pub fn new(raw: Value) -> Self {
        // Analyses may come wrapped as stored by the backend
        let raw = match raw.get("analysis_data") {
            Some(inner) if inner.is_object() => inner.clone(),
            _ => raw,
        };
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The pipeline reports failures inside a 200 body
    pub fn error(&self) -> Option<&str> {
        self.raw.get("error").and_then(Value::as_str)
    }

    pub fn lecture_title(&self) -> Option<&str> {
        self.raw.get("lecture_title").and_then(Value::as_str)
    }

    pub fn insights(&self) -> Vec<Insight> {
        self.field_list("/ai_reflections/insights")
    }

    pub fn action_items(&self) -> Vec<ActionItem> {
        self.field_list("/ai_reflections/action_items")
    }

    pub fn topic_coverage(&self) -> Vec<TopicCoverage> {
        self.field_list("/topic_coverage")
    }

    pub fn video_duration(&self) -> Option<f64> {
        self.raw.get("video_duration").and_then(Value::as_f64)
    }

    fn field_list<T: for<'de> Deserialize<'de>>(&self, pointer: &str) -> Vec<T> {
        self.raw
            .pointer(pointer)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A topic extracted from lecture materials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialsTopic {
    pub name: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub key_concepts: Vec<String>,
    #[serde(default)]
    pub estimated_time: Option<String>,
}

/// Materials analysis from `GET /lectures/{id}/materials-analysis`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialsAnalysis {
    #[serde(default)]
    pub topics: Vec<MaterialsTopic>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikertScale {
    pub min: u8,
    pub max: u8,
    #[serde(default)]
    pub min_label: String,
    #[serde(default)]
    pub max_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Likert {
        scale: LikertScale,
        #[serde(default)]
        concept: Option<String>,
    },
    MultipleChoice {
        options: Vec<String>,
        #[serde(default)]
        allow_multiple: bool,
    },
    OpenEnded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub id: String,
    pub question: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub survey_id: String,
    #[serde(default)]
    pub lecture_id: Option<String>,
    #[serde(default)]
    pub lecture_title: String,
    #[serde(default)]
    pub questions: Vec<SurveyQuestion>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub shareable_link: Option<String>,
}

/// Answer to a single survey question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Scale(u8),
    Choices(Vec<String>),
    Text(String),
}

/// Body for `POST /surveys/{id}/submit`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveySubmission {
    pub answers: std::collections::BTreeMap<String, Answer>,
}

/// Student response listed by `GET /lectures/{id}/survey-responses`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponse {
    #[serde(default)]
    pub survey_id: String,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub answers: std::collections::BTreeMap<String, Answer>,
}

/// Body for `POST /lectures/{id}/generate-survey`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor_input: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub class_id: String,
    pub title: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentDraft {
    pub class_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_course_uses_camel_case() {
        let course: Course = serde_json::from_value(json!({
            "id": "c1", "code": "CS 101", "name": "Intro", "totalLectures": 12,
            "currentLecture": 0, "semester": "Fall", "description": "", "createdAt": "2024-09-01T10:00:00"
        }))
        .unwrap();
        assert_eq!(course.total_lectures, 12);
        assert_eq!(course.display_name(), "CS 101: Intro");
    }

    #[test]
    fn test_analyze_outcome_detects_background_processing() {
        let outcome = AnalyzeOutcome::from_value(json!({"status": "processing", "message": "Started"}));
        assert_eq!(outcome, AnalyzeOutcome::Processing { message: Some("Started".into()) });

        let outcome = AnalyzeOutcome::from_value(json!({"lecture_id": "l1", "ai_reflections": {"insights": []}}));
        assert!(matches!(outcome, AnalyzeOutcome::Completed(_)));
    }

    #[test]
    fn test_analysis_accessors_unwrap_stored_document() {
        let analysis = LectureAnalysis::new(json!({
            "lecture_id": "l1",
            "analysis_data": {
                "ai_reflections": {
                    "insights": [{"type": "success", "title": "Great analogy", "description": "At 12:30"}],
                    "action_items": [{"priority": "Must Do", "item": "Slow down"}]
                },
                "topic_coverage": [{"topic": "Recursion", "covered": false}]
            }
        }));
        assert_eq!(analysis.insights()[0].title, "Great analogy");
        assert_eq!(analysis.action_items()[0].item, "Slow down");
        assert!(!analysis.topic_coverage()[0].covered);
        assert!(analysis.error().is_none());
    }

    #[test]
    fn test_survey_question_kinds() {
        let survey: Survey = serde_json::from_value(json!({
            "survey_id": "s1",
            "questions": [
                {"id": "q1", "type": "likert", "question": "How well?", "scale": {"min": 1, "max": 5}},
                {"id": "q2", "type": "multiple_choice", "question": "Which?", "options": ["a", "b"], "allow_multiple": true},
                {"id": "q3", "type": "open_ended", "question": "Anything else?"}
            ]
        }))
        .unwrap();
        assert!(matches!(survey.questions[0].kind, QuestionKind::Likert { .. }));
        assert!(matches!(survey.questions[1].kind, QuestionKind::MultipleChoice { allow_multiple: true, .. }));
        assert_eq!(survey.questions[2].kind, QuestionKind::OpenEnded);
    }

    #[test]
    fn test_pending_lecture_detection() {
        let mut lecture: Lecture = serde_json::from_value(json!({
            "id": "l1", "class_id": "c1", "title": "Graphs", "analysis_status": "processing"
        }))
        .unwrap();
        assert!(lecture.is_analysis_pending());
        lecture.has_analysis = true;
        assert!(!lecture.is_analysis_pending());
    }

    #[test]
    fn test_mime_detection() {
        assert_eq!(PendingUpload::new("/tmp/week3.MOV").mime_type(), "video/quicktime");
        assert_eq!(PendingUpload::new("slides.pptx").mime_type(),
                   "application/vnd.openxmlformats-officedocument.presentationml.presentation");
        assert_eq!(PendingUpload::new("/tmp/week3.mp4").file_name(), "week3.mp4");
    }
}
