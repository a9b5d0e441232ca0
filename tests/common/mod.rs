//! In-memory fakes and a message-loop harness shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use praxis_dashboard::api::*;
use praxis_dashboard::dashboard::{Freshness, Markup, TemplateKey, TemplateSource};
use praxis_dashboard::error::{DashboardError, Result};
use praxis_dashboard::tui::App;
use praxis_dashboard::tui::apps::dashboard::{DashboardApp, InitParams, Msg, State};
use praxis_dashboard::tui::command::PendingMsg;

pub const SAMPLE_COURSE_ID: &str = "1";

pub const COURSE_HUB: &str = r#"<section id="screen-course-hub">
<h1>CS 101: Introduction to Computing</h1>
<nav><button id="tab-btn-overview">Overview</button><button id="tab-btn-lectures">Lectures</button></nav>
<div id="tab-overview"><p>Course overview</p>
<div class="card" data-placeholder><h2>Past Lectures</h2><p>Lecture 1: Variables</p></div>
<div class="card" data-placeholder><h2>Project Proposals</h2><p>Team Alpha</p></div>
</div>
<div id="tab-lectures"></div>
</section>"#;

pub const LECTURE_ANALYSIS: &str = r#"<section id="screen-lecture-analysis">
<h1>Lecture</h1>
<h2 id="reflections-title">AI Reflections</h2>
<div id="reflections-panel"><p>Loading reflections</p></div>
</section>"#;

/// Serves fixed fragments and records every fetch
#[derive(Default)]
pub struct FakeTemplates {
    pages: HashMap<String, String>,
    failing: Mutex<HashSet<String>>,
    fetches: Mutex<Vec<(String, Freshness)>>,
}

impl FakeTemplates {
    pub fn new() -> Self {
        let mut pages = HashMap::new();
        pages.insert("screens/course-hub.html".to_string(), COURSE_HUB.to_string());
        pages.insert("screens/lecture-analysis.html".to_string(), LECTURE_ANALYSIS.to_string());
        pages.insert(
            "modals/add-class.html".to_string(),
            r#"<form><label>Class name</label><input type="text" id="class-name"></form>"#.to_string(),
        );
        pages.insert("modals/hw1.html".to_string(), "<p>Homework 1: due Friday</p>".to_string());
        pages.insert(
            "modals/topic-detail.html".to_string(),
            r#"<div class="modal"><div id="modal-topic-detail-body"></div></div>"#.to_string(),
        );
        Self { pages, ..Default::default() }
    }

    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    pub fn count(&self, path: &str) -> usize {
        self.fetches.lock().unwrap().iter().filter(|(p, _)| p == path).count()
    }

    pub fn freshness_of(&self, path: &str) -> Vec<Freshness> {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, f)| f.clone())
            .collect()
    }
}

#[async_trait]
impl TemplateSource for FakeTemplates {
    async fn fetch(&self, key: TemplateKey, freshness: Freshness) -> Result<Markup> {
        let path = key.path();
        self.fetches.lock().unwrap().push((path.clone(), freshness));
        if self.failing.lock().unwrap().contains(&path) {
            return Err(DashboardError::Network(format!("GET {}: connection refused", path)));
        }
        let html = self
            .pages
            .get(&path)
            .cloned()
            .unwrap_or_else(|| format!("<h1>{}</h1>", key.name));
        Ok(Markup::new(html))
    }
}

pub fn course(id: &str, code: &str, name: &str) -> Course {
    Course {
        id: id.to_string(),
        code: code.to_string(),
        name: name.to_string(),
        total_lectures: 12,
        current_lecture: 3,
        semester: "Fall 2024".to_string(),
        description: String::new(),
        created_at: None,
    }
}

pub fn lecture(id: &str, course_id: &str, title: &str, has_analysis: bool, status: Option<&str>) -> Lecture {
    Lecture {
        id: id.to_string(),
        class_id: course_id.to_string(),
        title: title.to_string(),
        lecture_number: None,
        date: None,
        topics: Vec::new(),
        has_analysis,
        analysis_status: status.map(str::to_string),
        video_path: None,
    }
}

pub fn analysis_document() -> Value {
    json!({
        "lecture_title": "Lecture 1: Variables",
        "ai_reflections": {
            "insights": [
                {"type": "strength", "title": "Clear examples", "description": "Worked examples landed well."},
                {"type": "improvement", "title": "Pacing", "description": "The second half <felt> rushed."}
            ],
            "action_items": [{"priority": "high", "item": "Slow down on loops"}]
        },
        "topic_coverage": [
            {"topic": "Variables", "covered": true, "notes": "Covered with examples"},
            {"topic": "Scope", "covered": false, "notes": ""}
        ]
    })
}

/// REST fake backed by plain vectors. Every call is recorded as `name:arg`.
pub struct FakeApi {
    pub courses: Mutex<Vec<Course>>,
    pub lectures: Mutex<Vec<Lecture>>,
    pub surveys: Mutex<Vec<Survey>>,
    pub analyze_result: Mutex<Option<Result<AnalyzeOutcome>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            courses: Mutex::new(vec![
                course("1", "CS 101", "Introduction to Computing"),
                course("7", "CS 240", "Data Structures"),
            ]),
            lectures: Mutex::new(vec![
                lecture("l1", "1", "Lecture 1: Variables", true, Some("completed")),
                lecture("l2", "1", "Lecture 2: Loops", false, Some("processing")),
                lecture("l3", "1", "Lecture 3: Functions", false, None),
            ]),
            surveys: Mutex::new(Vec::new()),
            analyze_result: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose record starts with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn missing(what: &str, id: &str) -> DashboardError {
        DashboardError::NotFound(format!("{} {}", what, id))
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn list_courses(&self) -> Result<Vec<Course>> {
        self.record("list_courses".to_string());
        Ok(self.courses.lock().unwrap().clone())
    }

    async fn get_course(&self, id: &str) -> Result<Course> {
        self.record(format!("get_course:{}", id));
        self.courses
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| Self::missing("course", id))
    }

    async fn create_course(&self, draft: &CourseDraft) -> Result<Course> {
        self.record(format!("create_course:{}", draft.name));
        let created = course("99", &draft.code, &draft.name);
        self.courses.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_course(&self, id: &str, _draft: &CourseDraft) -> Result<Course> {
        self.record(format!("update_course:{}", id));
        Err(Self::missing("course", id))
    }

    async fn delete_course(&self, id: &str) -> Result<()> {
        self.record(format!("delete_course:{}", id));
        Ok(())
    }

    async fn course_overview(&self, id: &str) -> Result<CourseOverview> {
        self.record(format!("course_overview:{}", id));
        Ok(CourseOverview::default())
    }

    async fn send_feedback(&self, course_id: &str, _feedback: &CourseFeedback) -> Result<()> {
        self.record(format!("send_feedback:{}", course_id));
        Ok(())
    }

    async fn list_lectures(&self, course_id: Option<&str>) -> Result<Vec<Lecture>> {
        self.record(format!("list_lectures:{}", course_id.unwrap_or("*")));
        let lectures = self.lectures.lock().unwrap();
        Ok(lectures
            .iter()
            .filter(|l| course_id.is_none_or(|id| l.class_id == id))
            .cloned()
            .collect())
    }

    async fn get_lecture(&self, id: &str) -> Result<Lecture> {
        self.record(format!("get_lecture:{}", id));
        self.lectures
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| Self::missing("lecture", id))
    }

    async fn create_lecture(&self, draft: &LectureDraft) -> Result<Lecture> {
        self.record(format!("create_lecture:{}", draft.title));
        let created = lecture("l9", &draft.class_id, &draft.title, false, None);
        self.lectures.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_lecture(&self, draft: &LectureDraft) -> Result<Lecture> {
        self.record(format!("update_lecture:{}", draft.title));
        Err(Self::missing("lecture", draft.id.as_deref().unwrap_or("")))
    }

    async fn lecture_analysis(&self, id: &str) -> Result<LectureAnalysis> {
        self.record(format!("lecture_analysis:{}", id));
        Ok(LectureAnalysis::new(analysis_document()))
    }

    async fn analyze_lecture(&self, id: &str, _video: &PendingUpload) -> Result<AnalyzeOutcome> {
        self.record(format!("analyze_lecture:{}", id));
        // Give an overlapping submit a chance to run before the reply lands
        tokio::time::sleep(Duration::from_millis(1)).await;
        self.analyze_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(AnalyzeOutcome::Completed(LectureAnalysis::new(analysis_document()))))
    }

    async fn analyze_materials(&self, id: &str, _materials: &PendingUpload) -> Result<MaterialsAnalysis> {
        self.record(format!("analyze_materials:{}", id));
        Ok(MaterialsAnalysis { summary: "Two topics".to_string(), ..Default::default() })
    }

    async fn materials_analysis(&self, id: &str) -> Result<MaterialsAnalysis> {
        self.record(format!("materials_analysis:{}", id));
        Ok(MaterialsAnalysis::default())
    }

    async fn lecture_surveys(&self, id: &str) -> Result<Vec<Survey>> {
        self.record(format!("lecture_surveys:{}", id));
        Ok(self.surveys.lock().unwrap().clone())
    }

    async fn survey_responses(&self, id: &str) -> Result<Vec<SurveyResponse>> {
        self.record(format!("survey_responses:{}", id));
        Ok(Vec::new())
    }

    async fn generate_survey(&self, id: &str, _request: &SurveyRequest) -> Result<Survey> {
        self.record(format!("generate_survey:{}", id));
        Ok(survey("s-new", id))
    }

    async fn get_survey(&self, id: &str) -> Result<Survey> {
        self.record(format!("get_survey:{}", id));
        Ok(survey(id, "l1"))
    }

    async fn submit_survey(&self, id: &str, _submission: &SurveySubmission) -> Result<()> {
        self.record(format!("submit_survey:{}", id));
        Ok(())
    }

    async fn list_assignments(&self, course_id: &str) -> Result<Vec<Assignment>> {
        self.record(format!("list_assignments:{}", course_id));
        Ok(Vec::new())
    }

    async fn create_assignment(&self, draft: &AssignmentDraft, _file: Option<&PendingUpload>) -> Result<Assignment> {
        self.record(format!("create_assignment:{}", draft.title));
        Ok(Assignment {
            id: "a1".to_string(),
            class_id: draft.class_id.clone(),
            title: draft.title.clone(),
            due_date: None,
            description: String::new(),
            file_name: None,
        })
    }

    async fn delete_assignment(&self, id: &str) -> Result<()> {
        self.record(format!("delete_assignment:{}", id));
        Ok(())
    }
}

pub fn survey(id: &str, lecture_id: &str) -> Survey {
    Survey {
        survey_id: id.to_string(),
        lecture_id: Some(lecture_id.to_string()),
        lecture_title: "Lecture 1: Variables".to_string(),
        questions: Vec::new(),
        summary: String::new(),
        shareable_link: None,
    }
}

/// Drives `DashboardApp::update` the way the runtime does, but lets a test
/// decide when each issued future resolves.
pub struct Harness {
    pub state: State,
    pub api: Arc<FakeApi>,
    pub templates: Arc<FakeTemplates>,
    pending: VecDeque<PendingMsg<Msg>>,
}

impl Harness {
    pub fn start(api: FakeApi, templates: FakeTemplates, entry_survey_id: Option<&str>) -> Self {
        let api = Arc::new(api);
        let templates = Arc::new(templates);
        let (state, command) = DashboardApp::init(InitParams {
            api: api.clone(),
            templates: templates.clone(),
            sample_course_id: SAMPLE_COURSE_ID.to_string(),
            survey_base_url: "http://localhost:8000".to_string(),
            tick_interval: Duration::from_millis(100),
            entry_survey_id: entry_survey_id.map(str::to_string),
        });
        Self { state, api, templates, pending: command.into_futures().into() }
    }

    /// Start on the home screen with every entry fetch settled
    pub async fn home() -> Self {
        let mut harness = Self::start(FakeApi::new(), FakeTemplates::new(), None);
        harness.run().await;
        harness
    }

    pub fn send(&mut self, msg: Msg) {
        let command = DashboardApp::update(&mut self.state, msg);
        self.pending.extend(command.into_futures());
    }

    /// Detach the futures issued so far so the test can resolve them in any order
    pub fn take(&mut self) -> Vec<PendingMsg<Msg>> {
        self.pending.drain(..).collect()
    }

    pub async fn deliver(&mut self, future: PendingMsg<Msg>) {
        let msg = future.await;
        self.send(msg);
    }

    /// Resolve queued futures in issue order until nothing is left
    pub async fn run(&mut self) {
        while let Some(future) = self.pending.pop_front() {
            let msg = future.await;
            self.send(msg);
        }
    }

    pub async fn open(&mut self, msg: Msg) {
        self.send(msg);
        self.run().await;
    }

    pub fn panel(&self, id: &str) -> Option<String> {
        self.state.router.content().panel(id).map(str::to_string)
    }

    pub fn course(&self, id: &str) -> Course {
        self.api.courses.lock().unwrap().iter().find(|c| c.id == id).cloned().unwrap()
    }
}
