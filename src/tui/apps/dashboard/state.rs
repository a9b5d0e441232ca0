use crossterm::event::KeyCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::api::{
    AnalyzeOutcome, Assignment, Course, DashboardApi, Lecture, LectureAnalysis, MaterialsAnalysis, Survey,
    SurveyResponse,
};
use crate::dashboard::{
    AsyncJobTracker, BreadcrumbResolver, BreadcrumbTicket, InsightPanelCache, JobTicket, LectureListing,
    Markup, ModalFetch, ModalId, ModalStack, MountedScreen, NavigationRequest, NavigationTicket,
    ScreenRouter, TabController, TabId, TemplateSource,
};
use crate::error::DashboardError;
use crate::tui::element::FocusId;
use crate::tui::resource::Resource;

pub const MODAL_INPUT: FocusId = FocusId::new("modal-input");
pub const SCREEN_INPUT: FocusId = FocusId::new("screen-input");

pub struct InitParams {
    pub api: Arc<dyn DashboardApi>,
    pub templates: Arc<dyn TemplateSource>,
    /// Course the stock templates describe; any other course is blank
    pub sample_course_id: String,
    /// Base of shareable survey links
    pub survey_base_url: String,
    pub tick_interval: Duration,
    /// Survey id from the entry URL; skips the home screen
    pub entry_survey_id: Option<String>,
}

/// What the single-line text input is currently editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    VideoPath,
    MaterialsPath,
    LectureTitle,
    Modal(ModalId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputState {
    pub target: InputTarget,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

pub struct State {
    pub(super) api: Arc<dyn DashboardApi>,
    pub(super) templates: Arc<dyn TemplateSource>,
    pub router: ScreenRouter,
    pub modals: ModalStack,
    pub tabs: TabController,
    pub jobs: AsyncJobTracker,
    pub breadcrumb: BreadcrumbResolver,
    pub insights: InsightPanelCache,
    pub courses: Resource<Vec<Course>, DashboardError>,
    pub lectures: Resource<LectureListing, DashboardError>,
    pub assignments: Resource<Vec<Assignment>, DashboardError>,
    pub analysis: Resource<LectureAnalysis, DashboardError>,
    pub reflections: Resource<Vec<SurveyResponse>, DashboardError>,
    pub materials: Resource<MaterialsAnalysis, DashboardError>,
    pub survey: Resource<Survey, DashboardError>,
    pub selected: usize,
    pub input: Option<InputState>,
    pub banner: Option<Banner>,
    /// Lecture whose analysis job the edit screen is showing
    pub job_lecture: Option<String>,
    pub survey_base_url: String,
    pub tick_interval: Duration,
    pub last_tick: Instant,
}

impl State {
    pub fn new(params: InitParams) -> Self {
        Self {
            api: params.api,
            templates: params.templates,
            router: ScreenRouter::new(params.sample_course_id),
            modals: ModalStack::new(),
            tabs: TabController::new(),
            jobs: AsyncJobTracker::new(),
            breadcrumb: BreadcrumbResolver::new(),
            insights: InsightPanelCache::new(),
            courses: Resource::NotAsked,
            lectures: Resource::NotAsked,
            assignments: Resource::NotAsked,
            analysis: Resource::NotAsked,
            reflections: Resource::NotAsked,
            materials: Resource::NotAsked,
            survey: Resource::NotAsked,
            selected: 0,
            input: None,
            banner: None,
            job_lecture: None,
            survey_base_url: params.survey_base_url,
            tick_interval: params.tick_interval,
            last_tick: Instant::now(),
        }
    }

    pub fn notice(&mut self, text: impl Into<String>) {
        self.banner = Some(Banner { kind: BannerKind::Notice, text: text.into() });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.banner = Some(Banner { kind: BannerKind::Error, text: text.into() });
    }

    /// Log an error and show it if its category is meant for the user
    pub fn report(&mut self, error: &DashboardError, context: &str) {
        error.log(context);
        self.surface(error);
    }

    /// Show an error that has already been logged
    pub fn surface(&mut self, error: &DashboardError) {
        if error.is_user_facing() {
            self.error(error.user_message());
        }
    }

    /// Number of rows the selection cursor can move over on the current screen
    pub fn selectable_len(&self) -> usize {
        use crate::dashboard::ScreenId;
        match self.router.current_screen() {
            Some(ScreenId::Home) | Some(ScreenId::Courses) => self.courses.to_option().map_or(0, Vec::len),
            Some(ScreenId::CourseHub) => match self.tabs.active_tab(ScreenId::CourseHub) {
                Some(TabId::Lectures) => self.lectures.to_option().map_or(0, LectureListing::len),
                Some(TabId::Assignments) => self.assignments.to_option().map_or(0, Vec::len),
                _ => 0,
            },
            Some(ScreenId::LectureAnalysis) => self.analysis.to_option().map_or(0, |a| a.insights().len()),
            _ => 0,
        }
    }

    pub fn selected_lecture(&self) -> Option<&Lecture> {
        self.lectures.to_option()?.iter().nth(self.selected)
    }

    pub fn selected_course(&self) -> Option<&Course> {
        self.courses.to_option()?.get(self.selected)
    }
}

#[derive(Clone)]
pub enum Msg {
    // Navigation
    Navigate(NavigationRequest),
    TemplateLoaded(NavigationTicket, Result<Markup, DashboardError>),
    ScreenMounted(MountedScreen),
    GoBack,
    BackCourseLoaded(Result<Course, DashboardError>),
    BreadcrumbResolved(BreadcrumbTicket, Result<Course, DashboardError>),

    // Lists and selection
    CoursesLoaded(Result<Vec<Course>, DashboardError>),
    LecturesLoaded { course_id: Option<String>, result: Result<Vec<Lecture>, DashboardError> },
    AssignmentsLoaded { course_id: String, result: Result<Vec<Assignment>, DashboardError> },
    ShowTab(TabId),
    NextTab,
    SelectUp,
    SelectDown,
    Activate,
    OpenLecture(NavigationTarget),

    // Lecture views
    LectureStatusLoaded(Result<Lecture, DashboardError>),
    AnalysisLoaded { lecture_id: String, result: Result<LectureAnalysis, DashboardError> },
    ReflectionsLoaded { lecture_id: String, result: Result<Vec<SurveyResponse>, DashboardError> },
    MaterialsLoaded { lecture_id: String, result: Result<MaterialsAnalysis, DashboardError> },
    SurveysListed { lecture_id: String, result: Result<Vec<Survey>, DashboardError> },
    SurveyLoaded { survey_id: String, result: Result<Survey, DashboardError> },
    OpenLatestSurvey,
    FocusInsight,
    RestoreInsights,
    ShowTopic,

    // Analysis jobs
    SubmitAnalysis,
    AnalysisSubmitted(JobTicket, Result<AnalyzeOutcome, DashboardError>),
    ProgressTick,

    // Modals and input
    ShowModal(ModalId),
    ModalLoaded(ModalFetch, Result<Markup, DashboardError>),
    ModalMounted { modal: ModalId, focus: Option<String> },
    HideModal,
    EditInput(InputTarget),
    InputKey(KeyCode),
    InputSubmitted,
    CourseCreated(Result<Course, DashboardError>),
    LectureCreated(Result<Lecture, DashboardError>),
    AssignmentCreated(Result<Assignment, DashboardError>),
    FeedbackSent(Result<(), DashboardError>),
    SurveyGenerated(Result<Survey, DashboardError>),

    Escape,
    Quit,
}

/// Store a fetch result. A failed refresh keeps data that was already shown;
/// the error is handed back for reporting.
pub fn settle<T>(slot: &mut Resource<T, DashboardError>, result: Result<T, DashboardError>) -> Option<DashboardError> {
    match result {
        Ok(data) => {
            *slot = Resource::Success(data);
            None
        }
        Err(error) => {
            if !slot.is_success() {
                *slot = Resource::Failure(error.clone());
            }
            Some(error)
        }
    }
}

/// Which lecture screen to open for the selected lecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTarget {
    Edit,
    Analysis,
    Planning,
}
