//! Async work issued by the dashboard. Every helper here returns a command
//! whose result comes back as a message tagged with whatever the handler
//! needs to recognise a stale reply.

use std::future::Future;

use crate::api::{AssignmentDraft, CourseDraft, CourseFeedback, LectureDraft, PendingUpload, SurveyRequest};
use crate::dashboard::{
    BackPlan, EntryHook, Freshness, ModalFetch, NavigationRequest, ScreenId, TabEntryEffect, TabId,
};
use crate::tui::Command;
use crate::tui::resource::Resource;

use super::state::{Msg, State};

fn task(future: impl Future<Output = Msg> + Send + 'static) -> Command<Msg> {
    Command::Perform(Box::pin(future))
}

impl State {
    /// Start a navigation and fetch its template
    pub(super) fn navigate(&mut self, request: NavigationRequest) -> Command<Msg> {
        let ticket = self.router.begin(request);
        let templates = self.templates.clone();
        task(async move {
            let result = templates.fetch(ticket.key(), Freshness::for_screen()).await;
            Msg::TemplateLoaded(ticket, result)
        })
    }

    pub(super) fn go_back(&mut self) -> Command<Msg> {
        match self.router.go_back() {
            BackPlan::Navigate(request) => self.navigate(request),
            BackPlan::RefetchCourse { course_id } => self.refetch_course(course_id),
        }
    }

    /// Re-fetch a course so the hub is rebuilt from fresh data, then navigate there
    pub(super) fn refetch_course(&mut self, course_id: String) -> Command<Msg> {
        let api = self.api.clone();
        task(async move { Msg::BackCourseLoaded(api.get_course(&course_id).await) })
    }

    /// Turn the entry plan of a mounted screen into commands
    pub(super) fn run_hooks(&mut self, hooks: Vec<EntryHook>) -> Command<Msg> {
        let commands = hooks.into_iter().map(|hook| self.run_hook(hook)).collect();
        Command::batch(commands)
    }

    fn run_hook(&mut self, hook: EntryHook) -> Command<Msg> {
        log::debug!("Entry hook {:?}", hook);
        match hook {
            EntryHook::RefreshCourses => self.fetch_courses(),
            EntryHook::RefreshLectures { course_id } => self.fetch_lectures(course_id),
            EntryHook::ShowTab(tab) => self.show_tab(tab),
            EntryHook::ClearPendingUploads => {
                self.router.clear_pending_uploads();
                self.input = None;
                Command::None
            }
            EntryHook::CheckAnalysisJob { lecture_id } => {
                self.job_lecture = Some(lecture_id.clone());
                let api = self.api.clone();
                task(async move { Msg::LectureStatusLoaded(api.get_lecture(&lecture_id).await) })
            }
            EntryHook::LoadAnalysis { lecture_id } => {
                self.analysis = Resource::Loading;
                let api = self.api.clone();
                task(async move {
                    let result = api.lecture_analysis(&lecture_id).await;
                    Msg::AnalysisLoaded { lecture_id, result }
                })
            }
            EntryHook::LoadReflections { lecture_id } => {
                self.reflections = Resource::Loading;
                let api = self.api.clone();
                task(async move {
                    let result = api.survey_responses(&lecture_id).await;
                    Msg::ReflectionsLoaded { lecture_id, result }
                })
            }
            EntryHook::LoadMaterials { lecture_id } => {
                self.materials = Resource::Loading;
                let api = self.api.clone();
                task(async move {
                    let result = api.materials_analysis(&lecture_id).await;
                    Msg::MaterialsLoaded { lecture_id, result }
                })
            }
            EntryHook::LoadSurvey { survey_id } => {
                self.survey = Resource::Loading;
                let api = self.api.clone();
                task(async move {
                    let result = api.get_survey(&survey_id).await;
                    Msg::SurveyLoaded { survey_id, result }
                })
            }
            EntryHook::ResolveBreadcrumb { course_id } => {
                let ticket = self.breadcrumb.begin(course_id);
                let api = self.api.clone();
                task(async move {
                    let result = api.get_course(ticket.course_id()).await;
                    Msg::BreadcrumbResolved(ticket, result)
                })
            }
        }
    }

    pub(super) fn fetch_courses(&mut self) -> Command<Msg> {
        if !self.courses.is_success() {
            self.courses = Resource::Loading;
        }
        let api = self.api.clone();
        task(async move { Msg::CoursesLoaded(api.list_courses().await) })
    }

    pub(super) fn fetch_lectures(&mut self, course_id: Option<String>) -> Command<Msg> {
        if !self.lectures.is_success() {
            self.lectures = Resource::Loading;
        }
        let api = self.api.clone();
        task(async move {
            let result = api.list_lectures(course_id.as_deref()).await;
            Msg::LecturesLoaded { course_id, result }
        })
    }

    pub(super) fn fetch_assignments(&mut self, course_id: String) -> Command<Msg> {
        if !self.assignments.is_success() {
            self.assignments = Resource::Loading;
        }
        let api = self.api.clone();
        task(async move {
            let result = api.list_assignments(&course_id).await;
            Msg::AssignmentsLoaded { course_id, result }
        })
    }

    /// Activate a course hub tab and run whatever the tab needs on entry
    pub(super) fn show_tab(&mut self, tab: TabId) -> Command<Msg> {
        let Some(screen) = self.router.current_screen() else {
            return Command::None;
        };
        self.selected = 0;
        let course_id = self.router.session().current_course_id().map(str::to_string);
        let effect = self.tabs.show_tab(
            screen,
            tab,
            None,
            self.router.content().markup(),
            course_id.as_deref(),
        );
        match effect {
            TabEntryEffect::None => Command::None,
            TabEntryEffect::SyncLectures { course_id } => self.fetch_lectures(course_id),
            TabEntryEffect::SyncAssignments { course_id } => self.fetch_assignments(course_id),
        }
    }

    pub(super) fn fetch_modal(&self, fetch: ModalFetch) -> Command<Msg> {
        let templates = self.templates.clone();
        task(async move {
            let result = templates.fetch(fetch.key, fetch.freshness.clone()).await;
            Msg::ModalLoaded(fetch, result)
        })
    }

    /// Hand a value back through the message loop, e.g. a mounted signal
    pub(super) fn emit(msg: Msg) -> Command<Msg> {
        task(std::future::ready(msg))
    }

    pub(super) fn submit_analysis_upload(&self, lecture_id: String, video: PendingUpload, ticket: crate::dashboard::JobTicket) -> Command<Msg> {
        let api = self.api.clone();
        task(async move {
            let result = api.analyze_lecture(&lecture_id, &video).await;
            Msg::AnalysisSubmitted(ticket, result)
        })
    }

    pub(super) fn analyze_materials(&self, lecture_id: String, materials: PendingUpload) -> Command<Msg> {
        let api = self.api.clone();
        task(async move {
            let result = api.analyze_materials(&lecture_id, &materials).await;
            Msg::MaterialsLoaded { lecture_id, result }
        })
    }

    pub(super) fn list_lecture_surveys(&self, lecture_id: String) -> Command<Msg> {
        let api = self.api.clone();
        task(async move {
            let result = api.lecture_surveys(&lecture_id).await;
            Msg::SurveysListed { lecture_id, result }
        })
    }

    pub(super) fn create_course(&self, draft: CourseDraft) -> Command<Msg> {
        let api = self.api.clone();
        task(async move { Msg::CourseCreated(api.create_course(&draft).await) })
    }

    pub(super) fn create_lecture(&self, draft: LectureDraft) -> Command<Msg> {
        let api = self.api.clone();
        task(async move { Msg::LectureCreated(api.create_lecture(&draft).await) })
    }

    pub(super) fn create_assignment(&self, draft: AssignmentDraft) -> Command<Msg> {
        let api = self.api.clone();
        task(async move { Msg::AssignmentCreated(api.create_assignment(&draft, None).await) })
    }

    pub(super) fn send_feedback(&self, course_id: String, feedback: CourseFeedback) -> Command<Msg> {
        let api = self.api.clone();
        task(async move { Msg::FeedbackSent(api.send_feedback(&course_id, &feedback).await) })
    }

    pub(super) fn generate_survey(&self, lecture_id: String, request: SurveyRequest) -> Command<Msg> {
        let api = self.api.clone();
        task(async move { Msg::SurveyGenerated(api.generate_survey(&lecture_id, &request).await) })
    }

    /// Navigate to a lecture screen of the current course
    pub(super) fn open_lecture(&mut self, screen: ScreenId, lecture_id: String, title: Option<String>) -> Command<Msg> {
        let course_id = self.router.session().current_course_id().map(str::to_string);
        self.navigate(NavigationRequest::lecture(screen, course_id, lecture_id, title))
    }
}
