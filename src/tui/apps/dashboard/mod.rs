//! The instructor dashboard: wires the navigation and view-state components
//! in `crate::dashboard` into the terminal runtime.

mod effects;
mod state;
mod view;

use crossterm::event::KeyCode;
use ratatui::text::{Line, Span};
use std::time::Instant;

use crate::api::{
    AssignmentDraft, CourseDraft, CourseFeedback, LectureDraft, PendingUpload, SurveyRequest,
    constants::SURVEY_ID_PARAM,
};
use crate::dashboard::insight_cache::{REFLECTIONS_PANEL, REFLECTIONS_TITLE};
use crate::dashboard::markup::escape;
use crate::dashboard::{
    JobResolution, LectureListing, ModalId, ModalOutcome, MountedScreen, NavItem, NavigationRequest,
    Outcome, ScreenId, ShowAction, SurveyOrigin, TabId,
};
use crate::error::{DashboardError, PreconditionError};
use crate::tui::resource::Resource;
use crate::tui::{App, Command, Element, Subscription, Theme};

pub use state::{
    Banner, BannerKind, InitParams, InputState, InputTarget, MODAL_INPUT, Msg, NavigationTarget, SCREEN_INPUT,
    State, settle,
};

pub struct DashboardApp;

impl App for DashboardApp {
    type State = State;
    type Msg = Msg;
    type InitParams = InitParams;

    fn init(params: InitParams) -> (State, Command<Msg>) {
        let entry_survey_id = params.entry_survey_id.clone();
        let mut state = State::new(params);
        let request = match entry_survey_id {
            Some(survey_id) => {
                log::info!("Opening survey {} from entry URL", survey_id);
                NavigationRequest::survey(survey_id, None)
            }
            None => NavigationRequest::nav(NavItem::Home),
        };
        let command = state.navigate(request);
        (state, command)
    }

    fn update(state: &mut State, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Navigate(request) => state.navigate(request),
            Msg::TemplateLoaded(ticket, result) => match state.router.complete(ticket, result) {
                Outcome::Stale => Command::None,
                Outcome::Failed(error) => {
                    state.surface(&error);
                    Command::None
                }
                Outcome::Mounted(mounted) => State::emit(Msg::ScreenMounted(mounted)),
            },
            Msg::ScreenMounted(mounted) => state.on_mounted(mounted),
            Msg::GoBack => state.go_back(),
            Msg::BackCourseLoaded(result) => match result {
                Ok(course) => {
                    if state.router.current_screen().is_some_and(|s| s.is_lecture_view()) {
                        state.navigate(crate::dashboard::BackPlan::course_hub(course))
                    } else {
                        log::debug!("Ignoring course {} fetched for a back navigation that no longer applies", course.id);
                        Command::None
                    }
                }
                Err(error) => {
                    state.report(&error, "Returning to course");
                    Command::None
                }
            },
            Msg::BreadcrumbResolved(ticket, result) => {
                state.breadcrumb.complete(&ticket, result);
                Command::None
            }

            Msg::CoursesLoaded(result) => {
                if let Some(error) = settle(&mut state.courses, result) {
                    state.report(&error, "Loading courses");
                }
                state.clamp_selection();
                Command::None
            }
            Msg::LecturesLoaded { course_id, result } => {
                if !state.wants_lectures_for(course_id.as_deref()) {
                    log::debug!("Dropping lecture list for course {:?}; no longer current", course_id);
                    return Command::None;
                }
                let result = result.map(|lectures| {
                    let stopped = state.jobs.observe_listing(&lectures);
                    state.report_stopped_jobs(&stopped);
                    LectureListing::partition(course_id, lectures)
                });
                if let Some(error) = settle(&mut state.lectures, result) {
                    state.report(&error, "Loading lectures");
                }
                state.clamp_selection();
                Command::None
            }
            Msg::AssignmentsLoaded { course_id, result } => {
                if !state.router.session().is_current_course(Some(&course_id)) {
                    log::debug!("Dropping assignments for course {}; no longer current", course_id);
                    return Command::None;
                }
                if let Some(error) = settle(&mut state.assignments, result) {
                    state.report(&error, "Loading assignments");
                }
                state.clamp_selection();
                Command::None
            }
            Msg::ShowTab(tab) => state.show_tab(tab),
            Msg::NextTab => {
                let current = state.tabs.active_tab(ScreenId::CourseHub).unwrap_or(TabId::Overview);
                state.show_tab(current.next())
            }
            Msg::SelectUp => {
                state.selected = state.selected.saturating_sub(1);
                Command::None
            }
            Msg::SelectDown => {
                if state.selected + 1 < state.selectable_len() {
                    state.selected += 1;
                }
                Command::None
            }
            Msg::Activate => state.activate(),
            Msg::OpenLecture(target) => state.open_selected_lecture(target),

            Msg::LectureStatusLoaded(result) => {
                match result {
                    Ok(lecture) => {
                        let stopped = state.jobs.observe_listing(std::slice::from_ref(&lecture));
                        state.report_stopped_jobs(&stopped);
                    }
                    Err(error) => error.log("Checking analysis status"),
                }
                Command::None
            }
            Msg::AnalysisLoaded { lecture_id, result } => {
                if !state.on_lecture_screen(ScreenId::LectureAnalysis, &lecture_id) {
                    return Command::None;
                }
                if let Ok(analysis) = &result {
                    if let Some(error) = analysis.error() {
                        state.error(format!("Analysis failed: {}", error));
                    }
                    let insights = analysis.insights();
                    if !insights.is_empty() {
                        let html = render_insights(&insights);
                        state.router.content_mut().replace_panel(REFLECTIONS_PANEL, &html);
                    }
                }
                if let Some(error) = settle(&mut state.analysis, result) {
                    state.report(&error, "Loading analysis");
                }
                Command::None
            }
            Msg::ReflectionsLoaded { lecture_id, result } => {
                if state.on_lecture_screen(ScreenId::LectureAnalysis, &lecture_id) {
                    if let Some(error) = settle(&mut state.reflections, result) {
                        state.report(&error, "Loading reflections");
                    }
                }
                Command::None
            }
            Msg::MaterialsLoaded { lecture_id, result } => {
                if state.on_lecture_screen(ScreenId::LecturePlanning, &lecture_id) {
                    if let Some(error) = settle(&mut state.materials, result) {
                        state.report(&error, "Loading materials analysis");
                    }
                }
                Command::None
            }
            Msg::SurveysListed { lecture_id, result } => {
                if !state.on_lecture_screen(ScreenId::LectureAnalysis, &lecture_id) {
                    return Command::None;
                }
                match result {
                    Ok(surveys) => match surveys.last() {
                        Some(survey) => {
                            let origin = SurveyOrigin {
                                lecture_id,
                                course_id: state.router.session().current_course_id().map(str::to_string),
                            };
                            state.navigate(NavigationRequest::survey(survey.survey_id.clone(), Some(origin)))
                        }
                        None => {
                            state.notice("No survey has been generated for this lecture yet");
                            Command::None
                        }
                    },
                    Err(error) => {
                        state.report(&error, "Listing surveys");
                        Command::None
                    }
                }
            }
            Msg::SurveyLoaded { survey_id, result } => {
                if state.router.session().current_survey_id() == Some(survey_id.as_str()) {
                    if let Some(error) = settle(&mut state.survey, result) {
                        state.report(&error, "Loading survey");
                    }
                }
                Command::None
            }
            Msg::OpenLatestSurvey => match state.router.session().current_lecture_id().map(str::to_string) {
                Some(lecture_id) => state.list_lecture_surveys(lecture_id),
                None => state.precondition(PreconditionError::NoLectureSelected),
            },
            Msg::FocusInsight => {
                state.focus_insight();
                Command::None
            }
            Msg::RestoreInsights => {
                if !state.insights.restore(state.router.content_mut()) {
                    log::debug!("No reflections snapshot for this mount");
                }
                Command::None
            }
            Msg::ShowTopic => state.show_topic(),

            Msg::SubmitAnalysis => state.submit_analysis(),
            Msg::AnalysisSubmitted(ticket, result) => match state.jobs.resolve(&ticket, result) {
                JobResolution::Stale => Command::None,
                JobResolution::Completed(analysis) => {
                    state.notice("Analysis complete");
                    if !state.on_lecture_screen(ScreenId::LectureEdit, ticket.lecture_id()) {
                        // The owning screen is already gone
                        state.jobs.leave(ticket.lecture_id());
                        return Command::None;
                    }
                    state.analysis = Resource::Success(analysis);
                    match state.router.session().current_course_id().map(str::to_string) {
                        Some(course_id) => state.refetch_course(course_id),
                        None => state.navigate(NavigationRequest::nav(NavItem::Home)),
                    }
                }
                JobResolution::Processing { message } => {
                    state.notice(message.unwrap_or_else(|| {
                        "Analysis is running in the background. You can leave this screen.".to_string()
                    }));
                    Command::None
                }
                JobResolution::Failed(error) => {
                    state.error(format!("Analysis failed: {} Press s to try again.", error.user_message()));
                    Command::None
                }
            },
            Msg::ProgressTick => {
                state.last_tick = Instant::now();
                Command::None
            }

            Msg::ShowModal(modal) => {
                let action = state.modals.show(modal);
                state.apply_show(modal, action)
            }
            Msg::ModalLoaded(fetch, result) => match state.modals.mounted(&fetch, result) {
                ModalOutcome::Stale => Command::None,
                ModalOutcome::Failed(error) => {
                    state.surface(&error);
                    Command::None
                }
                ModalOutcome::Mounted { modal, focus } => State::emit(Msg::ModalMounted { modal, focus }),
            },
            Msg::ModalMounted { modal, focus } => {
                if state.modals.is_visible(modal) {
                    state.focus_modal(modal, focus)
                } else {
                    Command::None
                }
            }
            Msg::HideModal => state.hide_topmost_modal(),
            Msg::EditInput(target) => {
                let value = match &state.input {
                    Some(input) if input.target == target => input.value.clone(),
                    _ => String::new(),
                };
                state.input = Some(InputState { target, value });
                Command::set_focus(SCREEN_INPUT)
            }
            Msg::InputKey(key) => {
                if let Some(input) = &mut state.input {
                    match key {
                        KeyCode::Char(c) => input.value.push(c),
                        KeyCode::Backspace => {
                            input.value.pop();
                        }
                        _ => {}
                    }
                }
                Command::None
            }
            Msg::InputSubmitted => state.submit_input(),
            Msg::CourseCreated(result) => match result {
                Ok(course) => {
                    state.finish_modal(ModalId::AddClass);
                    state.notice(format!("Created {}", course.display_name()));
                    match state.router.current_screen() {
                        Some(ScreenId::Home) | Some(ScreenId::Courses) => state.fetch_courses(),
                        _ => Command::None,
                    }
                }
                Err(error) => {
                    state.report(&error, "Creating course");
                    Command::None
                }
            },
            Msg::LectureCreated(result) => match result {
                Ok(lecture) => {
                    state.input = None;
                    state.router.select_lecture(lecture.id.clone());
                    state.notice(format!("Created {}", lecture.title));
                    state.open_lecture(ScreenId::LectureEdit, lecture.id, Some(lecture.title))
                }
                Err(error) => {
                    state.report(&error, "Creating lecture");
                    Command::None
                }
            },
            Msg::AssignmentCreated(result) => match result {
                Ok(assignment) => {
                    state.finish_modal(ModalId::AddAssignment);
                    state.notice(format!("Added {}", assignment.title));
                    if state.tabs.is_visible(ScreenId::CourseHub, TabId::Assignments) {
                        state.fetch_assignments(assignment.class_id)
                    } else {
                        Command::None
                    }
                }
                Err(error) => {
                    state.report(&error, "Creating assignment");
                    Command::None
                }
            },
            Msg::FeedbackSent(result) => {
                match result {
                    Ok(()) => {
                        state.finish_modal(ModalId::Feedback);
                        state.notice("Feedback sent");
                    }
                    Err(error) => state.report(&error, "Sending feedback"),
                }
                Command::None
            }
            Msg::SurveyGenerated(result) => {
                match result {
                    Ok(survey) => {
                        state.finish_modal(ModalId::GenerateSurvey);
                        let link = survey.shareable_link.clone().unwrap_or_else(|| {
                            format!("{}/?{}={}", state.survey_base_url.trim_end_matches('/'), SURVEY_ID_PARAM, survey.survey_id)
                        });
                        state.notice(format!("Survey ready: {}", link));
                    }
                    Err(error) => state.report(&error, "Generating survey"),
                }
                Command::None
            }

            Msg::Escape => {
                if state.modals.topmost().is_some() {
                    return state.hide_topmost_modal();
                }
                if state.banner.take().is_some() {
                    if let Some(lecture_id) = &state.job_lecture {
                        state.jobs.acknowledge(lecture_id);
                    }
                }
                Command::None
            }
            Msg::Quit => Command::Quit,
        }
    }

    fn view(state: &mut State, theme: &Theme) -> Element<Msg> {
        view::render(state, theme)
    }

    fn subscriptions(state: &State) -> Vec<Subscription<Msg>> {
        let mut subs = vec![Subscription::keyboard(KeyCode::Esc, "Close", Msg::Escape)];

        if state.jobs.needs_tick() {
            subs.push(Subscription::timer(state.tick_interval, Msg::ProgressTick));
        }

        // Open modals capture the keyboard
        if state.modals.topmost().is_some() {
            return subs;
        }

        subs.push(Subscription::keyboard(KeyCode::Char('q'), "Quit", Msg::Quit));
        subs.push(Subscription::keyboard(KeyCode::Char('h'), "Home", Msg::Navigate(NavigationRequest::nav(NavItem::Home))));
        subs.push(Subscription::keyboard(
            KeyCode::Char('c'),
            "Courses",
            Msg::Navigate(NavigationRequest::nav(NavItem::Courses)),
        ));
        if state.router.back_visible() {
            subs.push(Subscription::keyboard(KeyCode::Backspace, "Back", Msg::GoBack));
        }

        let list_keys = |subs: &mut Vec<Subscription<Msg>>| {
            subs.push(Subscription::keyboard(KeyCode::Up, "Up", Msg::SelectUp));
            subs.push(Subscription::keyboard(KeyCode::Down, "Down", Msg::SelectDown));
            subs.push(Subscription::keyboard(KeyCode::Enter, "Open", Msg::Activate));
        };

        let session = state.router.session();
        match state.router.current_screen() {
            Some(ScreenId::Home) | Some(ScreenId::Courses) => {
                list_keys(&mut subs);
                subs.push(Subscription::keyboard(KeyCode::Char('a'), "Add class", Msg::ShowModal(ModalId::AddClass)));
            }
            Some(ScreenId::CourseHub) => {
                subs.push(Subscription::keyboard(KeyCode::Char(']'), "Next tab", Msg::NextTab));
                subs.push(Subscription::keyboard(KeyCode::Tab, "Next tab", Msg::NextTab));
                subs.push(Subscription::keyboard(KeyCode::Char('1'), "Overview", Msg::ShowTab(TabId::Overview)));
                subs.push(Subscription::keyboard(KeyCode::Char('2'), "Lectures", Msg::ShowTab(TabId::Lectures)));
                subs.push(Subscription::keyboard(KeyCode::Char('3'), "Assignments", Msg::ShowTab(TabId::Assignments)));
                subs.push(Subscription::keyboard(KeyCode::Char('n'), "New lecture", Msg::Navigate(NavigationRequest::to(ScreenId::AddLecture))));
                subs.push(Subscription::keyboard(KeyCode::Char('f'), "Feedback", Msg::ShowModal(ModalId::Feedback)));
                subs.push(Subscription::keyboard(KeyCode::Char('w'), "Homework", Msg::ShowModal(ModalId::Homework)));
                match state.tabs.active_tab(ScreenId::CourseHub) {
                    Some(TabId::Lectures) => {
                        list_keys(&mut subs);
                        subs.push(Subscription::keyboard(KeyCode::Char('e'), "Edit", Msg::OpenLecture(NavigationTarget::Edit)));
                        subs.push(Subscription::keyboard(KeyCode::Char('p'), "Plan", Msg::OpenLecture(NavigationTarget::Planning)));
                    }
                    Some(TabId::Assignments) => {
                        subs.push(Subscription::keyboard(KeyCode::Up, "Up", Msg::SelectUp));
                        subs.push(Subscription::keyboard(KeyCode::Down, "Down", Msg::SelectDown));
                        subs.push(Subscription::keyboard(
                            KeyCode::Char('a'),
                            "Add assignment",
                            Msg::ShowModal(ModalId::AddAssignment),
                        ));
                    }
                    _ => {}
                }
            }
            Some(ScreenId::AddLecture) => {
                subs.push(Subscription::keyboard(KeyCode::Char('t'), "Title", Msg::EditInput(InputTarget::LectureTitle)));
            }
            Some(ScreenId::LectureEdit) => {
                subs.push(Subscription::keyboard(KeyCode::Char('v'), "Video", Msg::EditInput(InputTarget::VideoPath)));
                subs.push(Subscription::keyboard(KeyCode::Char('s'), "Analyze", Msg::SubmitAnalysis));
                if let Some(lecture_id) = session.current_lecture_id() {
                    let course_id = session.current_course_id().map(str::to_string);
                    subs.push(Subscription::keyboard(
                        KeyCode::Char('r'),
                        "Results",
                        Msg::Navigate(NavigationRequest::lecture(ScreenId::LectureAnalysis, course_id, lecture_id, None)),
                    ));
                }
            }
            Some(ScreenId::LectureAnalysis) => {
                subs.push(Subscription::keyboard(KeyCode::Up, "Up", Msg::SelectUp));
                subs.push(Subscription::keyboard(KeyCode::Down, "Down", Msg::SelectDown));
                subs.push(Subscription::keyboard(KeyCode::Enter, "Focus insight", Msg::FocusInsight));
                subs.push(Subscription::keyboard(KeyCode::Char('r'), "All insights", Msg::RestoreInsights));
                subs.push(Subscription::keyboard(KeyCode::Char('t'), "Topic", Msg::ShowTopic));
                subs.push(Subscription::keyboard(KeyCode::Char('g'), "Survey", Msg::ShowModal(ModalId::GenerateSurvey)));
                subs.push(Subscription::keyboard(KeyCode::Char('y'), "Open survey", Msg::OpenLatestSurvey));
                subs.push(Subscription::keyboard(KeyCode::Char('f'), "Feedback", Msg::ShowModal(ModalId::Feedback)));
            }
            Some(ScreenId::LecturePlanning) => {
                subs.push(Subscription::keyboard(KeyCode::Char('m'), "Materials", Msg::EditInput(InputTarget::MaterialsPath)));
            }
            Some(ScreenId::Survey) | None => {}
        }

        subs
    }

    fn title() -> &'static str {
        "Praxis"
    }

    fn status(state: &State, theme: &Theme) -> Option<Line<'static>> {
        let mut spans = Vec::new();
        if let Some(screen) = state.router.current_screen() {
            spans.push(Span::styled(screen.title().to_string(), theme.muted()));
        }
        let processing = state.jobs.processing().len();
        if processing > 0 {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(format!("{} analysis running", processing), theme.pending()));
        }
        if spans.is_empty() { None } else { Some(Line::from(spans)) }
    }
}

impl State {
    fn on_mounted(&mut self, mounted: MountedScreen) -> Command<Msg> {
        if mounted.mount_generation != self.router.content().mount_generation() {
            log::debug!("Skipping entry plan for superseded mount #{}", mounted.mount_generation);
            return Command::None;
        }

        // Terminal job state belongs to the edit screen that showed it
        if let Some(lecture_id) = self.job_lecture.take() {
            self.jobs.leave(&lecture_id);
        }

        self.selected = 0;
        self.input = None;
        self.modals.hide_all();
        self.insights.clear();
        self.tabs.reset(mounted.screen);
        self.lectures = Resource::NotAsked;
        self.assignments = Resource::NotAsked;
        self.analysis = Resource::NotAsked;
        self.reflections = Resource::NotAsked;
        self.materials = Resource::NotAsked;
        self.survey = Resource::NotAsked;

        let hooks = self.router.entry_hooks(&mounted);
        Command::batch(vec![Command::clear_focus(), self.run_hooks(hooks)])
    }

    /// Lecture lists are tagged with the course they were fetched for
    fn wants_lectures_for(&self, course_id: Option<&str>) -> bool {
        match course_id {
            Some(_) => {
                self.router.current_screen() == Some(ScreenId::CourseHub)
                    && self.router.session().is_current_course(course_id)
            }
            None => self.router.current_screen() == Some(ScreenId::Home),
        }
    }

    /// A lecture-scoped result only applies while its screen and lecture are still current
    fn on_lecture_screen(&self, screen: ScreenId, lecture_id: &str) -> bool {
        let current = self.router.current_screen() == Some(screen)
            && self.router.session().current_lecture_id() == Some(lecture_id);
        if !current {
            log::debug!("Dropping {} result for lecture {}; no longer shown", screen, lecture_id);
        }
        current
    }

    fn report_stopped_jobs(&mut self, stopped: &[String]) {
        if let Some(lecture_id) = stopped.first() {
            self.error(format!(
                "Analysis for lecture {} stopped on the server without a result. Submit the video again to retry.",
                lecture_id
            ));
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.selectable_len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn precondition(&mut self, error: PreconditionError) -> Command<Msg> {
        self.report(&DashboardError::Precondition(error), "Action");
        Command::None
    }

    fn activate(&mut self) -> Command<Msg> {
        match self.router.current_screen() {
            Some(ScreenId::Home) | Some(ScreenId::Courses) => match self.selected_course().cloned() {
                Some(course) => self.navigate(NavigationRequest::course_hub(course, None)),
                None => Command::None,
            },
            Some(ScreenId::CourseHub) => {
                let target = match self.selected_lecture() {
                    Some(lecture) if lecture.has_analysis => NavigationTarget::Analysis,
                    Some(_) => NavigationTarget::Edit,
                    None => return Command::None,
                };
                self.open_selected_lecture(target)
            }
            _ => Command::None,
        }
    }

    fn open_selected_lecture(&mut self, target: NavigationTarget) -> Command<Msg> {
        let Some(lecture) = self.selected_lecture() else {
            return self.precondition(PreconditionError::NoLectureSelected);
        };
        let (lecture_id, title) = (lecture.id.clone(), lecture.title.clone());
        let screen = match target {
            NavigationTarget::Edit => ScreenId::LectureEdit,
            NavigationTarget::Analysis => ScreenId::LectureAnalysis,
            NavigationTarget::Planning => ScreenId::LecturePlanning,
        };
        self.open_lecture(screen, lecture_id, Some(title))
    }

    /// Narrow the reflections panel to the selected insight, keeping the full panel for later
    fn focus_insight(&mut self) {
        let Some(insight) = self
            .analysis
            .to_option()
            .and_then(|analysis| analysis.insights().into_iter().nth(self.selected))
        else {
            return;
        };
        self.insights.capture(self.router.content());
        let html = render_insights(std::slice::from_ref(&insight));
        let content = self.router.content_mut();
        if content.replace_panel(REFLECTIONS_PANEL, &html) {
            content.replace_panel(REFLECTIONS_TITLE, &escape(&insight.title));
        }
    }

    fn show_topic(&mut self) -> Command<Msg> {
        let topics = self.analysis.to_option().map(|a| a.topic_coverage()).unwrap_or_default();
        let Some(topic) = topics.get(self.selected).or(topics.first()) else {
            return Command::None;
        };
        let coverage = if topic.covered { "Covered in lecture" } else { "Not covered" };
        let html = format!(
            "<h3>{}</h3><p>{}</p><p>{}</p>",
            escape(&topic.topic),
            coverage,
            escape(&topic.notes)
        );
        let action = self.modals.show_generated(ModalId::TopicDetail, html);
        self.apply_show(ModalId::TopicDetail, action)
    }

    fn apply_show(&mut self, modal: ModalId, action: ShowAction) -> Command<Msg> {
        match action {
            ShowAction::Revealed { focus } => self.focus_modal(modal, focus),
            ShowAction::Fetch(fetch) => self.fetch_modal(fetch),
            ShowAction::AlreadyPending => {
                log::debug!("{} is already loading", modal);
                Command::None
            }
        }
    }

    fn focus_modal(&mut self, modal: ModalId, focus: Option<String>) -> Command<Msg> {
        match focus {
            Some(field) if takes_input(modal) => {
                log::debug!("Focusing {} in {}", field, modal);
                self.input = Some(InputState { target: InputTarget::Modal(modal), value: String::new() });
                Command::set_focus(MODAL_INPUT)
            }
            _ => Command::None,
        }
    }

    fn hide_topmost_modal(&mut self) -> Command<Msg> {
        match self.modals.topmost() {
            Some(modal) => {
                self.finish_modal(modal);
                Command::clear_focus()
            }
            None => Command::None,
        }
    }

    fn finish_modal(&mut self, modal: ModalId) {
        self.modals.hide(modal);
        if self.input.as_ref().is_some_and(|i| i.target == InputTarget::Modal(modal)) {
            self.input = None;
        }
    }

    fn submit_analysis(&mut self) -> Command<Msg> {
        let session = self.router.session();
        let lecture_id = session.current_lecture_id().map(str::to_string);
        let video = session.pending_video().cloned();
        let now = Instant::now();
        match self.jobs.submit(lecture_id.as_deref(), video.as_ref(), now) {
            Ok(ticket) => {
                let (Some(lecture_id), Some(video)) = (lecture_id, video) else {
                    return Command::None;
                };
                self.last_tick = now;
                self.notice(format!("Uploading {} for analysis", video.file_name()));
                self.submit_analysis_upload(lecture_id, video, ticket)
            }
            Err(error) => self.precondition(error),
        }
    }

    fn submit_input(&mut self) -> Command<Msg> {
        let Some(input) = self.input.clone() else {
            return Command::None;
        };
        let value = input.value.trim().to_string();
        if value.is_empty() && input.target != InputTarget::Modal(ModalId::GenerateSurvey) {
            return Command::None;
        }
        let session = self.router.session();
        let course_id = session.current_course_id().map(str::to_string);
        let lecture_id = session.current_lecture_id().map(str::to_string);

        match input.target {
            InputTarget::VideoPath => {
                let upload = PendingUpload::new(value);
                self.notice(format!("Staged {}. Press s to analyze.", upload.file_name()));
                self.router.stage_video(upload);
                self.input = None;
                Command::clear_focus()
            }
            InputTarget::MaterialsPath => {
                let Some(lecture_id) = lecture_id else {
                    return self.precondition(PreconditionError::NoLectureSelected);
                };
                let upload = PendingUpload::new(value);
                self.router.stage_materials(upload.clone());
                self.materials = Resource::Loading;
                self.input = None;
                Command::batch(vec![Command::clear_focus(), self.analyze_materials(lecture_id, upload)])
            }
            InputTarget::LectureTitle => {
                let Some(class_id) = course_id else {
                    return self.precondition(PreconditionError::NoCourse);
                };
                self.create_lecture(LectureDraft { class_id, title: value, ..Default::default() })
            }
            InputTarget::Modal(ModalId::AddClass) => {
                let (code, name) = match value.split_once(':') {
                    Some((code, name)) => (code.trim().to_string(), name.trim().to_string()),
                    None => (String::new(), value),
                };
                self.create_course(CourseDraft {
                    code,
                    name,
                    total_lectures: 0,
                    semester: String::new(),
                    description: String::new(),
                })
            }
            InputTarget::Modal(ModalId::AddAssignment) => {
                let Some(class_id) = course_id else {
                    return self.precondition(PreconditionError::NoCourse);
                };
                self.create_assignment(AssignmentDraft { class_id, title: value, ..Default::default() })
            }
            InputTarget::Modal(ModalId::Feedback) => {
                let Some(course_id) = course_id else {
                    return self.precondition(PreconditionError::NoCourse);
                };
                self.send_feedback(course_id, CourseFeedback { message: value, lecture_id })
            }
            InputTarget::Modal(ModalId::GenerateSurvey) => {
                let Some(lecture_id) = lecture_id else {
                    return self.precondition(PreconditionError::NoLectureSelected);
                };
                let professor_input = if value.is_empty() { None } else { Some(value) };
                self.generate_survey(lecture_id, SurveyRequest { professor_input })
            }
            InputTarget::Modal(modal) => {
                self.finish_modal(modal);
                Command::clear_focus()
            }
        }
    }
}

/// Modals whose first text field feeds an action
fn takes_input(modal: ModalId) -> bool {
    matches!(
        modal,
        ModalId::AddClass | ModalId::AddAssignment | ModalId::GenerateSurvey | ModalId::Feedback
    )
}

fn render_insights(insights: &[crate::api::Insight]) -> String {
    let items: String = insights
        .iter()
        .map(|insight| {
            format!(
                "<li><strong>{}</strong> {}</li>",
                escape(&insight.title),
                escape(&insight.description)
            )
        })
        .collect();
    format!("<ul>{}</ul>", items)
}
