//! Screen navigation
//!
//! Navigation is split in two so the fetch can happen outside the router:
//! [`ScreenRouter::begin`] hands out a ticket carrying a generation number,
//! and [`ScreenRouter::complete`] applies the fetched template only if that
//! ticket is still the latest. Nothing visible changes before `complete`.

use crate::api::{Course, PendingUpload};
use crate::dashboard::content::ContentRegion;
use crate::dashboard::markup::Markup;
use crate::dashboard::registry::{NavItem, ScreenId, TemplateKey};
use crate::dashboard::session::{SessionState, SurveyOrigin};
use crate::dashboard::tabs::TabId;
use crate::error::{DashboardError, Result};

/// Data handed to a navigation call. Lives only as long as the screen it was mounted with.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationContext {
    Course(Course),
    Lecture {
        course_id: Option<String>,
        lecture_id: String,
        title: Option<String>,
    },
    Survey {
        survey_id: String,
        origin: Option<SurveyOrigin>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationRequest {
    pub screen: ScreenId,
    pub nav: Option<NavItem>,
    pub context: Option<NavigationContext>,
    pub tab: Option<TabId>,
}

impl NavigationRequest {
    pub fn to(screen: ScreenId) -> Self {
        Self { screen, nav: None, context: None, tab: None }
    }

    /// Top-level navigation from a nav element
    pub fn nav(item: NavItem) -> Self {
        Self::to(item.screen()).with_nav(item)
    }

    pub fn course_hub(course: Course, tab: Option<TabId>) -> Self {
        Self {
            screen: ScreenId::CourseHub,
            nav: None,
            context: Some(NavigationContext::Course(course)),
            tab,
        }
    }

    pub fn lecture(screen: ScreenId, course_id: Option<String>, lecture_id: impl Into<String>, title: Option<String>) -> Self {
        Self::to(screen).with_context(NavigationContext::Lecture {
            course_id,
            lecture_id: lecture_id.into(),
            title,
        })
    }

    pub fn survey(survey_id: impl Into<String>, origin: Option<SurveyOrigin>) -> Self {
        Self::to(ScreenId::Survey).with_context(NavigationContext::Survey {
            survey_id: survey_id.into(),
            origin,
        })
    }

    pub fn with_nav(mut self, nav: NavItem) -> Self {
        self.nav = Some(nav);
        self
    }

    pub fn with_context(mut self, context: NavigationContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_tab(mut self, tab: TabId) -> Self {
        self.tab = Some(tab);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationTicket {
    generation: u64,
    request: NavigationRequest,
}

impl NavigationTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn screen(&self) -> ScreenId {
        self.request.screen
    }

    pub fn key(&self) -> TemplateKey {
        self.request.screen.template_key()
    }

    pub fn request(&self) -> &NavigationRequest {
        &self.request
    }
}

/// A screen that finished mounting
#[derive(Debug, Clone, PartialEq)]
pub struct MountedScreen {
    pub screen: ScreenId,
    pub mount_generation: u64,
    pub tab: Option<TabId>,
    pub context: Option<NavigationContext>,
    pub back_visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A newer navigation was started; nothing changed
    Stale,
    /// The template could not be loaded; the previous screen is still mounted
    Failed(DashboardError),
    Mounted(MountedScreen),
}

/// Work a screen needs once it is mounted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryHook {
    RefreshCourses,
    RefreshLectures { course_id: Option<String> },
    ShowTab(TabId),
    ClearPendingUploads,
    CheckAnalysisJob { lecture_id: String },
    LoadAnalysis { lecture_id: String },
    LoadReflections { lecture_id: String },
    LoadMaterials { lecture_id: String },
    LoadSurvey { survey_id: String },
    ResolveBreadcrumb { course_id: String },
}

/// Result of asking to go back
#[derive(Debug, Clone, PartialEq)]
pub enum BackPlan {
    Navigate(NavigationRequest),
    /// Fetch the course, then navigate with [`BackPlan::course_hub`]
    RefetchCourse { course_id: String },
}

impl BackPlan {
    /// Where a lecture view returns to once its course has been re-fetched
    pub fn course_hub(course: Course) -> NavigationRequest {
        NavigationRequest::course_hub(course, Some(TabId::Lectures))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub screen: ScreenId,
    pub course_id: Option<String>,
    pub lecture_id: Option<String>,
}

impl Default for HistoryEntry {
    fn default() -> Self {
        Self { screen: ScreenId::Home, course_id: None, lecture_id: None }
    }
}

/// Screens visited in this session, most recent last
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Oldest entries are dropped past this many
    pub const LIMIT: usize = 32;

    /// Record a mount. Reaching a root screen starts a fresh trail.
    pub fn push(&mut self, entry: HistoryEntry) {
        if entry.screen.is_root() {
            self.entries.clear();
        }
        self.entries.push(entry);
        if self.entries.len() > Self::LIMIT {
            let excess = self.entries.len() - Self::LIMIT;
            self.entries.drain(..excess);
        }
    }

    /// Consume one entry; an exhausted history yields the home screen
    pub fn pop(&mut self) -> HistoryEntry {
        self.entries.pop().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }
}

/// Back button is hidden on root screens and on the course hub without a course
pub fn back_visible(screen: ScreenId, context: Option<&NavigationContext>) -> bool {
    let bare_hub = screen == ScreenId::CourseHub && !matches!(context, Some(NavigationContext::Course(_)));
    !(screen.is_root() || bare_hub)
}

pub struct ScreenRouter {
    generation: u64,
    content: ContentRegion,
    session: SessionState,
    context: Option<NavigationContext>,
    active_nav: Option<NavItem>,
    back_visible: bool,
    history: History,
    sample_course_id: String,
}

impl ScreenRouter {
    /// `sample_course_id` identifies the course the stock templates describe;
    /// any other course is treated as blank.
    pub fn new(sample_course_id: impl Into<String>) -> Self {
        Self {
            generation: 0,
            content: ContentRegion::new(),
            session: SessionState::new(),
            context: None,
            active_nav: None,
            back_visible: false,
            history: History::default(),
            sample_course_id: sample_course_id.into(),
        }
    }

    pub fn content(&self) -> &ContentRegion {
        &self.content
    }

    /// Panel-level access for components that own a panel of the mounted screen
    pub fn content_mut(&mut self) -> &mut ContentRegion {
        &mut self.content
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn current_screen(&self) -> Option<ScreenId> {
        self.content.screen()
    }

    pub fn context(&self) -> Option<&NavigationContext> {
        self.context.as_ref()
    }

    pub fn active_nav(&self) -> Option<NavItem> {
        self.active_nav
    }

    pub fn back_visible(&self) -> bool {
        self.back_visible
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_blank_course(&self, course: &Course) -> bool {
        course.id != self.sample_course_id
    }

    /// Start a navigation. Supersedes every ticket issued before.
    pub fn begin(&mut self, request: NavigationRequest) -> NavigationTicket {
        self.generation += 1;
        log::debug!("Navigation #{} to {} requested", self.generation, request.screen);
        NavigationTicket { generation: self.generation, request }
    }

    /// Start a navigation from a string id. Unknown ids are logged and change nothing.
    pub fn begin_by_id(&mut self, id: &str) -> Option<NavigationTicket> {
        match id.parse::<ScreenId>() {
            Ok(screen) => Some(self.begin(NavigationRequest::to(screen))),
            Err(e) => {
                e.log("Navigation");
                None
            }
        }
    }

    pub fn is_latest(&self, ticket: &NavigationTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply a fetched template for `ticket`
    pub fn complete(&mut self, ticket: NavigationTicket, result: Result<Markup>) -> Outcome {
        if !self.is_latest(&ticket) {
            log::debug!(
                "Discarding navigation #{} to {}; #{} is newer",
                ticket.generation,
                ticket.request.screen,
                self.generation
            );
            return Outcome::Stale;
        }

        let mut markup = match result {
            Ok(markup) => markup,
            Err(e) => {
                e.log(&format!("Loading {}", ticket.request.screen));
                return Outcome::Failed(e);
            }
        };

        let NavigationRequest { screen, nav, context, tab } = ticket.request;
        self.substitute(screen, context.as_ref(), &mut markup);

        let previous = self.content.screen();
        let mount_generation = self.content.swap(screen, markup);

        self.session.set_screen(screen);
        match &context {
            Some(NavigationContext::Course(course)) => self.session.set_course(course.id.clone()),
            Some(NavigationContext::Lecture { course_id, lecture_id, .. }) => {
                if let Some(course_id) = course_id {
                    self.session.set_course(course_id.clone());
                }
                self.session.set_lecture(lecture_id.clone());
            }
            Some(NavigationContext::Survey { survey_id, origin }) => {
                self.session.set_survey(survey_id.clone(), origin.clone());
            }
            None => {}
        }

        if let Some(nav) = nav {
            self.active_nav = Some(nav);
        }
        self.back_visible = back_visible(screen, context.as_ref());
        self.history.push(HistoryEntry {
            screen,
            course_id: self.session.current_course_id().map(str::to_string),
            lecture_id: self.session.current_lecture_id().map(str::to_string),
        });
        self.context = context.clone();

        log::info!(
            "Mounted {} (was {})",
            screen,
            previous.map(|s| s.as_str()).unwrap_or("nothing")
        );

        Outcome::Mounted(MountedScreen {
            screen,
            mount_generation,
            tab,
            context,
            back_visible: self.back_visible,
        })
    }

    /// Heading substitution and placeholder removal for context-sensitive screens
    fn substitute(&self, screen: ScreenId, context: Option<&NavigationContext>, markup: &mut Markup) {
        match (screen, context) {
            (ScreenId::CourseHub, Some(NavigationContext::Course(course))) => {
                markup.replace_heading(&course.display_name());
                if self.is_blank_course(course) {
                    let removed = markup.strip_placeholders();
                    log::debug!("Removed {} sample sections for course {}", removed, course.id);
                }
            }
            (s, Some(NavigationContext::Lecture { title: Some(title), .. })) if s.is_lecture_view() => {
                markup.replace_heading(title);
            }
            _ => {}
        }
    }

    /// What the freshly mounted screen needs to do. Running the plan twice
    /// replaces list contents rather than appending to them.
    pub fn entry_hooks(&self, mounted: &MountedScreen) -> Vec<EntryHook> {
        let course_id = self.session.current_course_id().map(str::to_string);
        let lecture_id = self.session.current_lecture_id().map(str::to_string);
        let breadcrumb = course_id
            .clone()
            .map(|course_id| EntryHook::ResolveBreadcrumb { course_id });

        let mut hooks = Vec::new();
        match mounted.screen {
            ScreenId::Home => {
                hooks.push(EntryHook::RefreshCourses);
                hooks.push(EntryHook::RefreshLectures { course_id: None });
            }
            ScreenId::Courses => hooks.push(EntryHook::RefreshCourses),
            ScreenId::CourseHub => {
                hooks.push(EntryHook::ShowTab(mounted.tab.unwrap_or(TabId::Overview)));
                hooks.extend(breadcrumb);
            }
            ScreenId::AddLecture => {
                hooks.push(EntryHook::ClearPendingUploads);
                hooks.extend(breadcrumb);
            }
            ScreenId::LectureEdit => {
                if let Some(lecture_id) = lecture_id {
                    hooks.push(EntryHook::CheckAnalysisJob { lecture_id });
                }
                hooks.extend(breadcrumb);
            }
            ScreenId::LectureAnalysis => {
                if let Some(lecture_id) = lecture_id {
                    hooks.push(EntryHook::LoadAnalysis { lecture_id: lecture_id.clone() });
                    hooks.push(EntryHook::LoadReflections { lecture_id });
                }
                hooks.extend(breadcrumb);
            }
            ScreenId::LecturePlanning => {
                if let Some(lecture_id) = lecture_id {
                    hooks.push(EntryHook::LoadMaterials { lecture_id });
                }
                hooks.extend(breadcrumb);
            }
            ScreenId::Survey => {
                if let Some(survey_id) = self.session.current_survey_id() {
                    hooks.push(EntryHook::LoadSurvey { survey_id: survey_id.to_string() });
                }
            }
        }
        hooks
    }

    /// Decide where "back" leads from the current screen
    pub fn go_back(&mut self) -> BackPlan {
        let current = self.content.screen();
        self.history.pop();

        if current == Some(ScreenId::Survey) {
            if let Some(origin) = self.session.take_survey_origin() {
                log::debug!("Back from survey to analysis of lecture {}", origin.lecture_id);
                return BackPlan::Navigate(NavigationRequest::lecture(
                    ScreenId::LectureAnalysis,
                    origin.course_id,
                    origin.lecture_id,
                    None,
                ));
            }
        }

        if current.is_some_and(|screen| screen.is_lecture_view()) {
            if let Some(course_id) = self.session.current_course_id() {
                log::debug!("Back from lecture view to course {}", course_id);
                return BackPlan::RefetchCourse { course_id: course_id.to_string() };
            }
        }

        BackPlan::Navigate(NavigationRequest::nav(NavItem::Home))
    }

    pub fn stage_video(&mut self, upload: PendingUpload) {
        self.session.stage_video(upload);
    }

    pub fn stage_materials(&mut self, upload: PendingUpload) {
        self.session.stage_materials(upload);
    }

    pub fn clear_pending_uploads(&mut self) {
        self.session.clear_pending_uploads();
    }

    /// Select a lecture without navigating, e.g. after creating it on the add-lecture screen
    pub fn select_lecture(&mut self, lecture_id: impl Into<String>) {
        self.session.set_lecture(lecture_id);
    }
}
