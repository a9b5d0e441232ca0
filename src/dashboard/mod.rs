//! Navigation and async view-state orchestration
//!
//! These components hold all state about what is on screen. They perform no
//! I/O themselves: operations that need the network hand back a ticket or a
//! fetch request, and the caller reports the result back. The dashboard app in
//! `tui::apps::dashboard` does that wiring.

pub mod breadcrumb;
pub mod content;
pub mod insight_cache;
pub mod jobs;
pub mod markup;
pub mod modal_stack;
pub mod registry;
pub mod router;
pub mod session;
pub mod tabs;
pub mod templates;

pub use breadcrumb::{Breadcrumb, BreadcrumbResolver, BreadcrumbTicket};
pub use content::ContentRegion;
pub use insight_cache::{InsightPanelCache, InsightSnapshot};
pub use jobs::{AnalysisJob, AsyncJobTracker, JobResolution, JobStatus, JobTicket, progress_estimate};
pub use markup::Markup;
pub use modal_stack::{ModalFetch, ModalOutcome, ModalStack, ShowAction};
pub use registry::{ModalId, ModalPolicy, NavItem, ScreenId, TemplateKey};
pub use router::{
    BackPlan, EntryHook, History, HistoryEntry, MountedScreen, NavigationContext, NavigationRequest,
    NavigationTicket, Outcome, ScreenRouter,
};
pub use session::{SessionState, SurveyOrigin};
pub use tabs::{LectureListing, TabController, TabEntryEffect, TabId};
pub use templates::{CacheBust, Freshness, HttpTemplateSource, TemplateSource};
