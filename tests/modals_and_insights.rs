//! Overlay dialogs and the reflections panel drill-down

mod common;

use common::*;
use crossterm::event::KeyCode;

use praxis_dashboard::dashboard::{Freshness, ModalId, NavigationRequest, ScreenId};
use praxis_dashboard::dashboard::insight_cache::{REFLECTIONS_PANEL, REFLECTIONS_TITLE};
use praxis_dashboard::tui::apps::dashboard::{DashboardApp, InputTarget, Msg};
use praxis_dashboard::tui::{App, Subscription};

async fn on_lecture_analysis() -> Harness {
    let mut h = Harness::home().await;
    h.open(Msg::Navigate(NavigationRequest::lecture(
        ScreenId::LectureAnalysis,
        Some(SAMPLE_COURSE_ID.to_string()),
        "l1",
        Some("Lecture 1: Variables".to_string()),
    )))
    .await;
    h
}

fn type_text(h: &mut Harness, text: &str) {
    for c in text.chars() {
        h.send(Msg::InputKey(KeyCode::Char(c)));
    }
}

/// The add-class form is fetched fresh on every open; homework is fetched once
#[tokio::test]
async fn test_add_class_refetched_homework_reused() {
    let mut h = Harness::home().await;

    for _ in 0..2 {
        h.open(Msg::ShowModal(ModalId::AddClass)).await;
        assert!(h.state.modals.is_visible(ModalId::AddClass));
        h.open(Msg::HideModal).await;
        assert!(!h.state.modals.is_visible(ModalId::AddClass));

        h.open(Msg::ShowModal(ModalId::Homework)).await;
        assert!(h.state.modals.is_visible(ModalId::Homework));
        h.open(Msg::HideModal).await;
    }

    assert_eq!(h.templates.count("modals/add-class.html"), 2);
    assert!(h.templates.freshness_of("modals/add-class.html").iter().all(|f| matches!(f, Freshness::Bust(_))));
    assert_eq!(h.templates.count("modals/hw1.html"), 1);
    assert_eq!(h.templates.freshness_of("modals/hw1.html"), vec![Freshness::Cached]);
    // Hidden modals stay mounted
    assert!(h.state.modals.is_mounted(ModalId::Homework));
}

/// Opening a modal again while its template is loading issues no second fetch
#[tokio::test]
async fn test_pending_modal_is_not_fetched_twice() {
    let mut h = Harness::home().await;

    h.send(Msg::ShowModal(ModalId::Homework));
    h.send(Msg::ShowModal(ModalId::Homework));
    h.run().await;

    assert_eq!(h.templates.count("modals/hw1.html"), 1);
    assert_eq!(h.state.modals.visible(), vec![ModalId::Homework]);
}

/// A modal with a text field takes focus once mounted and captures the keyboard
#[tokio::test]
async fn test_modal_focuses_first_input() {
    let mut h = Harness::home().await;

    h.open(Msg::ShowModal(ModalId::AddClass)).await;

    assert_eq!(h.state.input.as_ref().map(|i| i.target), Some(InputTarget::Modal(ModalId::AddClass)));
    let subs = DashboardApp::subscriptions(&h.state);
    assert!(subs.iter().all(|sub| !matches!(sub, Subscription::Keyboard { key: KeyCode::Char('q'), .. })));

    h.send(Msg::Escape);
    assert!(h.state.modals.topmost().is_none());
    assert!(h.state.input.is_none());
}

/// Submitting the add-class form creates the course and reloads the list
#[tokio::test]
async fn test_add_class_creates_course() {
    let mut h = Harness::home().await;
    let listed = h.api.count("list_courses");

    h.open(Msg::ShowModal(ModalId::AddClass)).await;
    type_text(&mut h, "CS 300: Compilers");
    h.open(Msg::InputSubmitted).await;

    assert_eq!(h.api.calls().iter().filter(|c| *c == "create_course:Compilers").count(), 1);
    assert!(!h.state.modals.is_visible(ModalId::AddClass));
    assert!(h.state.input.is_none());
    assert_eq!(h.api.count("list_courses"), listed + 1);
    assert_eq!(h.state.courses.to_option().map(Vec::len), Some(3));
}

/// Navigating away closes every open modal
#[tokio::test]
async fn test_navigation_hides_modals() {
    let mut h = Harness::home().await;
    h.open(Msg::ShowModal(ModalId::Homework)).await;

    h.open(Msg::Navigate(NavigationRequest::nav(praxis_dashboard::dashboard::NavItem::Courses))).await;

    assert!(h.state.modals.visible().is_empty());
}

/// A dialog whose template arrives after the user moved on stays closed
#[tokio::test]
async fn test_late_modal_template_does_not_open_on_new_screen() {
    let mut h = Harness::home().await;

    h.send(Msg::ShowModal(ModalId::Homework));
    let late = h.take();
    h.open(Msg::Navigate(NavigationRequest::nav(praxis_dashboard::dashboard::NavItem::Courses))).await;
    for future in late {
        h.deliver(future).await;
    }
    h.run().await;

    assert_eq!(h.state.router.current_screen(), Some(ScreenId::Courses));
    assert!(h.state.modals.visible().is_empty());
    assert!(!h.state.modals.is_mounted(ModalId::Homework));
}

/// The topic modal shell is fetched once; its body is rewritten on every open
#[tokio::test]
async fn test_topic_detail_reuses_shell() {
    let mut h = on_lecture_analysis().await;

    h.open(Msg::ShowTopic).await;
    let body = |h: &Harness| {
        h.state
            .modals
            .instance(ModalId::TopicDetail)
            .and_then(|m| m.markup.element_inner("modal-topic-detail-body"))
            .map(str::to_string)
            .unwrap_or_default()
    };
    assert!(body(&h).contains("Variables"));

    h.open(Msg::HideModal).await;
    h.send(Msg::SelectDown);
    h.open(Msg::ShowTopic).await;

    assert!(body(&h).contains("Scope"));
    assert!(!body(&h).contains("Variables"));
    assert_eq!(h.templates.count("modals/topic-detail.html"), 1);
}

/// Analysis insights replace the panel's loading placeholder, escaped
#[tokio::test]
async fn test_insights_rendered_into_panel() {
    let h = on_lecture_analysis().await;

    let panel = h.panel(REFLECTIONS_PANEL).unwrap();
    assert!(panel.contains("Clear examples"));
    assert!(panel.contains("Pacing"));
    assert!(panel.contains("&lt;felt&gt;"));
    assert!(!panel.contains("Loading reflections"));
    // Heading carries the lecture title from the navigation
    assert!(h.state.router.content().markup().unwrap().as_str().contains("<h1>Lecture 1: Variables</h1>"));
}

/// Drilling into insights and coming back restores the panel exactly
#[tokio::test]
async fn test_insight_restore_is_byte_identical() {
    let mut h = on_lecture_analysis().await;
    let original = h.panel(REFLECTIONS_PANEL).unwrap();
    let title = h.panel(REFLECTIONS_TITLE).unwrap();

    h.send(Msg::SelectDown);
    h.send(Msg::FocusInsight);
    let focused = h.panel(REFLECTIONS_PANEL).unwrap();
    assert!(focused.contains("Pacing"));
    assert!(!focused.contains("Clear examples"));
    assert_eq!(h.panel(REFLECTIONS_TITLE).as_deref(), Some("Pacing"));

    // A second drill-down must not overwrite the saved panel
    h.send(Msg::SelectUp);
    h.send(Msg::FocusInsight);
    assert!(h.panel(REFLECTIONS_PANEL).unwrap().contains("Clear examples"));

    h.send(Msg::RestoreInsights);
    assert_eq!(h.panel(REFLECTIONS_PANEL), Some(original));
    assert_eq!(h.panel(REFLECTIONS_TITLE), Some(title));
}

/// A snapshot belongs to the mount it was taken from
#[tokio::test]
async fn test_insight_snapshot_not_carried_across_mounts() {
    let mut h = on_lecture_analysis().await;
    h.send(Msg::SelectDown);
    h.send(Msg::FocusInsight);
    assert!(h.state.insights.snapshot().is_some());

    h.open(Msg::Navigate(NavigationRequest::lecture(
        ScreenId::LectureAnalysis,
        Some(SAMPLE_COURSE_ID.to_string()),
        "l1",
        None,
    )))
    .await;
    assert!(h.state.insights.snapshot().is_none());

    let fresh = h.panel(REFLECTIONS_PANEL).unwrap();
    h.send(Msg::RestoreInsights);
    assert_eq!(h.panel(REFLECTIONS_PANEL), Some(fresh));
}
