//! Overlay dialogs
//!
//! An explicit registry of which modals are mounted and which are visible.
//! Fetching is left to the caller: `show` returns a [`ModalFetch`] when a
//! template is needed and the result comes back through [`ModalStack::mounted`].

use std::collections::HashMap;

use crate::dashboard::markup::Markup;
use crate::dashboard::registry::{ModalId, ModalPolicy, TemplateKey};
use crate::dashboard::templates::Freshness;
use crate::error::DashboardError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalInstance {
    pub markup: Markup,
    pub visible: bool,
}

/// A template request issued by `show`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalFetch {
    pub modal: ModalId,
    pub key: TemplateKey,
    pub freshness: Freshness,
    token: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowAction {
    /// Already mounted; now visible. Focus the given input right away.
    Revealed { focus: Option<String> },
    /// A template fetch is required
    Fetch(ModalFetch),
    /// A fetch for this modal is already underway
    AlreadyPending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalOutcome {
    Stale,
    Failed(DashboardError),
    /// Mounted and visible. Focus is applied once the mounted message is processed.
    Mounted { modal: ModalId, focus: Option<String> },
}

#[derive(Debug, Default)]
pub struct ModalStack {
    instances: HashMap<ModalId, ModalInstance>,
    /// Mount order, which is also stacking order
    order: Vec<ModalId>,
    pending: HashMap<ModalId, u64>,
    generated: HashMap<ModalId, String>,
    next_token: u64,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Element id whose content is overwritten on each open of a generated-content modal
    pub fn content_slot(modal: ModalId) -> String {
        format!("{}-body", modal.as_str())
    }

    pub fn show(&mut self, modal: ModalId) -> ShowAction {
        match modal.policy() {
            ModalPolicy::EvictOnShow => {
                if self.unmount(modal) {
                    log::debug!("Evicted {} before showing it again", modal);
                }
                ShowAction::Fetch(self.issue_fetch(modal))
            }
            ModalPolicy::Reusable | ModalPolicy::GeneratedContent => {
                if let Some(instance) = self.instances.get_mut(&modal) {
                    instance.visible = true;
                    let focus = instance.markup.first_text_input();
                    return ShowAction::Revealed { focus };
                }
                if self.pending.contains_key(&modal) {
                    return ShowAction::AlreadyPending;
                }
                ShowAction::Fetch(self.issue_fetch(modal))
            }
        }
    }

    /// Open a generated-content modal with `html` as its body. The shell is only
    /// fetched the first time.
    pub fn show_generated(&mut self, modal: ModalId, html: impl Into<String>) -> ShowAction {
        if modal.policy() != ModalPolicy::GeneratedContent {
            log::error!("{} does not take generated content", modal);
            return self.show(modal);
        }
        let html = html.into();
        if let Some(instance) = self.instances.get_mut(&modal) {
            if !instance.markup.set_element_inner(&Self::content_slot(modal), &html) {
                log::warn!("{} has no content slot", modal);
            }
        } else {
            self.generated.insert(modal, html);
        }
        self.show(modal)
    }

    /// Apply a finished template fetch
    pub fn mounted(&mut self, fetch: &ModalFetch, result: Result<Markup, DashboardError>) -> ModalOutcome {
        if self.pending.get(&fetch.modal) != Some(&fetch.token) {
            log::debug!("Dropping stale template for {}", fetch.modal);
            return ModalOutcome::Stale;
        }
        self.pending.remove(&fetch.modal);

        let mut markup = match result {
            Ok(markup) => markup,
            Err(e) => {
                e.log(&format!("Loading {}", fetch.modal));
                return ModalOutcome::Failed(e);
            }
        };

        if let Some(html) = self.generated.remove(&fetch.modal) {
            markup.set_element_inner(&Self::content_slot(fetch.modal), &html);
        }

        let focus = markup.first_text_input();
        self.order.retain(|m| *m != fetch.modal);
        self.order.push(fetch.modal);
        self.instances.insert(fetch.modal, ModalInstance { markup, visible: true });
        ModalOutcome::Mounted { modal: fetch.modal, focus }
    }

    /// Hide without unmounting
    pub fn hide(&mut self, modal: ModalId) {
        if let Some(instance) = self.instances.get_mut(&modal) {
            instance.visible = false;
        }
    }

    /// Hide every modal and drop fetches still underway, so a template that
    /// lands after this call is discarded instead of opening over a new screen
    pub fn hide_all(&mut self) {
        for instance in self.instances.values_mut() {
            instance.visible = false;
        }
        if !self.pending.is_empty() {
            log::debug!("Cancelling {} pending modal fetch(es)", self.pending.len());
            self.pending.clear();
            self.generated.clear();
        }
    }

    pub fn is_mounted(&self, modal: ModalId) -> bool {
        self.instances.contains_key(&modal)
    }

    pub fn is_visible(&self, modal: ModalId) -> bool {
        self.instances.get(&modal).is_some_and(|i| i.visible)
    }

    pub fn instance(&self, modal: ModalId) -> Option<&ModalInstance> {
        self.instances.get(&modal)
    }

    /// Visible modals, bottom to top
    pub fn visible(&self) -> Vec<ModalId> {
        self.order.iter().copied().filter(|m| self.is_visible(*m)).collect()
    }

    pub fn topmost(&self) -> Option<ModalId> {
        self.visible().last().copied()
    }

    fn unmount(&mut self, modal: ModalId) -> bool {
        self.order.retain(|m| *m != modal);
        self.instances.remove(&modal).is_some()
    }

    fn issue_fetch(&mut self, modal: ModalId) -> ModalFetch {
        self.next_token += 1;
        self.pending.insert(modal, self.next_token);
        ModalFetch {
            modal,
            key: modal.template_key(),
            freshness: Freshness::for_modal(modal),
            token: self.next_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch_of(action: ShowAction) -> ModalFetch {
        match action {
            ShowAction::Fetch(fetch) => fetch,
            other => panic!("expected a fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_reusable_modal_fetched_once() {
        let mut stack = ModalStack::new();
        let fetch = fetch_of(stack.show(ModalId::Homework));
        assert_eq!(fetch.freshness, Freshness::Cached);
        stack.mounted(&fetch, Ok(Markup::new(r#"<input id="hw-title">"#)));
        stack.hide(ModalId::Homework);
        assert!(stack.is_mounted(ModalId::Homework));
        assert!(!stack.is_visible(ModalId::Homework));

        assert_eq!(stack.show(ModalId::Homework), ShowAction::Revealed { focus: Some("hw-title".into()) });
    }

    #[test]
    fn test_reusable_show_while_pending_does_not_refetch() {
        let mut stack = ModalStack::new();
        fetch_of(stack.show(ModalId::Feedback));
        assert_eq!(stack.show(ModalId::Feedback), ShowAction::AlreadyPending);
    }

    #[test]
    fn test_evict_on_show_always_fetches() {
        let mut stack = ModalStack::new();
        let first = fetch_of(stack.show(ModalId::AddClass));
        assert!(matches!(first.freshness, Freshness::Bust(_)));
        stack.mounted(&first, Ok(Markup::new("<p>v1</p>")));

        let second = fetch_of(stack.show(ModalId::AddClass));
        assert!(!stack.is_mounted(ModalId::AddClass));
        assert_eq!(stack.mounted(&first, Ok(Markup::new("<p>late</p>"))), ModalOutcome::Stale);
        stack.mounted(&second, Ok(Markup::new("<p>v2</p>")));
        assert_eq!(stack.instance(ModalId::AddClass).unwrap().markup.as_str(), "<p>v2</p>");
    }

    #[test]
    fn test_generated_content_overwrites_body() {
        let mut stack = ModalStack::new();
        let fetch = fetch_of(stack.show_generated(ModalId::TopicDetail, "<p>Recursion</p>"));
        let shell = r#"<div id="modal-topic-detail"><div id="modal-topic-detail-body"></div></div>"#;
        stack.mounted(&fetch, Ok(Markup::new(shell)));
        assert!(stack.instance(ModalId::TopicDetail).unwrap().markup.contains("Recursion"));

        stack.hide(ModalId::TopicDetail);
        let action = stack.show_generated(ModalId::TopicDetail, "<p>Sorting</p>");
        assert!(matches!(action, ShowAction::Revealed { .. }));
        let markup = &stack.instance(ModalId::TopicDetail).unwrap().markup;
        assert!(markup.contains("Sorting"));
        assert!(!markup.contains("Recursion"));
    }

    #[test]
    fn test_hide_all_and_stacking_order() {
        let mut stack = ModalStack::new();
        let a = fetch_of(stack.show(ModalId::Homework));
        let b = fetch_of(stack.show(ModalId::Feedback));
        stack.mounted(&b, Ok(Markup::new("<p>b</p>")));
        stack.mounted(&a, Ok(Markup::new("<p>a</p>")));
        assert_eq!(stack.visible(), vec![ModalId::Feedback, ModalId::Homework]);
        assert_eq!(stack.topmost(), Some(ModalId::Homework));

        stack.hide_all();
        assert!(stack.visible().is_empty());
        assert!(stack.is_mounted(ModalId::Feedback));
    }

    #[test]
    fn test_hide_all_cancels_pending_fetches() {
        let mut stack = ModalStack::new();
        let late = fetch_of(stack.show(ModalId::Homework));

        stack.hide_all();

        assert_eq!(stack.mounted(&late, Ok(Markup::new("<p>hw</p>"))), ModalOutcome::Stale);
        assert!(!stack.is_mounted(ModalId::Homework));
        assert!(stack.visible().is_empty());
        // The modal can be opened again afterwards
        assert!(matches!(stack.show(ModalId::Homework), ShowAction::Fetch(_)));
    }

    #[test]
    fn test_failed_fetch_leaves_nothing_mounted() {
        let mut stack = ModalStack::new();
        let fetch = fetch_of(stack.show(ModalId::GenerateSurvey));
        let outcome = stack.mounted(&fetch, Err(DashboardError::Network("404".into())));
        assert!(matches!(outcome, ModalOutcome::Failed(_)));
        assert!(!stack.is_mounted(ModalId::GenerateSurvey));
        assert!(matches!(stack.show(ModalId::GenerateSurvey), ShowAction::Fetch(_)));
    }
}
