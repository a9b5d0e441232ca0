use crate::tui::{Command, Element, Subscription, Theme};
use ratatui::text::Line;

/// The main trait that all TUI apps must implement.
///
/// This follows the Elm architecture:
/// - State: data that represents the app's current state
/// - Msg: events/actions that can happen
/// - update: handles one message at a time and returns commands
/// - view: renders the current state
/// - subscriptions: declares what inputs the app wants to receive
pub trait App: Sized + Send + 'static {
    /// The app's state type
    type State: Send;

    /// The app's message type
    type Msg: Clone + Send + 'static;

    /// Everything the app needs to build its initial state
    type InitParams;

    /// Build the initial state and the command to run first
    fn init(params: Self::InitParams) -> (Self::State, Command<Self::Msg>);

    /// Update the state based on a message and return a command
    fn update(state: &mut Self::State, msg: Self::Msg) -> Command<Self::Msg>;

    /// Render the current state to UI elements
    /// Note: Takes &mut for internal optimizations (e.g., cache rebuilds)
    fn view(state: &mut Self::State, theme: &Theme) -> Element<Self::Msg>;

    /// Declare what inputs this app wants to receive
    fn subscriptions(state: &Self::State) -> Vec<Subscription<Self::Msg>>;

    /// Return the app's title (static string for help menu, etc.)
    fn title() -> &'static str;

    /// Return optional status text (dynamic, styled based on state)
    fn status(_state: &Self::State, _theme: &Theme) -> Option<Line<'static>> {
        None
    }
}
