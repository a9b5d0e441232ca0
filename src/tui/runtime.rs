use anyhow::{Context as _, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use std::collections::HashMap;
use std::io;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use crate::tui::command::PendingMsg;
use crate::tui::element::FocusId;
use crate::tui::renderer::FocusRegistry;
use crate::tui::{App, Command, Renderer, Subscription, Theme};

/// The runtime manages app lifecycle, event routing, and command execution.
///
/// Messages are handled strictly one at a time; async work only re-enters the
/// app as a message once its future has resolved.
pub struct Runtime<A: App> {
    /// Current app state
    state: A::State,

    theme: Theme,

    /// Focus registry for keyboard focus
    focus_registry: FocusRegistry<A::Msg>,

    /// Currently focused element ID
    focused_id: Option<FocusId>,

    /// Keyboard subscriptions
    key_subscriptions: HashMap<KeyCode, A::Msg>,

    /// Timer subscriptions: (interval, last_tick, msg)
    timers: Vec<(Duration, Instant, A::Msg)>,

    /// Pending async commands
    pending_async: Vec<PendingMsg<A::Msg>>,

    quit: bool,
}

impl<A: App> Runtime<A> {
    pub fn new(params: A::InitParams) -> Self {
        let (state, init_command) = A::init(params);

        let mut runtime = Self {
            state,
            theme: Theme::default(),
            focus_registry: FocusRegistry::new(),
            focused_id: None,
            key_subscriptions: HashMap::new(),
            timers: Vec::new(),
            pending_async: Vec::new(),
            quit: false,
        };

        runtime.update_subscriptions();
        runtime.execute_command(init_command);
        runtime
    }

    /// Get a reference to the app's state
    pub fn state(&self) -> &A::State {
        &self.state
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Get keyboard bindings for the help line
    pub fn key_bindings(&self) -> Vec<(KeyCode, String)> {
        A::subscriptions(&self.state)
            .into_iter()
            .filter_map(|sub| match sub {
                Subscription::Keyboard { key, description, .. } => Some((key, description)),
                _ => None,
            })
            .collect()
    }

    /// Run one message through update and apply the resulting command
    pub fn dispatch(&mut self, msg: A::Msg) {
        let command = A::update(&mut self.state, msg);
        self.execute_command(command);
        self.update_subscriptions();
    }

    /// Poll timer subscriptions and fire those that are ready
    pub fn poll_timers(&mut self) {
        let now = Instant::now();
        let mut messages = Vec::new();

        for (interval, last_tick, msg) in &mut self.timers {
            if now.duration_since(*last_tick) >= *interval {
                messages.push(msg.clone());
                *last_tick = now;
            }
        }

        for msg in messages {
            self.dispatch(msg);
        }
    }

    /// Poll pending async commands and process completed ones
    pub fn poll_async(&mut self) {
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);

        let mut completed = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending_async.len());
        for mut future in self.pending_async.drain(..) {
            match future.as_mut().poll(&mut cx) {
                Poll::Ready(msg) => completed.push(msg),
                Poll::Pending => still_pending.push(future),
            }
        }
        self.pending_async = still_pending;

        // In completion order; each message sees the state left by the previous one
        for msg in completed {
            self.dispatch(msg);
        }
    }

    /// Recompute subscriptions from state. Timers that are still requested keep their phase.
    fn update_subscriptions(&mut self) {
        let previous: Vec<(Duration, Instant)> = self.timers.iter().map(|(i, t, _)| (*i, *t)).collect();
        self.key_subscriptions.clear();
        self.timers.clear();

        for sub in A::subscriptions(&self.state) {
            match sub {
                Subscription::Keyboard { key, msg, description: _ } => {
                    self.key_subscriptions.insert(key, msg);
                }
                Subscription::Timer { interval, msg } => {
                    let last_tick = previous
                        .iter()
                        .find(|(i, _)| *i == interval)
                        .map(|(_, t)| *t)
                        .unwrap_or_else(Instant::now);
                    self.timers.push((interval, last_tick, msg));
                }
            }
        }
    }

    /// Handle a keyboard event
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if key_event.kind != KeyEventKind::Press {
            return;
        }

        // Escape blurs the focused element before reaching the app
        if key_event.code == KeyCode::Esc && self.focused_id.take().is_some() {
            return;
        }

        if let Some(focused_id) = &self.focused_id {
            if let Some(focusable) = self.focus_registry.find_in_active_layer(focused_id) {
                if let Some(msg) = (focusable.on_key)(key_event.code) {
                    self.dispatch(msg);
                    return;
                }
            }
        }

        if let Some(msg) = self.key_subscriptions.get(&key_event.code).cloned() {
            self.dispatch(msg);
        }
    }

    /// Focus the next element (Tab). Returns false when there is nothing to focus.
    pub fn focus_next(&mut self) -> bool {
        let focusable_ids = self.focus_registry.focusable_ids_in_active_layer();
        if focusable_ids.is_empty() {
            return false;
        }

        let next_id = match &self.focused_id {
            Some(current_id) => match focusable_ids.iter().position(|id| id == current_id) {
                Some(pos) => focusable_ids[(pos + 1) % focusable_ids.len()].clone(),
                None => focusable_ids[0].clone(),
            },
            None => focusable_ids[0].clone(),
        };
        self.focused_id = Some(next_id);
        true
    }

    /// Execute a command
    fn execute_command(&mut self, command: Command<A::Msg>) {
        match command {
            Command::None => {}
            Command::Batch(commands) => {
                for cmd in commands {
                    self.execute_command(cmd);
                }
            }
            Command::Quit => self.quit = true,
            Command::Perform(future) => self.pending_async.push(future),
            Command::SetFocus(id) => self.focused_id = Some(id),
            Command::ClearFocus => self.focused_id = None,
        }
    }

    /// Render the app with a title bar and key hints
    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1), Constraint::Length(1)])
            .split(frame.area());

        self.render_header(frame, chunks[0]);

        self.focus_registry.clear();
        let view = A::view(&mut self.state, &self.theme);
        Renderer::render(
            frame,
            &self.theme,
            &mut self.focus_registry,
            self.focused_id.as_ref(),
            &view,
            chunks[1],
        );

        // Element removed while focused, clear focus
        if let Some(focused_id) = &self.focused_id {
            if !self.focus_registry.contains(focused_id) {
                self.focused_id = None;
            }
        }

        self.render_key_hints(frame, chunks[2]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(format!(" {} ", A::title()), self.theme.heading())];
        if let Some(status) = A::status(&self.state, &self.theme) {
            spans.push(Span::raw(" "));
            spans.extend(status.spans);
        }
        let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(self.theme.mantle));
        frame.render_widget(header, area);
    }

    fn render_key_hints(&self, frame: &mut Frame, area: Rect) {
        let hints: Vec<String> = self
            .key_bindings()
            .into_iter()
            .map(|(key, description)| format!("{} {}", key_label(key), description))
            .collect();
        let widget = Paragraph::new(hints.join("  ")).style(self.theme.muted().bg(self.theme.mantle));
        frame.render_widget(widget, area);
    }
}

fn key_label(key: KeyCode) -> String {
    match key {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "⏎".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Backspace => "⌫".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    }
}

/// Set up the terminal, run the app until it quits, and restore the terminal
pub async fn launch<A: App>(params: A::InitParams) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut runtime = Runtime::<A>::new(params);
    let result = run(&mut terminal, &mut runtime).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run<B: Backend, A: App>(terminal: &mut Terminal<B>, runtime: &mut Runtime<A>) -> Result<()> {
    loop {
        let frame_start = Instant::now();

        // Process all pending events first for minimal input latency
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }
                if key.code == KeyCode::Tab && runtime.focus_next() {
                    continue;
                }
                runtime.handle_key(key);
            }
        }

        if runtime.should_quit() {
            return Ok(());
        }

        runtime.poll_async();
        runtime.poll_timers();

        terminal.draw(|frame| runtime.render(frame))?;

        // Sleep for remainder of 16ms frame (60 FPS)
        let elapsed = frame_start.elapsed();
        if let Some(remaining) = Duration::from_millis(16).checked_sub(elapsed) {
            tokio::time::sleep(remaining).await;
        }
    }
}
