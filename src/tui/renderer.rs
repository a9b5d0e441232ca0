use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    style::{Style, Stylize},
};
use crossterm::event::KeyCode;
use crate::tui::{Element, Theme, LayoutConstraint, Layer, Alignment as LayerAlignment};
use crate::tui::element::FocusId;

mod focus_registry;

pub use focus_registry::{FocusRegistry, FocusableInfo, LayerFocusContext};

/// Renders elements to the terminal
pub struct Renderer;

impl Renderer {
    pub fn render<Msg: Clone + Send + 'static>(
        frame: &mut Frame,
        theme: &Theme,
        focus_registry: &mut FocusRegistry<Msg>,
        focused_id: Option<&FocusId>,
        element: &Element<Msg>,
        area: Rect,
    ) {
        Self::render_element(frame, theme, focus_registry, focused_id, element, area);
    }

    /// Create on_key handler for text inputs (all keys pass to on_change, Enter also fires on_submit)
    fn text_input_on_key<Msg: Clone + Send + 'static>(
        on_change: Option<fn(KeyCode) -> Msg>,
        on_submit: Option<Msg>,
    ) -> Box<dyn Fn(KeyCode) -> Option<Msg> + Send> {
        Box::new(move |key| match key {
            KeyCode::Enter => on_submit.clone(),
            KeyCode::Esc => None,
            _ => on_change.map(|f| f(key)),
        })
    }

    fn render_element<Msg: Clone + Send + 'static>(
        frame: &mut Frame,
        theme: &Theme,
        focus_registry: &mut FocusRegistry<Msg>,
        focused_id: Option<&FocusId>,
        element: &Element<Msg>,
        area: Rect,
    ) {
        match element {
            Element::None => {}

            Element::Text { content, style } => {
                let widget = Paragraph::new(content.as_str())
                    .wrap(Wrap { trim: false })
                    .style(style.unwrap_or(Style::default().fg(theme.text)));
                frame.render_widget(widget, area);
            }

            Element::StyledText { line } => {
                frame.render_widget(Paragraph::new(line.clone()), area);
            }

            Element::Column { items, spacing } => {
                let areas = Self::split(Direction::Vertical, items, *spacing, area);
                for ((_, child), child_area) in items.iter().zip(areas.iter()) {
                    Self::render_element(frame, theme, focus_registry, focused_id, child, *child_area);
                }
            }

            Element::Row { items, spacing } => {
                let areas = Self::split(Direction::Horizontal, items, *spacing, area);
                for ((_, child), child_area) in items.iter().zip(areas.iter()) {
                    Self::render_element(frame, theme, focus_registry, focused_id, child, *child_area);
                }
            }

            Element::Panel { child, title, .. } => {
                let child_has_focus = focused_id
                    .map(|fid| Self::element_contains_focus(child, fid))
                    .unwrap_or(false);
                let border_color = if child_has_focus { theme.lavender } else { theme.overlay0 };

                let mut block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border_color))
                    .style(Style::default().bg(theme.base));
                if let Some(title_text) = title {
                    block = block.title(title_text.as_str());
                }

                let inner_area = block.inner(area);
                frame.render_widget(Clear, area);
                frame.render_widget(block, area);
                Self::render_element(frame, theme, focus_registry, focused_id, child, inner_area);
            }

            Element::Stack { layers } => {
                for (layer_idx, layer) in layers.iter().enumerate() {
                    if layer.dim_below {
                        Self::render_dim_overlay(frame, theme, area);
                    }
                    let layer_area = Self::calculate_layer_position(layer, area);
                    if layer_idx > 0 {
                        focus_registry.push_layer(layer_idx);
                    }
                    Self::render_element(frame, theme, focus_registry, focused_id, &layer.element, layer_area);
                }
            }

            Element::TextInput { id, value, placeholder, on_change, on_submit } => {
                focus_registry.register_focusable(FocusableInfo {
                    id: id.clone(),
                    rect: area,
                    on_key: Self::text_input_on_key(*on_change, on_submit.clone()),
                });

                let is_focused = focused_id == Some(id);
                let (display_text, text_style) = if value.is_empty() && !is_focused {
                    let ph = placeholder.as_deref().unwrap_or("");
                    (format!(" {}", ph), Style::default().fg(theme.overlay1).italic())
                } else if is_focused {
                    (format!(" {}│", value), Style::default().fg(theme.text))
                } else {
                    (format!(" {}", value), Style::default().fg(theme.text))
                };

                let widget = Paragraph::new(display_text)
                    .style(text_style.bg(theme.surface0));
                frame.render_widget(widget, area);
            }

            Element::Gauge { percent, label } => {
                let widget = Gauge::default()
                    .gauge_style(Style::default().fg(theme.green).bg(theme.surface0))
                    .percent(u16::from(*percent))
                    .label(label.as_str());
                frame.render_widget(widget, area);
            }
        }
    }

    fn split<Msg>(direction: Direction, items: &[(LayoutConstraint, Element<Msg>)], spacing: u16, area: Rect) -> Vec<Rect> {
        let constraints: Vec<Constraint> = items
            .iter()
            .map(|(constraint, _)| match constraint {
                LayoutConstraint::Length(n) => Constraint::Length(*n),
                LayoutConstraint::Min(n) => Constraint::Min(*n),
                LayoutConstraint::Fill(n) => Constraint::Fill(*n),
            })
            .collect();
        Layout::default()
            .direction(direction)
            .constraints(constraints)
            .spacing(spacing)
            .split(area)
            .to_vec()
    }

    /// Check if an element or its descendants contain a focusable with the given ID
    fn element_contains_focus<Msg>(element: &Element<Msg>, focused_id: &FocusId) -> bool {
        match element {
            Element::TextInput { id, .. } => id == focused_id,
            Element::Column { items, .. } | Element::Row { items, .. } => {
                items.iter().any(|(_, child)| Self::element_contains_focus(child, focused_id))
            }
            Element::Panel { child, .. } => Self::element_contains_focus(child, focused_id),
            Element::Stack { layers } => {
                layers.iter().any(|layer| Self::element_contains_focus(&layer.element, focused_id))
            }
            _ => false,
        }
    }

    /// Render a semi-transparent dim overlay
    fn render_dim_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
        let dim_block = Block::default().style(Style::default().bg(theme.surface0));
        frame.render_widget(dim_block, area);
    }

    /// Calculate the position of a layer based on its alignment
    fn calculate_layer_position<Msg>(layer: &Layer<Msg>, container: Rect) -> Rect {
        let (width, height) = match &layer.element {
            Element::Panel { .. } => (container.width * 3 / 5, container.height / 2),
            _ => (container.width, container.height),
        };

        match layer.alignment {
            LayerAlignment::TopLeft => Rect { x: container.x, y: container.y, width, height },
            LayerAlignment::Center => Rect {
                x: container.x + container.width.saturating_sub(width) / 2,
                y: container.y + container.height.saturating_sub(height) / 2,
                width,
                height,
            },
        }
    }
}
