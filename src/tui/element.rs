use crossterm::event::KeyCode;
use ratatui::style::Style;
use ratatui::text::Line;

/// Stable identifier for focusable UI elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FocusId(pub &'static str);

impl FocusId {
    /// Create a new FocusId with a static string identifier
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }
}

/// Alignment options for positioned elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Center,
    TopLeft,
}

/// A layer in a stack of UI elements
pub struct Layer<Msg> {
    pub element: Element<Msg>,
    pub alignment: Alignment,
    pub dim_below: bool,
}

impl<Msg> Layer<Msg> {
    pub fn new(element: Element<Msg>) -> Self {
        Self {
            element,
            alignment: Alignment::TopLeft,
            dim_below: false,
        }
    }

    pub fn center(mut self) -> Self {
        self.alignment = Alignment::Center;
        self
    }

    pub fn dim(mut self, should_dim: bool) -> Self {
        self.dim_below = should_dim;
        self
    }
}

/// Layout constraints for sizing elements within containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutConstraint {
    /// Fixed size (exact number of lines/columns)
    Length(u16),
    /// Minimum size (at least this many lines/columns)
    Min(u16),
    /// Proportional fill (weight for distributing remaining space)
    Fill(u16),
}

/// Declarative UI elements that compose to form the view
pub enum Element<Msg> {
    /// Empty element that renders nothing
    None,

    /// Static text, possibly spanning several lines
    Text { content: String, style: Option<Style> },

    /// Styled text with multiple spans
    StyledText { line: Line<'static> },

    /// Vertical layout container
    Column {
        items: Vec<(LayoutConstraint, Element<Msg>)>,
        spacing: u16,
    },

    /// Horizontal layout container
    Row {
        items: Vec<(LayoutConstraint, Element<Msg>)>,
        spacing: u16,
    },

    /// Bordered box; as a centered layer it takes three fifths of the width and half the height
    Panel {
        child: Box<Element<Msg>>,
        title: Option<String>,
    },

    /// Stack of layered elements (for modals, overlays)
    Stack { layers: Vec<Layer<Msg>> },

    /// Single-line text input
    TextInput {
        id: FocusId,
        value: String,
        placeholder: Option<String>,
        on_change: Option<fn(KeyCode) -> Msg>,
        on_submit: Option<Msg>,
    },

    /// Horizontal progress gauge, 0..=100
    Gauge { percent: u8, label: String },
}

impl<Msg> Element<Msg> {
    /// Create a text element
    pub fn text(content: impl Into<String>) -> Self {
        Element::Text {
            content: content.into(),
            style: None,
        }
    }

    /// Create a text element with a style
    pub fn styled(content: impl Into<String>, style: Style) -> Self {
        Element::Text {
            content: content.into(),
            style: Some(style),
        }
    }

    pub fn styled_text(line: Line<'static>) -> Self {
        Element::StyledText { line }
    }

    pub fn column(children: Vec<Element<Msg>>) -> ColumnBuilder<Msg> {
        let items = children
            .into_iter()
            .map(|child| (child.default_constraint(), child))
            .collect();
        ColumnBuilder { items, spacing: 0 }
    }

    pub fn row(children: Vec<Element<Msg>>) -> RowBuilder<Msg> {
        let items = children
            .into_iter()
            .map(|child| (LayoutConstraint::Fill(1), child))
            .collect();
        RowBuilder { items, spacing: 1 }
    }

    pub fn panel(child: Element<Msg>) -> PanelBuilder<Msg> {
        PanelBuilder {
            child: Box::new(child),
            title: None,
        }
    }

    pub fn stack(layers: Vec<Layer<Msg>>) -> Self {
        Element::Stack { layers }
    }

    pub fn text_input(id: FocusId, value: impl Into<String>) -> TextInputBuilder<Msg> {
        TextInputBuilder {
            id,
            value: value.into(),
            placeholder: None,
            on_change: None,
            on_submit: None,
        }
    }

    pub fn gauge(percent: u8, label: impl Into<String>) -> Self {
        Element::Gauge {
            percent: percent.min(100),
            label: label.into(),
        }
    }

    /// Constraint used when a child is added without an explicit one
    pub fn default_constraint(&self) -> LayoutConstraint {
        match self {
            Element::None => LayoutConstraint::Length(0),
            Element::Text { content, .. } => LayoutConstraint::Length(content.lines().count().max(1) as u16),
            Element::StyledText { .. } | Element::TextInput { .. } | Element::Gauge { .. } => {
                LayoutConstraint::Length(1)
            }
            Element::Column { .. } | Element::Row { .. } | Element::Panel { .. } | Element::Stack { .. } => {
                LayoutConstraint::Fill(1)
            }
        }
    }
}

pub struct ColumnBuilder<Msg> {
    items: Vec<(LayoutConstraint, Element<Msg>)>,
    spacing: u16,
}

impl<Msg> ColumnBuilder<Msg> {
    pub fn spacing(mut self, spacing: u16) -> Self {
        self.spacing = spacing;
        self
    }

    /// Append a child with an explicit constraint
    pub fn add(mut self, element: Element<Msg>, constraint: LayoutConstraint) -> Self {
        self.items.push((constraint, element));
        self
    }

    pub fn build(self) -> Element<Msg> {
        Element::Column {
            items: self.items,
            spacing: self.spacing,
        }
    }
}

pub struct RowBuilder<Msg> {
    items: Vec<(LayoutConstraint, Element<Msg>)>,
    spacing: u16,
}

impl<Msg> RowBuilder<Msg> {
    pub fn spacing(mut self, spacing: u16) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn build(self) -> Element<Msg> {
        Element::Row {
            items: self.items,
            spacing: self.spacing,
        }
    }
}

pub struct PanelBuilder<Msg> {
    child: Box<Element<Msg>>,
    title: Option<String>,
}

impl<Msg> PanelBuilder<Msg> {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn build(self) -> Element<Msg> {
        Element::Panel {
            child: self.child,
            title: self.title,
        }
    }
}

pub struct TextInputBuilder<Msg> {
    id: FocusId,
    value: String,
    placeholder: Option<String>,
    on_change: Option<fn(KeyCode) -> Msg>,
    on_submit: Option<Msg>,
}

impl<Msg> TextInputBuilder<Msg> {
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    pub fn on_change(mut self, f: fn(KeyCode) -> Msg) -> Self {
        self.on_change = Some(f);
        self
    }

    pub fn on_submit(mut self, msg: Msg) -> Self {
        self.on_submit = Some(msg);
        self
    }

    pub fn build(self) -> Element<Msg> {
        Element::TextInput {
            id: self.id,
            value: self.value,
            placeholder: self.placeholder,
            on_change: self.on_change,
            on_submit: self.on_submit,
        }
    }
}
