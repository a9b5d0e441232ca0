//! Elm-style terminal framework and the dashboard app built on it

pub mod app;
pub mod apps;
pub mod command;
pub mod element;
pub mod renderer;
pub mod resource;
pub mod runtime;
pub mod subscription;
pub mod theme;

pub use app::App;
pub use command::Command;
pub use element::{Alignment, Element, FocusId, Layer, LayoutConstraint};
pub use renderer::Renderer;
pub use resource::Resource;
pub use runtime::{Runtime, launch};
pub use subscription::Subscription;
pub use theme::Theme;
