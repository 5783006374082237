//! Screen model shared by the live tools and its two renderers.
mod model;
mod render;
mod theme;

#[cfg(test)]
mod tests;

pub use model::{Screen, ScreenLine, Section, Tone};
pub use render::{PlainRenderer, ScreenRenderer, TerminalRenderer, Ui, UiActions, format_screen};
