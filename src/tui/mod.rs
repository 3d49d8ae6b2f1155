mod renderer;
mod widgets;

pub use renderer::render;

use ratatui::style::Color;

// Palette lifted from the web player this grew out of.
pub(crate) const ACCENT: Color = Color::Rgb(29, 185, 84);
pub(crate) const BG_PANEL: Color = Color::Rgb(24, 24, 24);
pub(crate) const TEXT_DIM: Color = Color::DarkGray;
pub(crate) const TEXT_ERR: Color = Color::Rgb(207, 102, 121);
