use ratatui::style::{Color, Modifier, Style};

use super::model::Tone;

pub(super) const UI_MARGIN: u16 = 1;
pub(super) const HEADER_HEIGHT: u16 = 4;
pub(super) const FOOTER_HEIGHT: u16 = 1;
/// Border rows around each section.
pub(super) const SECTION_CHROME: u16 = 2;
pub(super) const CHART_BG_RGB: (u8, u8, u8) = (0x0a, 0x0a, 0x0a);
pub(super) const PANEL_BORDER_RGB: (u8, u8, u8) = (0xe5, 0xe7, 0xeb);
pub(super) const PANEL_TEXT_RGB: (u8, u8, u8) = (0xff, 0xff, 0xff);
pub(super) const PANEL_MUTED_RGB: (u8, u8, u8) = (0xd1, 0xd5, 0xdb);
pub(super) const ACCENT_TITLE_RGB: (u8, u8, u8) = (0x22, 0xd3, 0xee);
pub(super) const ACCENT_GREEN_RGB: (u8, u8, u8) = (0x22, 0xc5, 0x5e);
pub(super) const ACCENT_AMBER_RGB: (u8, u8, u8) = (0xf5, 0x9e, 0x0b);
pub(super) const ACCENT_RED_RGB: (u8, u8, u8) = (0xef, 0x44, 0x44);

pub(super) const fn rgb(rgb: (u8, u8, u8)) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub(super) fn app_background_style(no_color: bool) -> Style {
    if no_color {
        Style::default()
    } else {
        Style::default().bg(rgb(CHART_BG_RGB))
    }
}

pub(super) fn panel_border_style(no_color: bool) -> Style {
    if no_color {
        Style::default()
    } else {
        Style::default().fg(rgb(PANEL_BORDER_RGB))
    }
}

pub(super) fn title_style(no_color: bool) -> Style {
    if no_color {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(rgb(ACCENT_TITLE_RGB))
            .add_modifier(Modifier::BOLD)
    }
}

pub(super) fn tone_style(no_color: bool, tone: Tone) -> Style {
    if no_color {
        return Style::default();
    }
    let color = match tone {
        Tone::Normal => PANEL_TEXT_RGB,
        Tone::Muted => PANEL_MUTED_RGB,
        Tone::Good => ACCENT_GREEN_RGB,
        Tone::Warn => ACCENT_AMBER_RGB,
        Tone::Bad => ACCENT_RED_RGB,
    };
    Style::default().fg(rgb(color))
}
