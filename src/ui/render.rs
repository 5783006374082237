use std::io::{self, Stdout, Write};

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    prelude::{Backend, Frame},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::error::AppResult;

use super::model::{Screen, Tone};
use super::theme::{
    FOOTER_HEIGHT, HEADER_HEIGHT, SECTION_CHROME, UI_MARGIN, app_background_style,
    panel_border_style, title_style, tone_style,
};

pub trait UiActions {
    /// Initializes the terminal for UI rendering.
    ///
    /// # Errors
    ///
    /// Returns an error when terminal setup fails.
    fn setup_terminal() -> AppResult<Terminal<CrosstermBackend<Stdout>>>;
    fn cleanup();
    /// # Errors
    ///
    /// Returns an error when the backend fails to draw.
    fn render<B: Backend>(terminal: &mut Terminal<B>, screen: &Screen, no_color: bool)
    -> AppResult<()>;
}

pub struct Ui;

impl UiActions for Ui {
    fn setup_terminal() -> AppResult<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen) {
            disable_raw_mode().ok();
            return Err(err.into());
        }

        let backend = CrosstermBackend::new(io::stdout());
        match Terminal::new(backend) {
            Ok(mut terminal) => {
                if let Err(err) = terminal.clear() {
                    Self::cleanup();
                    return Err(err.into());
                }
                Ok(terminal)
            }
            Err(err) => {
                Self::cleanup();
                Err(err.into())
            }
        }
    }

    fn cleanup() {
        disable_raw_mode().ok();
        execute!(std::io::stdout(), LeaveAlternateScreen).ok();
    }

    fn render<B: Backend>(
        terminal: &mut Terminal<B>,
        screen: &Screen,
        no_color: bool,
    ) -> AppResult<()> {
        terminal.draw(|f| draw_screen(f, screen, no_color))?;
        Ok(())
    }
}

fn draw_screen<B: Backend>(f: &mut Frame<'_, B>, screen: &Screen, no_color: bool) {
    let size = f.size();
    f.render_widget(Block::default().style(app_background_style(no_color)), size);

    let mut constraints = vec![Constraint::Length(HEADER_HEIGHT)];
    for section in &screen.sections {
        let rows = u16::try_from(section.lines.len()).unwrap_or(u16::MAX);
        constraints.push(Constraint::Length(rows.saturating_add(SECTION_CHROME)));
    }
    constraints.push(Constraint::Min(FOOTER_HEIGHT));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(UI_MARGIN)
        .constraints(constraints)
        .split(size);

    let mut areas = chunks.iter();
    if let Some(header_area) = areas.next() {
        let mut header = vec![Line::from(Span::styled(
            screen.title.clone(),
            title_style(no_color),
        ))];
        if let Some(subtitle) = screen.subtitle.as_ref() {
            header.push(Line::from(Span::styled(
                subtitle.clone(),
                tone_style(no_color, Tone::Muted),
            )));
        }
        f.render_widget(Paragraph::new(header), *header_area);
    }

    for (section, area) in screen.sections.iter().zip(areas.by_ref()) {
        let lines: Vec<Line<'_>> = section
            .lines
            .iter()
            .map(|line| Line::from(Span::styled(line.text.clone(), tone_style(no_color, line.tone))))
            .collect();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(panel_border_style(no_color))
            .title(Span::styled(section.title.clone(), title_style(no_color)));
        f.render_widget(Paragraph::new(lines).block(block), *area);
    }

    if let (Some(footer), Some(area)) = (screen.footer.as_ref(), areas.next()) {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                footer.clone(),
                tone_style(no_color, Tone::Muted),
            ))),
            *area,
        );
    }
}

/// Plain-text rendering of a screen, one entry per output line.
#[must_use]
pub fn format_screen(screen: &Screen) -> Vec<String> {
    let rule = "=".repeat(60);
    let mut lines = vec![rule.clone(), screen.title.clone()];
    if let Some(subtitle) = screen.subtitle.as_ref() {
        lines.push(subtitle.clone());
    }
    lines.push(rule);
    for section in &screen.sections {
        lines.push(String::new());
        lines.push(format!("{}:", section.title));
        lines.extend(section.lines.iter().map(|line| format!("   {}", line.text)));
    }
    if let Some(footer) = screen.footer.as_ref() {
        lines.push(String::new());
        lines.push(footer.clone());
    }
    lines
}

/// Output of the live loop.
pub trait ScreenRenderer {
    /// # Errors
    ///
    /// Returns an error when the output cannot be written.
    fn render(&mut self, screen: &Screen) -> AppResult<()>;
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        Ui::cleanup();
    }
}

/// Full-screen renderer; restores the terminal when dropped.
pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
    no_color: bool,
    _guard: Option<TerminalGuard>,
}

impl TerminalRenderer<CrosstermBackend<Stdout>> {
    /// # Errors
    ///
    /// Returns an error when raw mode or the alternate screen is unavailable.
    pub fn stdout(no_color: bool) -> AppResult<Self> {
        let terminal = Ui::setup_terminal()?;
        Ok(Self {
            terminal,
            no_color,
            _guard: Some(TerminalGuard),
        })
    }
}

impl<B: Backend> TerminalRenderer<B> {
    /// Wraps an existing terminal without taking over the process terminal.
    pub const fn with_terminal(terminal: Terminal<B>, no_color: bool) -> Self {
        Self {
            terminal,
            no_color,
            _guard: None,
        }
    }

    #[must_use]
    pub const fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

impl<B: Backend> ScreenRenderer for TerminalRenderer<B> {
    fn render(&mut self, screen: &Screen) -> AppResult<()> {
        Ui::render(&mut self.terminal, screen, self.no_color)
    }
}

/// Line renderer for `--plain` and non-interactive output.
pub struct PlainRenderer<W: Write> {
    out: W,
}

impl PlainRenderer<Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> PlainRenderer<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ScreenRenderer for PlainRenderer<W> {
    fn render(&mut self, screen: &Screen) -> AppResult<()> {
        for line in format_screen(screen) {
            writeln!(self.out, "{}", line)?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
