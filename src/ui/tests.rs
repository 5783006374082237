use super::*;
use crate::error::{AppError, AppResult};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

fn sample_screen() -> Screen {
    Screen::new("Streaming Dashboard")
        .subtitle("http://localhost:8069")
        .section(
            Section::new("Server Health")
                .toned("Status: OK", Tone::Good)
                .line("Version: 1.2.3"),
        )
        .section(Section::new("Streams").toned("Active: 3 (↗ +1)", Tone::Warn))
        .footer("Refreshing every 5s")
}

#[test]
fn terminal_renderer_draws_sections() -> AppResult<()> {
    let terminal = Terminal::new(TestBackend::new(80, 24))
        .map_err(|err| AppError::validation(format!("Failed to create terminal: {}", err)))?;
    let mut renderer = TerminalRenderer::with_terminal(terminal, false);
    renderer.render(&sample_screen())?;

    let rendered: String = renderer
        .terminal()
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol.as_str())
        .collect();
    for expected in ["Streaming Dashboard", "Server Health", "Status: OK", "Refreshing every 5s"] {
        if !rendered.contains(expected) {
            return Err(AppError::validation(format!("Missing '{}' on screen", expected)));
        }
    }
    Ok(())
}

#[test]
fn terminal_renderer_survives_tiny_terminal() -> AppResult<()> {
    let terminal = Terminal::new(TestBackend::new(10, 3))
        .map_err(|err| AppError::validation(format!("Failed to create terminal: {}", err)))?;
    let mut renderer = TerminalRenderer::with_terminal(terminal, true);
    renderer.render(&sample_screen())
}

#[test]
fn plain_renderer_writes_lines() -> AppResult<()> {
    let mut renderer = PlainRenderer::new(Vec::new());
    renderer.render(&sample_screen())?;
    let output = String::from_utf8(renderer.into_inner())
        .map_err(|err| AppError::validation(format!("Invalid UTF-8: {}", err)))?;
    if !output.contains("Server Health:\n   Status: OK\n") {
        return Err(AppError::validation(format!("Unexpected output:\n{}", output)));
    }
    if !output.contains("Refreshing every 5s") {
        return Err(AppError::validation("Missing footer"));
    }
    Ok(())
}

#[test]
fn find_line_searches_named_section() -> AppResult<()> {
    let screen = sample_screen();
    let line = screen
        .find_line("Streams", "Active")
        .ok_or_else(|| AppError::validation("Expected active line"))?;
    if line.tone != Tone::Warn {
        return Err(AppError::validation("Unexpected tone"));
    }
    if screen.find_line("Server Health", "Active").is_some() {
        return Err(AppError::validation("Search must stay within the section"));
    }
    Ok(())
}

#[test]
fn format_screen_lists_sections_in_order() -> AppResult<()> {
    let lines = format_screen(&sample_screen());
    let health = lines.iter().position(|line| line == "Server Health:");
    let streams = lines.iter().position(|line| line == "Streams:");
    match (health, streams) {
        (Some(first), Some(second)) if first < second => Ok(()),
        _ => Err(AppError::validation("Sections out of order")),
    }
}
