use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tracing::info;

use crate::args::{LiveArgs, MonitorArgs};
use crate::error::AppResult;
use crate::http::MetricsSource;
use crate::live::{DashboardState, MonitorState, run_live_loop, write_history_log};
use crate::shutdown::ShutdownReceiver;
use crate::ui::{PlainRenderer, ScreenRenderer, TerminalRenderer};

/// Full-screen output when the terminal allows it, plain lines otherwise.
///
/// # Errors
///
/// Returns an error when the terminal cannot be switched to raw mode.
pub fn live_renderer(full_screen: bool, no_color: bool) -> AppResult<Box<dyn ScreenRenderer>> {
    if full_screen {
        Ok(Box::new(TerminalRenderer::stdout(no_color)?))
    } else {
        Ok(Box::new(PlainRenderer::stdout()))
    }
}

/// Refreshes the dashboard until shutdown and returns the number of cycles.
///
/// # Errors
///
/// Returns an error when a frame cannot be rendered.
pub async fn run_dashboard<R: ScreenRenderer + ?Sized>(
    source: Arc<dyn MetricsSource>,
    args: &LiveArgs,
    renderer: &mut R,
    shutdown_rx: &mut ShutdownReceiver,
) -> AppResult<u64> {
    let mut state = DashboardState::new(source, args.interval);
    run_live_loop(&mut state, renderer, args.interval, shutdown_rx).await
}

/// Runs the monitor until shutdown, then writes the collected history.
///
/// Returns the log path, or `None` when nothing was collected.
///
/// # Errors
///
/// Returns an error when a frame cannot be rendered or the log cannot be
/// written.
pub async fn run_monitor<R: ScreenRenderer + ?Sized>(
    source: Arc<dyn MetricsSource>,
    args: &MonitorArgs,
    renderer: &mut R,
    shutdown_rx: &mut ShutdownReceiver,
) -> AppResult<Option<PathBuf>> {
    let mut state = MonitorState::new(
        source,
        args.live.interval,
        args.history_max.get(),
        args.window.get(),
    );
    run_live_loop(&mut state, renderer, args.live.interval, shutdown_rx).await?;

    let history = state.history();
    if history.is_empty() {
        info!("No snapshots collected; skipping the performance log");
        return Ok(None);
    }
    let path = write_history_log(&args.log_dir, &history.entries(), &Local::now()).await?;
    info!("Wrote {} snapshots to {}", history.len(), path.display());
    Ok(Some(path))
}
