use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::error::AppResult;
use crate::load::pause;
use crate::shutdown::{ShutdownReceiver, wait_for_shutdown};
use crate::ui::{Screen, ScreenRenderer};

/// A live view that fetches fresh state and turns it into a screen.
#[async_trait]
pub trait LiveState: Send {
    /// One poll cycle. Fetch failures become part of the returned screen.
    async fn refresh(&mut self) -> Screen;
}

/// Polls, renders, then sleeps `interval`, until shutdown is requested.
///
/// Cycles never overlap: the next poll starts only after the previous
/// render and sleep. Returns the number of rendered cycles.
///
/// # Errors
///
/// Returns an error when the renderer cannot write its output.
pub async fn run_live_loop<L, R>(
    state: &mut L,
    renderer: &mut R,
    interval: Duration,
    shutdown_rx: &mut ShutdownReceiver,
) -> AppResult<u64>
where
    L: LiveState + ?Sized,
    R: ScreenRenderer + ?Sized,
{
    let mut cycles: u64 = 0;
    loop {
        let screen = tokio::select! {
            biased;
            () = wait_for_shutdown(shutdown_rx) => break,
            screen = state.refresh() => screen,
        };
        renderer.render(&screen)?;
        cycles = cycles.saturating_add(1);

        if !pause(interval, shutdown_rx).await {
            break;
        }
    }
    info!("Live loop stopped after {} refreshes", cycles);
    Ok(cycles)
}
