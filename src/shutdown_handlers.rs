use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, poll, read};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::shutdown::ShutdownSender;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Keyboard polling interval for Ctrl+C detection while the terminal is raw.
const KEYBOARD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Signal (and optionally keyboard) listeners for one tool run.
pub struct ShutdownHandlers {
    signal: JoinHandle<()>,
    keyboard: Option<JoinHandle<()>>,
}

impl ShutdownHandlers {
    /// Raw-mode terminals swallow SIGINT, so the full-screen UI also needs
    /// the keyboard listener.
    #[must_use]
    pub fn install(shutdown_tx: &ShutdownSender, raw_terminal: bool) -> Self {
        Self {
            signal: setup_signal_shutdown_handler(shutdown_tx),
            keyboard: raw_terminal.then(|| setup_keyboard_shutdown_handler(shutdown_tx)),
        }
    }

    /// Stops the listeners after the run finished on its own.
    pub async fn stop(self, shutdown_tx: &ShutdownSender) {
        self.signal.abort();
        if let Some(keyboard) = self.keyboard {
            drop(shutdown_tx.send(()));
            if let Err(err) = keyboard.await {
                debug!("Keyboard listener ended abnormally: {}", err);
            }
        }
    }
}

pub fn setup_keyboard_shutdown_handler(shutdown_tx: &ShutdownSender) -> JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::task::spawn_blocking(move || {
        loop {
            match shutdown_rx.try_recv() {
                Ok(()) | Err(broadcast::error::TryRecvError::Closed) => break,
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Lagged(_),
                ) => {}
            }

            let has_event = poll(KEYBOARD_POLL_INTERVAL).unwrap_or_default();

            if has_event
                && let Ok(Event::Key(KeyEvent {
                    code: KeyCode::Char('c'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                })) = read()
            {
                drop(shutdown_tx.send(()));
                break;
            }
        }
    })
}

pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_tx.subscribe();

        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                eprintln!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    debug!("Interrupt received.");
                    drop(shutdown_tx.send(()));
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    debug!("SIGTERM received.");
                    drop(shutdown_tx.send(()));
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    debug!("Interrupt received.");
                    drop(shutdown_tx.send(()));
                }
            }
        }
    })
}
