//! Poll loop for the live tools and the views they refresh.
mod dashboard;
mod dump;
mod format;
mod monitor;
mod poll;


pub use dashboard::{DashboardState, dashboard_screen, unreachable_screen};
pub use dump::{log_file_name, write_history_log};
pub use format::{format_bytes, format_interval, format_number};
pub use monitor::{MonitorState, monitor_screen};
pub use poll::{LiveState, run_live_loop};
