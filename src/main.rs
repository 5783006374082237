mod app;
mod args;
mod config;
mod entry;
mod error;
mod http;
mod live;
mod load;
mod logger;
mod metrics;
mod report;
mod shutdown;
mod shutdown_handlers;
mod stream;
#[cfg(test)]
mod test_support;
mod ui;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
