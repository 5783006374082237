use std::io::IsTerminal;

use tracing::info;

use crate::args::{Command, StreamprobeArgs};
use crate::error::{AppError, AppResult};
use crate::http::{ClientSettings, Target};

use super::types::{Connection, RunPlan, Tool};

pub(crate) fn build_plan(args: StreamprobeArgs) -> AppResult<RunPlan> {
    let target = Target::parse(&args.url).map_err(|err| {
        tracing::error!("Invalid server URL: {}", err);
        AppError::http(err)
    })?;

    let mut full_screen = args.full_screen();
    if full_screen && !std::io::stdout().is_terminal() {
        info!("Full-screen UI disabled because stdout is not a TTY.");
        full_screen = false;
    }

    let tool = match args.command {
        Command::Bench(bench) => Tool::Bench(bench),
        Command::Suite(suite) => Tool::Suite(suite),
        Command::Probe(probe) => Tool::Probe(probe),
        Command::Dashboard(live) => Tool::Dashboard(live),
        Command::Monitor(monitor) => Tool::Monitor(monitor),
    };

    Ok(RunPlan {
        connection: Connection {
            target,
            settings: ClientSettings {
                request_timeout: args.request_timeout,
                connect_timeout: args.connect_timeout,
            },
            poll_timeout: args.poll_timeout,
            model: args.model,
        },
        tool,
        no_color: args.no_color,
        full_screen,
    })
}
