use std::io;
use std::sync::Arc;

use tracing::{error, info};

use crate::app::{
    Probes, live_renderer, run_bench, run_dashboard, run_monitor, run_probe, run_suite,
};
use crate::error::{AppError, AppResult};
use crate::http::{
    HttpExecutor, HttpMetricsSource, MetricsSource, RequestExecutor, build_client, resolve_target,
};
use crate::shutdown::{ShutdownReceiver, shutdown_channel};
use crate::shutdown_handlers::ShutdownHandlers;

use super::types::{RunPlan, Tool};

pub(crate) async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    let RunPlan {
        connection,
        tool,
        no_color,
        full_screen,
    } = plan;

    resolve_target(&connection.target).await.map_err(|err| {
        error!("Server address could not be resolved: {}", err);
        AppError::http(err)
    })?;
    let client = build_client(&connection.settings)?;
    let executor: Arc<dyn RequestExecutor> =
        Arc::new(HttpExecutor::new(client.clone(), &connection.target));
    let source: Arc<dyn MetricsSource> = Arc::new(HttpMetricsSource::new(
        client,
        &connection.target,
        connection.poll_timeout,
    ));
    info!("Target {}", source.target());

    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    let handlers = ShutdownHandlers::install(&shutdown_tx, full_screen);
    let probes = Probes::new(executor, source, connection.model);
    let result = run_tool(tool, &probes, full_screen, no_color, &mut shutdown_rx).await;
    handlers.stop(&shutdown_tx).await;
    result
}

async fn run_tool(
    tool: Tool,
    probes: &Probes,
    full_screen: bool,
    no_color: bool,
    shutdown_rx: &mut ShutdownReceiver,
) -> AppResult<()> {
    let mut out = io::stdout();
    match tool {
        Tool::Bench(args) => run_bench(probes, &args, shutdown_rx, &mut out)
            .await
            .map(drop),
        Tool::Suite(args) => run_suite(probes, &args, shutdown_rx, &mut out)
            .await
            .map(drop),
        Tool::Probe(args) => run_probe(probes, &args, shutdown_rx, &mut out)
            .await
            .map(drop),
        Tool::Dashboard(args) => {
            let mut renderer = live_renderer(full_screen, no_color)?;
            let cycles =
                run_dashboard(Arc::clone(&probes.source), &args, renderer.as_mut(), shutdown_rx)
                    .await?;
            drop(renderer);
            info!("Dashboard stopped after {} refreshes", cycles);
            Ok(())
        }
        Tool::Monitor(args) => {
            let mut renderer = live_renderer(full_screen, no_color)?;
            let written =
                run_monitor(Arc::clone(&probes.source), &args, renderer.as_mut(), shutdown_rx)
                    .await;
            drop(renderer);
            if let Some(path) = written? {
                println!("Performance log saved to {}", path.display());
            }
            Ok(())
        }
    }
}
