//! One agent run: plan the day, then work through the plan.

use crate::collaborators::Collaborators;
use crate::config::Config;
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::error::RunError;
use crate::planner;
use crate::types::Task;

/// The plan in model order, plus what happened to each task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tasks: Vec<Task>,
    pub report: DispatchReport,
}

/// Generate today's plan and dispatch every task in it.
pub async fn run_agent(
    collaborators: Collaborators<'_>,
    config: &Config,
) -> Result<RunSummary, RunError> {
    let data_dir = config.data_dir()?;
    match planner::PlanArchive::in_data_dir(&data_dir).prune(chrono::Utc::now().date_naive()) {
        Ok(0) => {}
        Ok(n) => log::info!("Pruned {} archived plans", n),
        Err(e) => log::warn!("Could not prune archived plans: {}", e),
    }

    log::info!("Generating daily plan");
    let tasks = planner::generate_daily_plan(
        collaborators.store,
        collaborators.generator,
        Some(&data_dir),
        config.planning.on_generation_failure,
    )
    .await?;

    let report = Dispatcher::new(collaborators, config)
        .dispatch(&tasks)
        .await?;

    Ok(RunSummary { tasks, report })
}
