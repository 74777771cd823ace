//! Daily plan generation: gather facts, prompt, generate, parse.

pub mod archive;
pub mod parse;
pub mod prompt;

use std::path::Path;

use crate::collaborators::ClientStore;
use crate::config::GenerationFailurePolicy;
use crate::error::RunError;
use crate::llm::TextGenerator;
use crate::types::Task;

pub use archive::PlanArchive;
pub use parse::{classify_line, clean_line, parse_plan, parse_tasks};
pub use prompt::format_prompt;

/// Build the prompt from the store's current facts.
pub fn gather_prompt(store: &dyn ClientStore) -> Result<String, RunError> {
    let followups = store.followup_clients()?;
    let missing_docs = store.missing_documents()?;
    let appointments = store.upcoming_appointments()?;
    log::info!(
        "Gathered {} follow-ups, {} missing documents, {} appointments",
        followups.len(),
        missing_docs.len(),
        appointments.len()
    );
    Ok(format_prompt(&followups, &missing_docs, &appointments))
}

/// Produce today's plan.
///
/// The raw response is logged at debug level and, when `data_dir` is set,
/// archived there before parsing. A generation failure either
/// aborts or yields an empty plan, per `on_failure`.
pub async fn generate_daily_plan(
    store: &dyn ClientStore,
    generator: &(dyn TextGenerator + Send + Sync),
    data_dir: Option<&Path>,
    on_failure: GenerationFailurePolicy,
) -> Result<Vec<Task>, RunError> {
    let prompt = gather_prompt(store)?;

    let raw = match generator.generate(&prompt).await {
        Ok(raw) => raw,
        Err(e) => match on_failure {
            GenerationFailurePolicy::Abort => return Err(RunError::Generation(e)),
            GenerationFailurePolicy::EmptyPlan => {
                log::error!("Plan generation failed, continuing with an empty plan: {}", e);
                return Ok(Vec::new());
            }
        },
    };

    log::debug!("Raw plan output:\n{}", raw);
    if let Some(dir) = data_dir {
        if let Err(e) = PlanArchive::in_data_dir(dir).save(&raw, chrono::Utc::now()) {
            log::warn!("Failed to archive raw plan output: {}", e);
        }
    }

    let tasks = parse_plan(&raw);
    log::info!("Parsed {} tasks from plan output", tasks.len());
    Ok(tasks)
}
