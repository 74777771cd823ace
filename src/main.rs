use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use brokerday_lib::cli::{Cli, Command};
use brokerday_lib::collaborators::Collaborators;
use brokerday_lib::config::{load_config, Config};
use brokerday_lib::db::BrokerDb;
use brokerday_lib::google::{GmailSender, GoogleCalendar};
use brokerday_lib::util::capitalize;
use brokerday_lib::{digest, llm, logging, planner, run_agent, RunError, TaskStatus};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let _logger = logging::init_logging(None).ok();
            return report_error(RunError::Config(e));
        }
    };
    // Held until exit so buffered file output is flushed
    let _logger = match logging::init_logging(config.log_file.as_deref().map(Path::new)) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Could not open log file, logging to stderr only: {}", e);
            logging::init_logging(None).ok()
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(execute(cli, &config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(e),
    }
}

fn report_error(e: RunError) -> ExitCode {
    log::error!("{}", e);
    eprintln!("Error: {}", e);
    eprintln!("{}", e.recovery_suggestion());
    ExitCode::from(1)
}

async fn execute(cli: Cli, config: &Config) -> Result<(), RunError> {
    match cli.command {
        Command::Run { filter } => {
            let db = BrokerDb::open_at(config.database_path()?)?;
            let generator = llm::build_generator(&config.generator)?;
            let token_path = config.token_path()?;
            let email = GmailSender::new(token_path.clone());
            let calendar = GoogleCalendar::new(token_path);
            let collaborators = Collaborators {
                store: &db,
                generator: generator.as_ref(),
                email: &email,
                calendar: &calendar,
            };

            let summary = run_agent(collaborators, config).await?;

            println!("Today's tasks:");
            for (n, entry) in summary.report.numbered(filter) {
                println!(
                    "{}. [{}] {}",
                    n,
                    capitalize(entry.task.task_type.as_str()),
                    entry.task.content
                );
                println!("   {}: {}", entry.outcome.status, entry.outcome.summary);
            }
            if summary.tasks.is_empty() {
                println!("(no tasks)");
            }
            Ok(())
        }
        Command::Plan => {
            let db = BrokerDb::open_at(config.database_path()?)?;
            let generator = llm::build_generator(&config.generator)?;
            let data_dir = config.data_dir()?;
            let tasks = planner::generate_daily_plan(
                &db,
                generator.as_ref(),
                Some(&data_dir),
                config.planning.on_generation_failure,
            )
            .await?;
            for (i, task) in tasks.iter().enumerate() {
                println!("{}. [{}] {}", i + 1, capitalize(task.task_type.as_str()), task.content);
            }
            Ok(())
        }
        Command::History => {
            let path = config.database_path()?;
            if !path.exists() {
                println!("No tasks recorded yet.");
                return Ok(());
            }
            let db = BrokerDb::open_readonly_at(&path)?;
            let log = db.get_task_log()?;
            for record in &log {
                println!(
                    "{} [{}] {} ({})",
                    record.completed_at,
                    capitalize(record.task_type.as_str()),
                    record.content,
                    record.status
                );
            }
            let completed = log
                .iter()
                .filter(|r| r.status == TaskStatus::Completed)
                .count();
            println!("Total completed: {}", completed);
            Ok(())
        }
        Command::Clients => {
            let path = config.database_path()?;
            if !path.exists() {
                println!("No clients recorded yet.");
                return Ok(());
            }
            let db = BrokerDb::open_readonly_at(&path)?;
            for email in db.get_client_emails()? {
                println!("{}", email);
            }
            Ok(())
        }
        Command::Digest { to } => {
            let db = BrokerDb::open_at(config.database_path()?)?;
            let records = db.get_task_log_for_today()?;
            let sender = GmailSender::new(config.token_path()?);
            let count = digest::send_daily_digest(&sender, &to, &records)
                .await
                .map_err(|source| RunError::Task {
                    content: digest::DIGEST_SUBJECT.to_string(),
                    source,
                })?;
            println!("Sent digest of {} tasks to {}", count, to);
            Ok(())
        }
    }
}
