//! BrokerDay: plan a mortgage broker's day and carry it out.
//!
//! A run gathers client facts from SQLite, asks a text generator for the
//! day's top tasks, parses the reply into typed tasks, and dispatches each
//! one to the email, calendar or CRM handler, recording every outcome.

pub mod agent;
pub mod cli;
pub mod collaborators;
pub mod config;
pub mod db;
pub mod digest;
pub mod dispatch;
pub mod error;
pub mod google;
pub mod google_api;
pub mod handlers;
pub mod llm;
pub mod logging;
pub mod planner;
pub mod types;
pub mod util;

pub use agent::{run_agent, RunSummary};
pub use collaborators::{CalendarScheduler, ClientStore, Collaborators, EmailSender};
pub use config::Config;
pub use error::RunError;
pub use types::{Task, TaskStatus, TaskType};
