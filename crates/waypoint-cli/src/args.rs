//! Command-line argument definitions using clap
//!
//! Argument structs stay in this crate and convert into the core parameter
//! types via `From`, so `waypoint-core` carries no clap derives:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Plan operations
//! ```

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use waypoint_core::{params::TaskCreate, FailurePolicy};

/// Task dependency graph and readiness scheduler for autonomous agents
///
/// Every agent owns a plan: a tree of tasks whose predecessor edges decide
/// which tasks are ready to run. `wp` drives such plans from the shell;
/// every mutating command saves the plan before it exits.
#[derive(Parser)]
#[command(version, about, name = "wp")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/waypoint/waypoint.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// What happens to the dependents of a failed task
    #[arg(long, global = true, value_enum, default_value_t = FailurePolicyArg::KeepBacklog)]
    pub failure_policy: FailurePolicyArg,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Waypoint CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Manage plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Work with the tasks of a plan
    #[command(alias = "t")]
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FailurePolicyArg {
    /// Dependents of a failed task stay in the backlog
    KeepBacklog,
    /// Backlog tasks waiting on a failed task fail as well
    FailDependents,
}

impl From<FailurePolicyArg> for FailurePolicy {
    fn from(val: FailurePolicyArg) -> Self {
        match val {
            FailurePolicyArg::KeepBacklog => FailurePolicy::KeepBacklog,
            FailurePolicyArg::FailDependents => FailurePolicy::FailDependents,
        }
    }
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a fresh plan seeded with a planning task
    #[command(alias = "c")]
    Create(CreatePlanArgs),
    /// List stored plans
    #[command(aliases = ["l", "ls"])]
    List(ListPlansArgs),
    /// Show a plan and all of its tasks
    #[command(alias = "s")]
    Show(PlanRefArgs),
}

/// Create a new plan
#[derive(ClapArgs)]
pub struct CreatePlanArgs {
    /// The goal the plan should achieve
    pub goal: String,
    /// Agent owning the plan
    #[arg(short, long, default_value = "cli")]
    pub agent: String,
}

/// List plans, optionally of one agent
#[derive(ClapArgs)]
pub struct ListPlansArgs {
    /// Only plans owned by this agent
    #[arg(short, long)]
    pub agent: Option<String>,
}

/// Reference to a stored plan
#[derive(ClapArgs)]
pub struct PlanRefArgs {
    /// ID of the plan (`PL…`)
    pub plan_id: String,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Register a new task with a plan
    #[command(alias = "a")]
    Add(AddTaskArgs),
    /// List the ready tasks of a plan, oldest first
    #[command(alias = "r")]
    Ready(PlanRefArgs),
    /// Show the oldest ready task of a plan
    #[command(alias = "n")]
    Next(PlanRefArgs),
    /// Show a single task
    #[command(alias = "s")]
    Show(TaskRefArgs),
    /// Mark a ready task as in progress
    Start(TaskRefArgs),
    /// Mark a task as done and promote its dependents
    Done(FinishTaskArgs),
    /// Mark a task as failed
    Fail(FinishTaskArgs),
    /// Print the briefing for a task, or for the oldest ready task
    Pitch(PitchArgs),
}

/// Register a new task
#[derive(ClapArgs)]
pub struct AddTaskArgs {
    /// ID of the plan to add the task to
    pub plan_id: String,
    /// What the task should achieve
    pub goal: String,
    /// Longer explanation of the task
    #[arg(short, long)]
    pub description: Option<String>,
    /// Command the executing agent should run
    #[arg(short, long)]
    pub command: Option<String>,
    /// Command arguments as a JSON object
    #[arg(long, value_parser = parse_arguments)]
    pub args: Option<Map<String, Value>>,
    /// Parent task; the task hangs off the plan when omitted
    #[arg(short, long)]
    pub parent: Option<String>,
    /// Tasks that must be done first - comma-separated list
    #[arg(long, value_delimiter = ',')]
    pub after: Vec<String>,
    /// Acceptance criteria - comma-separated list
    #[arg(long, value_delimiter = ',')]
    pub criteria: Vec<String>,
    /// Agent assigned to execute the task
    #[arg(short, long)]
    pub agent: Option<String>,
}

impl From<AddTaskArgs> for TaskCreate {
    fn from(val: AddTaskArgs) -> Self {
        TaskCreate {
            goal: val.goal,
            description: val.description,
            command: val.command,
            arguments: val.args.unwrap_or_default(),
            acceptance_criteria: val.criteria,
            parent_id: val.parent,
            predecessor_ids: val.after,
            responsible_agent_id: val.agent,
        }
    }
}

fn parse_arguments(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Reference to a task of a plan
#[derive(ClapArgs)]
pub struct TaskRefArgs {
    /// ID of the plan the task belongs to
    pub plan_id: String,
    /// ID of the task (`TA…`)
    pub task_id: String,
}

/// Finish a task
#[derive(ClapArgs)]
pub struct FinishTaskArgs {
    /// ID of the plan the task belongs to
    pub plan_id: String,
    /// ID of the task (`TA…`)
    pub task_id: String,
    /// What the executing agent reported back
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Pitch a task
#[derive(ClapArgs)]
pub struct PitchArgs {
    /// ID of the plan
    pub plan_id: String,
    /// Task to pitch; the oldest ready task when omitted
    pub task_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_add_task_conversion() {
        let args = Args::parse_from([
            "wp",
            "task",
            "add",
            "PL-1",
            "write tests",
            "--after",
            "TA-1,TA-2",
            "--args",
            r#"{"path": "src/lib.rs"}"#,
        ]);
        let Some(Commands::Task {
            command: TaskCommands::Add(add),
        }) = args.command
        else {
            panic!("expected task add");
        };

        let params = TaskCreate::from(add);
        assert_eq!(params.goal, "write tests");
        assert_eq!(params.predecessor_ids, vec!["TA-1", "TA-2"]);
        assert_eq!(params.arguments["path"], "src/lib.rs");
        assert!(params.parent_id.is_none());
    }

    #[test]
    fn test_arguments_must_be_an_object() {
        assert!(parse_arguments("[1, 2]").is_err());
        assert!(parse_arguments("not json").is_err());
        assert!(parse_arguments("{}").unwrap().is_empty());
    }
}
