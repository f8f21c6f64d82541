//! Command handlers for the `wp` binary
//!
//! Each invocation is its own process, so every task command resumes the
//! plan it names through the registry, applies the change and saves before
//! returning.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};
use waypoint_core::{
    params::{ObtainPlan, TaskCreate},
    store, CreateResult, Plan, PlanFilter, PlanRegistry, PlanSummaries, SaveReport, Task,
    TaskStatus, Tasks,
};

use crate::{
    args::{
        AddTaskArgs, CreatePlanArgs, FinishTaskArgs, ListPlansArgs, PitchArgs, PlanCommands,
        PlanRefArgs, TaskCommands, TaskRefArgs,
    },
    renderer::TerminalRenderer,
};

pub struct Cli {
    registry: PlanRegistry,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(registry: PlanRegistry, renderer: TerminalRenderer) -> Self {
        Self { registry, renderer }
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::Create(args) => self.create_plan(args).await,
            PlanCommands::List(args) => self.list_plans(args).await,
            PlanCommands::Show(args) => self.show_plan(args).await,
        }
    }

    pub async fn handle_task_command(&self, command: TaskCommands) -> Result<()> {
        match command {
            TaskCommands::Add(args) => self.add_task(args).await,
            TaskCommands::Ready(args) => self.ready_tasks(args).await,
            TaskCommands::Next(args) => self.next_task(args).await,
            TaskCommands::Show(args) => self.show_task(args).await,
            TaskCommands::Start(args) => {
                self.change_status(args, TaskStatus::InProgress, None).await
            }
            TaskCommands::Done(FinishTaskArgs {
                plan_id,
                task_id,
                output,
            }) => {
                let args = TaskRefArgs { plan_id, task_id };
                self.change_status(args, TaskStatus::Done, output).await
            }
            TaskCommands::Fail(FinishTaskArgs {
                plan_id,
                task_id,
                output,
            }) => {
                let args = TaskRefArgs { plan_id, task_id };
                self.change_status(args, TaskStatus::Failed, output).await
            }
            TaskCommands::Pitch(args) => self.pitch(args).await,
        }
    }

    async fn create_plan(&self, args: CreatePlanArgs) -> Result<()> {
        let plan = self
            .registry
            .obtain(&ObtainPlan::fresh(args.agent, args.goal))
            .await
            .context("Failed to create plan")?;
        let report = self.save(&plan).await?;

        let output = format!("{}\n{report}", CreateResult::new(plan.record().await));
        self.renderer.render(&output)
    }

    pub async fn list_plans(&self, args: ListPlansArgs) -> Result<()> {
        let filter = match args.agent {
            Some(agent) => PlanFilter::for_agent(agent),
            None => PlanFilter::default(),
        };
        let plans = self
            .registry
            .list_plans(&filter)
            .await
            .context("Failed to list plans")?;

        self.renderer.render(&PlanSummaries(plans).to_string())
    }

    async fn show_plan(&self, args: PlanRefArgs) -> Result<()> {
        let plan = self.open(&args.plan_id).await?;
        let mut tasks = Vec::new();
        for id in plan.all_task_ids().await {
            tasks.push(plan.get_task(&id).await?);
        }

        let output = format!("{}\n{}", plan.record().await, Tasks(tasks));
        self.renderer.render(&output)
    }

    async fn add_task(&self, args: AddTaskArgs) -> Result<()> {
        let plan = self.open(&args.plan_id).await?;
        let task = Task::from_params(plan.plan_id(), &TaskCreate::from(args));
        let task_id = plan
            .register_task(task)
            .await
            .context("Failed to register task")?;
        let report = self.save(&plan).await?;

        let task = plan.get_task(&task_id).await?;
        self.renderer
            .render(&format!("{}\n{report}", CreateResult::new(task)))
    }

    async fn ready_tasks(&self, args: PlanRefArgs) -> Result<()> {
        let plan = self.open(&args.plan_id).await?;
        let tasks = plan.get_ready_tasks().await?;
        self.renderer.render(&Tasks(tasks).to_string())
    }

    async fn next_task(&self, args: PlanRefArgs) -> Result<()> {
        let plan = self.open(&args.plan_id).await?;
        let output = match plan.get_first_ready_task().await? {
            Some(task) => task.to_string(),
            None => "No task is ready.\n".to_string(),
        };
        self.renderer.render(&output)
    }

    async fn show_task(&self, args: TaskRefArgs) -> Result<()> {
        let plan = self.open(&args.plan_id).await?;
        let task = plan
            .get_task(&args.task_id)
            .await
            .with_context(|| format!("Failed to show task {}", args.task_id))?;
        self.renderer.render(&task.to_string())
    }

    async fn change_status(
        &self,
        args: TaskRefArgs,
        status: TaskStatus,
        output: Option<String>,
    ) -> Result<()> {
        let plan = self.open(&args.plan_id).await?;
        let update = plan
            .update_task(&args.task_id, |task| {
                task.status = status;
                if output.is_some() {
                    task.output = output;
                }
            })
            .await
            .with_context(|| format!("Failed to update task {}", args.task_id))?;
        let report = self.save(&plan).await?;

        self.renderer.render(&format!("{update}\n{report}"))
    }

    async fn pitch(&self, args: PitchArgs) -> Result<()> {
        let plan = self.open(&args.plan_id).await?;
        let pitch = plan
            .generate_pitch(args.task_id.as_deref())
            .await
            .context("Failed to generate pitch")?;
        self.renderer.render(&pitch.to_string())
    }

    /// Resumes a stored plan on behalf of the agent that owns it.
    async fn open(&self, plan_id: &str) -> Result<Arc<Plan>> {
        let id = plan_id.to_string();
        let record = store::run_blocking(self.registry.store(), move |store| store.get_plan(&id))
            .await
            .with_context(|| format!("Failed to find plan {plan_id}"))?;
        debug!("Resuming plan {} for agent {}", plan_id, record.agent_id);

        self.registry
            .obtain(&ObtainPlan::resume(record.agent_id, plan_id))
            .await
            .with_context(|| format!("Failed to resume plan {plan_id}"))
    }

    async fn save(&self, plan: &Plan) -> Result<SaveReport> {
        let report = plan.save().await.context("Failed to save plan")?;
        if !report.is_complete() {
            warn!(
                "{} task(s) of plan {} were not saved",
                report.failures.len(),
                plan.plan_id()
            );
        }
        Ok(report)
    }
}
