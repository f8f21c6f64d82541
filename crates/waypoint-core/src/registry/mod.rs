//! Process-wide mapping from agents to their live plans.
//!
//! The first [`PlanRegistry::obtain`] for an agent constructs its plan,
//! either by resuming a stored one or by creating a fresh one; every later
//! call returns the same [`Arc<Plan>`]. Concurrent first calls for the same
//! agent wait on one construction instead of racing.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use waypoint_core::{params::ObtainPlan, store::MemoryStore, PlanRegistryBuilder};
//!
//! # async fn example() -> waypoint_core::Result<()> {
//! let registry = PlanRegistryBuilder::new()
//!     .with_store(Arc::new(MemoryStore::new()))
//!     .build()
//!     .await?;
//!
//! let plan = registry.obtain(&ObtainPlan::fresh("agent-1", "ship feature X")).await?;
//! let again = registry.obtain(&ObtainPlan::fresh("agent-1", "ignored")).await?;
//! assert!(Arc::ptr_eq(&plan, &again));
//! # Ok(())
//! # }
//! ```

mod builder;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use tokio::sync::OnceCell;

pub use builder::PlanRegistryBuilder;

use crate::{
    config::PlanConfig,
    error::{PlanError, Result},
    models::{derive_plan_status, PlanFilter, PlanSummary, StatusCounts, TaskFilter},
    params::ObtainPlan,
    plan::{AutosaveHandle, Plan},
    store::{run_blocking, SharedStore},
};

type PlanSlot = Arc<OnceCell<Arc<Plan>>>;

/// Registry of live plans, one per agent.
pub struct PlanRegistry {
    store: SharedStore,
    config: PlanConfig,
    plans: Mutex<HashMap<String, PlanSlot>>,
    autosaves: Mutex<Vec<AutosaveHandle>>,
}

impl PlanRegistry {
    pub(crate) fn new(store: SharedStore, config: PlanConfig) -> Self {
        Self {
            store,
            config,
            plans: Mutex::new(HashMap::new()),
            autosaves: Mutex::new(Vec::new()),
        }
    }

    /// Returns the plan of `params.agent_id`, constructing it on first use.
    ///
    /// With `plan_id` set the stored plan is resumed, otherwise a fresh plan
    /// seeded with `goal` is created. Once an agent has a live plan both
    /// fields are ignored. A failed construction registers nothing, so a
    /// later call can try again.
    pub async fn obtain(&self, params: &ObtainPlan) -> Result<Arc<Plan>> {
        if params.agent_id.trim().is_empty() {
            return Err(PlanError::invalid_input("agent_id").with_reason("must not be empty"));
        }

        let slot = {
            let mut plans = lock(&self.plans)?;
            Arc::clone(plans.entry(params.agent_id.clone()).or_default())
        };

        let plan = slot
            .get_or_try_init(|| async {
                let plan = Arc::new(self.construct(params).await?);
                self.track_autosave(&plan)?;
                Ok::<_, PlanError>(plan)
            })
            .await?;
        Ok(Arc::clone(plan))
    }

    /// The live plan of `agent_id`, if one was obtained.
    pub fn get(&self, agent_id: &str) -> Option<Arc<Plan>> {
        let plans = lock(&self.plans).ok()?;
        plans.get(agent_id).and_then(|slot| slot.get().cloned())
    }

    /// Number of live plans.
    pub fn len(&self) -> usize {
        lock(&self.plans)
            .map(|plans| plans.values().filter(|slot| slot.initialized()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Summaries of stored plans, with task counts taken from the store.
    pub async fn list_plans(&self, filter: &PlanFilter) -> Result<Vec<PlanSummary>> {
        let filter = filter.clone();
        run_blocking(&self.store, move |store| {
            let records = store.list_plans(&filter)?;
            let mut summaries = Vec::with_capacity(records.len());
            for mut record in records {
                let tasks = store.list_tasks(&TaskFilter::for_plan(&record.plan_id))?;
                let counts = StatusCounts::from_statuses(tasks.iter().map(|t| t.status));
                record.status = derive_plan_status(&counts);
                summaries.push(PlanSummary::from_record(record, counts));
            }
            Ok(summaries)
        })
        .await
    }

    /// Saves every live plan, returning the first error after trying all.
    pub async fn save_all(&self) -> Result<()> {
        let plans: Vec<Arc<Plan>> = {
            let plans = lock(&self.plans)?;
            plans.values().filter_map(|slot| slot.get().cloned()).collect()
        };

        let mut first_error = None;
        for plan in plans {
            match plan.save().await {
                Ok(report) if !report.is_complete() => log::warn!(
                    "Plan {} has {} unsaved task(s)",
                    plan.plan_id(),
                    report.failures.len()
                ),
                Ok(_) => {}
                Err(e) => {
                    log::error!("Failed to save plan {}: {e}", plan.plan_id());
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn construct(&self, params: &ObtainPlan) -> Result<Plan> {
        let store = Arc::clone(&self.store);
        let plan = match &params.plan_id {
            Some(plan_id) => Plan::resume(store, self.config, &params.agent_id, plan_id).await?,
            None => {
                if params.goal.trim().is_empty() {
                    return Err(PlanError::invalid_input("goal")
                        .with_reason("a fresh plan needs a goal"));
                }
                Plan::create(store, self.config, &params.agent_id, &params.goal).await?
            }
        };
        Ok(plan)
    }

    /// Starts autosave for a freshly constructed plan when configured.
    fn track_autosave(&self, plan: &Arc<Plan>) -> Result<()> {
        if let Some(every) = self.config.autosave_interval {
            lock(&self.autosaves)?.push(plan.spawn_autosave(every));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| PlanError::Configuration {
        message: "Plan registry lock poisoned".to_string(),
    })
}
