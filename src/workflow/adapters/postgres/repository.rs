//! `PostgreSQL` store implementation for tasks, workflows, and results.

use super::{
    models::{TaskChangeset, TaskResultRow, TaskRow, WorkflowChangeset, WorkflowRow},
    schema::{task_results, tasks, workflows},
};
use crate::workflow::{
    domain::{
        ClientId, PersistedTaskData, PersistedWorkflowData, ResultId, StepNumber, Task, TaskId,
        TaskResult, TaskStatus, TaskType, Workflow, WorkflowId, WorkflowStatus,
    },
    ports::{ResultRepository, StoreError, StoreResult, TaskRepository, WorkflowRepository},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by workflow adapters.
pub type WorkflowPgPool = Pool<ConnectionManager<PgConnection>>;

const STEP_UNIQUE_CONSTRAINT: &str = "idx_tasks_workflow_step_unique";

/// `PostgreSQL`-backed workflow store.
#[derive(Debug, Clone)]
pub struct PostgresWorkflowStore {
    pool: WorkflowPgPool,
}

impl PostgresWorkflowStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: WorkflowPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StoreError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresWorkflowStore {
    async fn store_task(&self, task: &Task) -> StoreResult<()> {
        let row = task_to_row(task)?;
        let task_id = task.id();
        let workflow_id = task.workflow_id();
        let step_number = task.step_number();

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_constraint(info.as_ref(), STEP_UNIQUE_CONSTRAINT) =>
                    {
                        StoreError::DuplicateStep {
                            workflow_id,
                            step_number,
                        }
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        StoreError::DuplicateTask(task_id)
                    }
                    _ => StoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_task(&self, task: &Task) -> StoreResult<()> {
        let task_id = task.id();
        let changeset = TaskChangeset {
            status: task.status().as_str().to_owned(),
            progress: task.progress().map(str::to_owned),
            result_id: task.result_id().map(ResultId::into_inner),
            updated_at: task.updated_at(),
        };

        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.find(task_id.into_inner()))
                .set(&changeset)
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if updated == 0 {
                return Err(StoreError::TaskNotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_task_by_step(
        &self,
        workflow_id: WorkflowId,
        step_number: StepNumber,
    ) -> StoreResult<Option<Task>> {
        let step = step_to_column(step_number)?;
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::workflow_id.eq(workflow_id.into_inner()))
                .filter(tasks::step_number.eq(step))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_workflow_tasks(&self, workflow_id: WorkflowId) -> StoreResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::workflow_id.eq(workflow_id.into_inner()))
                .order((tasks::step_number.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn find_dependents(
        &self,
        workflow_id: WorkflowId,
        step_number: StepNumber,
        status: TaskStatus,
    ) -> StoreResult<Vec<Task>> {
        let step = step_to_column(step_number)?;
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::workflow_id.eq(workflow_id.into_inner()))
                .filter(tasks::dependency_step_number.eq(step))
                .filter(tasks::status.eq(status.as_str()))
                .order((tasks::step_number.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_tasks_by_status(&self, status: TaskStatus) -> StoreResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::status.eq(status.as_str()))
                .order((
                    tasks::created_at.asc(),
                    tasks::step_number.asc(),
                    tasks::id.asc(),
                ))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(StoreError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(tasks::table.find(id.into_inner()))
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if deleted == 0 {
                return Err(StoreError::TaskNotFound(id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl WorkflowRepository for PostgresWorkflowStore {
    async fn store_workflow(&self, workflow: &Workflow) -> StoreResult<()> {
        let row = workflow_to_row(workflow);
        let workflow_id = workflow.id();
        self.run_blocking(move |connection| {
            diesel::insert_into(workflows::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        StoreError::DuplicateWorkflow(workflow_id)
                    }
                    _ => StoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_workflow(&self, workflow: &Workflow) -> StoreResult<()> {
        let workflow_id = workflow.id();
        let changeset = WorkflowChangeset {
            status: workflow.status().as_str().to_owned(),
            final_result: workflow.final_result().map(str::to_owned),
            updated_at: workflow.updated_at(),
        };
        self.run_blocking(move |connection| {
            let updated = diesel::update(workflows::table.find(workflow_id.into_inner()))
                .set(&changeset)
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if updated == 0 {
                return Err(StoreError::WorkflowNotFound(workflow_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_workflow(&self, id: WorkflowId) -> StoreResult<Option<Workflow>> {
        self.run_blocking(move |connection| {
            let row = workflows::table
                .find(id.into_inner())
                .select(WorkflowRow::as_select())
                .first::<WorkflowRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_workflow).transpose()
        })
        .await
    }

    async fn delete_workflow(&self, id: WorkflowId) -> StoreResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(workflows::table.find(id.into_inner()))
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if deleted == 0 {
                return Err(StoreError::WorkflowNotFound(id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ResultRepository for PostgresWorkflowStore {
    async fn store_result(&self, result: &TaskResult) -> StoreResult<()> {
        let row = result_to_row(result);
        let result_id = result.id();
        self.run_blocking(move |connection| {
            diesel::insert_into(task_results::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        StoreError::DuplicateResult(result_id)
                    }
                    _ => StoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_result(&self, id: ResultId) -> StoreResult<Option<TaskResult>> {
        self.run_blocking(move |connection| {
            let row = task_results::table
                .find(id.into_inner())
                .select(TaskResultRow::as_select())
                .first::<TaskResultRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            Ok(row.map(row_to_result))
        })
        .await
    }

    async fn delete_result(&self, id: ResultId) -> StoreResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(task_results::table.find(id.into_inner()))
                .execute(connection)
                .map_err(StoreError::persistence)?;
            if deleted == 0 {
                return Err(StoreError::ResultNotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn is_constraint(info: &dyn DatabaseErrorInformation, constraint: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == constraint)
}

fn step_to_column(step_number: StepNumber) -> StoreResult<i32> {
    i32::try_from(step_number.value()).map_err(StoreError::persistence)
}

fn step_from_column(value: i32) -> StoreResult<StepNumber> {
    let raw = u32::try_from(value).map_err(StoreError::invalid_persisted_data)?;
    StepNumber::new(raw).map_err(StoreError::invalid_persisted_data)
}

fn task_to_row(task: &Task) -> StoreResult<TaskRow> {
    Ok(TaskRow {
        id: task.id().into_inner(),
        workflow_id: task.workflow_id().into_inner(),
        client_id: task.client_id().as_str().to_owned(),
        step_number: step_to_column(task.step_number())?,
        dependency_step_number: task.dependency_step_number().map(step_to_column).transpose()?,
        task_type: task.task_type().as_str().to_owned(),
        payload: task.payload().to_owned(),
        status: task.status().as_str().to_owned(),
        progress: task.progress().map(str::to_owned),
        result_id: task.result_id().map(ResultId::into_inner),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> StoreResult<Task> {
    let TaskRow {
        id,
        workflow_id,
        client_id,
        step_number,
        dependency_step_number,
        task_type,
        payload,
        status,
        progress,
        result_id,
        created_at,
        updated_at,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        workflow_id: WorkflowId::from_uuid(workflow_id),
        client_id: ClientId::new(client_id).map_err(StoreError::invalid_persisted_data)?,
        step_number: step_from_column(step_number)?,
        dependency_step_number: dependency_step_number.map(step_from_column).transpose()?,
        task_type: TaskType::new(task_type),
        payload,
        status: TaskStatus::try_from(status.as_str())
            .map_err(StoreError::invalid_persisted_data)?,
        progress,
        result_id: result_id.map(ResultId::from_uuid),
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}

fn workflow_to_row(workflow: &Workflow) -> WorkflowRow {
    WorkflowRow {
        id: workflow.id().into_inner(),
        client_id: workflow.client_id().as_str().to_owned(),
        status: workflow.status().as_str().to_owned(),
        final_result: workflow.final_result().map(str::to_owned),
        created_at: workflow.created_at(),
        updated_at: workflow.updated_at(),
    }
}

fn row_to_workflow(row: WorkflowRow) -> StoreResult<Workflow> {
    let data = PersistedWorkflowData {
        id: WorkflowId::from_uuid(row.id),
        client_id: ClientId::new(row.client_id).map_err(StoreError::invalid_persisted_data)?,
        status: WorkflowStatus::try_from(row.status.as_str())
            .map_err(StoreError::invalid_persisted_data)?,
        final_result: row.final_result,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Workflow::from_persisted(data))
}

fn result_to_row(result: &TaskResult) -> TaskResultRow {
    TaskResultRow {
        id: result.id().into_inner(),
        task_id: result.task_id().into_inner(),
        data: result.data().to_owned(),
        created_at: result.created_at(),
    }
}

fn row_to_result(row: TaskResultRow) -> TaskResult {
    TaskResult::from_persisted(
        ResultId::from_uuid(row.id),
        TaskId::from_uuid(row.task_id),
        row.data,
        row.created_at,
    )
}
