//! Diesel schema for workflow persistence.

diesel::table! {
    /// Workflow records with their aggregate status.
    workflows (id) {
        /// Workflow identifier.
        id -> Uuid,
        /// Tenant tag.
        #[max_length = 255]
        client_id -> Varchar,
        /// Aggregate status.
        #[max_length = 50]
        status -> Varchar,
        /// Serialized final result, set once the workflow completes.
        final_result -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task records, one per workflow step.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning workflow.
        workflow_id -> Uuid,
        /// Tenant tag.
        #[max_length = 255]
        client_id -> Varchar,
        /// Step position, unique per workflow.
        step_number -> Int4,
        /// Predecessor step, if any.
        dependency_step_number -> Nullable<Int4>,
        /// Job selector.
        #[max_length = 255]
        task_type -> Varchar,
        /// Opaque job input.
        payload -> Text,
        /// Execution status.
        #[max_length = 50]
        status -> Varchar,
        /// Progress marker while in progress.
        progress -> Nullable<Text>,
        /// Result reference after completion.
        result_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Persisted task outputs.
    task_results (id) {
        /// Result identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Serialized output.
        data -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> workflows (workflow_id));
diesel::allow_tables_to_appear_in_same_query!(workflows, tasks, task_results);
