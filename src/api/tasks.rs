//! Task endpoints. All routes require authentication.
//!
//! - POST `/` - Create a task with optional tags
//! - GET `/` - List the caller's tasks

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    middleware,
    response::IntoResponse,
    routing::post,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, ResultExt, require_non_empty};
use crate::auth::{Auth, require_auth};
use crate::db::{Database, MAX_TAGS_PER_TASK, NewTask, Task};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

const MAX_TITLE_LENGTH: usize = 256;
const MIN_TAG_LENGTH: usize = 3;
const MAX_TAG_LENGTH: usize = 32;

#[derive(Clone)]
pub struct TasksState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(TasksState);

pub fn router(state: TasksState) -> Router {
    Router::new()
        .route("/", post(create_task).get(list_tasks))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<TasksState>,
        ))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateTaskRequest {
    title: String,
    #[serde(default)]
    description: String,
    date_start: DateTime<FixedOffset>,
    /// Duration in seconds
    duration: i64,
    #[serde(default)]
    tags: Vec<String>,
}

impl CreateTaskRequest {
    fn validate(self) -> Result<NewTask, ApiError> {
        require_non_empty(&self.title, "title")?;
        if self.title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ApiError::bad_request(
                "The title cannot be longer than 256 characters",
            ));
        }

        if self.duration <= 0 {
            return Err(ApiError::bad_request("duration is required"));
        }

        if self.tags.len() > MAX_TAGS_PER_TASK {
            return Err(ApiError::bad_request(
                "Maximum number of tags exceeded for this task",
            ));
        }

        let tags = self
            .tags
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .collect::<Vec<_>>();
        if tags.iter().any(|tag| {
            let len = tag.chars().count();
            !(MIN_TAG_LENGTH..=MAX_TAG_LENGTH).contains(&len)
        }) {
            return Err(ApiError::bad_request(
                "Tag names must be between 3 and 32 characters long",
            ));
        }

        Ok(NewTask {
            title: self.title,
            description: self.description,
            date_start: self.date_start.to_rfc3339(),
            duration: self.duration,
            tags,
        })
    }
}

#[derive(Serialize)]
struct TaskResponse {
    data: Task,
}

#[derive(Serialize)]
struct ListTasksResponse {
    tasks: Vec<Task>,
}

async fn create_task(
    State(state): State<TasksState>,
    Auth(user): Auth,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let new_task = request.validate()?;

    let task = state
        .db
        .tasks()
        .create_with_tags(user.id, new_task)
        .await
        .db_err("Failed to create task")?;

    info!(user_id = user.id, task = %task.uuid, "Task created");

    Ok(Json(TaskResponse { data: task }))
}

async fn list_tasks(
    State(state): State<TasksState>,
    Auth(user): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = state
        .db
        .tasks()
        .list_by_user(user.id)
        .await
        .db_err("Failed to list tasks")?;

    Ok(Json(ListTasksResponse { tasks }))
}
