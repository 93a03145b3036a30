//! Task and tag storage.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::sqlite::SqlitePool;

/// Upper bound on tags attached to a single task.
pub const MAX_TAGS_PER_TASK: usize = 5;

#[derive(Clone)]
pub struct TaskStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
}

/// A task with its tags, as returned to the owner.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    #[serde(skip)]
    pub id: i64,
    pub uuid: String,
    pub title: String,
    pub description: String,
    /// RFC 3339 timestamp
    pub date_start: String,
    /// Duration in seconds
    pub duration: i64,
    pub status: bool,
    pub tags: Vec<Tag>,
}

/// Validated input for a new task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub date_start: String,
    pub duration: i64,
    pub tags: Vec<String>,
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    uuid: String,
    title: String,
    description: String,
    date_start: String,
    duration: i64,
    status: bool,
}

impl TaskRow {
    fn into_task(self, tags: Vec<Tag>) -> Task {
        Task {
            id: self.id,
            uuid: self.uuid,
            title: self.title,
            description: self.description,
            date_start: self.date_start,
            duration: self.duration,
            status: self.status,
            tags,
        }
    }
}

impl TaskStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a task and its tags in a single transaction.
    pub async fn create_with_tags(&self, user_id: i64, task: NewTask) -> Result<Task, sqlx::Error> {
        let uuid = uuid::Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO tasks (uuid, user_id, title, description, date_start, duration) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&uuid)
        .bind(user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.date_start)
        .bind(task.duration)
        .execute(&mut *tx)
        .await?;
        let task_id = result.last_insert_rowid();

        for name in &task.tags {
            sqlx::query("INSERT INTO tags (name, user_id, task_id) VALUES (?, ?, ?)")
                .bind(name)
                .bind(user_id)
                .bind(task_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(Task {
            id: task_id,
            uuid,
            title: task.title,
            description: task.description,
            date_start: task.date_start,
            duration: task.duration,
            status: false,
            tags: task.tags.into_iter().map(|name| Tag { name }).collect(),
        })
    }

    /// List all tasks owned by a user, newest first.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Task>, sqlx::Error> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT id, uuid, title, description, date_start, duration, status
             FROM tasks WHERE user_id = ? ORDER BY id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let tag_rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT task_id, name FROM tags WHERE user_id = ? ORDER BY id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        let mut tags_by_task: HashMap<i64, Vec<Tag>> = HashMap::new();
        for (task_id, name) in tag_rows {
            tags_by_task.entry(task_id).or_default().push(Tag { name });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = tags_by_task.remove(&row.id).unwrap_or_default();
                row.into_task(tags)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{Database, NewTask};

    fn new_task(title: &str, tags: &[&str]) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: String::new(),
            date_start: "2024-05-01T09:00:00+00:00".to_string(),
            duration: 3600,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_tasks() {
        let db = Database::open(":memory:").await.unwrap();
        let user_id = db.users().create("alice", "hash").await.unwrap();

        let created = db
            .tasks()
            .create_with_tags(user_id, new_task("Write report", &["work", "urgent"]))
            .await
            .unwrap();
        assert!(!created.status);
        assert_eq!(created.tags.len(), 2);

        db.tasks()
            .create_with_tags(user_id, new_task("Gym", &[]))
            .await
            .unwrap();

        let tasks = db.tasks().list_by_user(user_id).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Gym");
        assert!(tasks[0].tags.is_empty());
        assert_eq!(tasks[1].uuid, created.uuid);
        assert_eq!(tasks[1].tags, created.tags);
    }

    #[tokio::test]
    async fn test_tasks_are_scoped_to_owner() {
        let db = Database::open(":memory:").await.unwrap();
        let alice = db.users().create("alice", "hash").await.unwrap();
        let bob = db.users().create("bob", "hash").await.unwrap();

        db.tasks()
            .create_with_tags(alice, new_task("Alice task", &["home"]))
            .await
            .unwrap();

        assert!(db.tasks().list_by_user(bob).await.unwrap().is_empty());
        assert_eq!(db.tasks().list_by_user(alice).await.unwrap().len(), 1);
    }
}
