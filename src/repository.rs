//! Storage access layer: the only component that touches rows. Partial
//! updates fetch the current row, merge the supplied fields, and write the
//! full column set back; a missing id surfaces as `Ok(None)` for the
//! dispatchers to map. List ordering is entity-specific and part of the
//! API contract.

use sqlx::AnyPool;

use crate::models::{
    self, Goal, Habit, HabitLog, InsertGoal, InsertHabit, InsertHabitLog, InsertTodo,
    InsertWorkSession, Todo, UpdateGoal, UpdateHabit, UpdateTodo, UpdateWorkSession, WorkSession,
};

#[derive(Clone)]
pub struct Repository {
    pool: AnyPool,
}

impl Repository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // Todos: newest first.
    pub async fn list_todos(&self) -> Result<Vec<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            "SELECT id, title, completed, priority, date FROM todos ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create_todo(&self, input: InsertTodo) -> Result<Todo, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            "INSERT INTO todos (title, completed, priority, date) VALUES ($1, $2, $3, $4) \
             RETURNING id, title, completed, priority, date",
        )
        .bind(input.title)
        .bind(input.completed)
        .bind(input.priority)
        .bind(input.date)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_todo(
        &self,
        id: i64,
        patch: UpdateTodo,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let mut current = match sqlx::query_as::<_, Todo>(
            "SELECT id, title, completed, priority, date FROM todos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        {
            Some(row) => row,
            None => return Ok(None),
        };

        if let Some(title) = patch.title {
            current.title = title;
        }
        if let Some(completed) = patch.completed {
            current.completed = completed;
        }
        if let Some(priority) = patch.priority {
            current.priority = priority;
        }
        if let Some(date) = patch.date {
            current.date = Some(date);
        }

        sqlx::query(
            "UPDATE todos SET title = $1, completed = $2, priority = $3, date = $4 WHERE id = $5",
        )
        .bind(&current.title)
        .bind(current.completed)
        .bind(&current.priority)
        .bind(&current.date)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(current))
    }

    pub async fn delete_todo(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // Work sessions: most recent start first.
    pub async fn list_work_sessions(&self) -> Result<Vec<WorkSession>, sqlx::Error> {
        sqlx::query_as::<_, WorkSession>(
            "SELECT id, start_time, end_time, duration FROM work_sessions \
             ORDER BY start_time DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create_work_session(
        &self,
        input: InsertWorkSession,
    ) -> Result<WorkSession, sqlx::Error> {
        sqlx::query_as::<_, WorkSession>(
            "INSERT INTO work_sessions (start_time, end_time, duration) VALUES ($1, $2, $3) \
             RETURNING id, start_time, end_time, duration",
        )
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.duration)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_work_session(
        &self,
        id: i64,
        patch: UpdateWorkSession,
    ) -> Result<Option<WorkSession>, sqlx::Error> {
        let mut current = match sqlx::query_as::<_, WorkSession>(
            "SELECT id, start_time, end_time, duration FROM work_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        {
            Some(row) => row,
            None => return Ok(None),
        };

        if let Some(start_time) = patch.start_time {
            current.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            current.end_time = Some(end_time);
        }
        if let Some(duration) = patch.duration {
            current.duration = Some(duration);
        }

        sqlx::query(
            "UPDATE work_sessions SET start_time = $1, end_time = $2, duration = $3 WHERE id = $4",
        )
        .bind(&current.start_time)
        .bind(&current.end_time)
        .bind(current.duration)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(current))
    }

    // Goals: soonest deadline first.
    pub async fn list_goals(&self) -> Result<Vec<Goal>, sqlx::Error> {
        sqlx::query_as::<_, Goal>(
            "SELECT id, title, category, target_date, current_progress, target_value, unit, \
             completed FROM goals ORDER BY target_date ASC",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create_goal(&self, input: InsertGoal) -> Result<Goal, sqlx::Error> {
        sqlx::query_as::<_, Goal>(
            "INSERT INTO goals (title, category, target_date, current_progress, target_value, \
             unit, completed) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, title, category, target_date, current_progress, target_value, unit, \
             completed",
        )
        .bind(input.title)
        .bind(input.category)
        .bind(input.target_date)
        .bind(input.current_progress)
        .bind(input.target_value)
        .bind(input.unit)
        .bind(input.completed)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_goal(
        &self,
        id: i64,
        patch: UpdateGoal,
    ) -> Result<Option<Goal>, sqlx::Error> {
        let mut current = match sqlx::query_as::<_, Goal>(
            "SELECT id, title, category, target_date, current_progress, target_value, unit, \
             completed FROM goals WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        {
            Some(row) => row,
            None => return Ok(None),
        };

        if let Some(title) = patch.title {
            current.title = title;
        }
        if let Some(category) = patch.category {
            current.category = category;
        }
        if let Some(target_date) = patch.target_date {
            current.target_date = target_date;
        }
        if let Some(current_progress) = patch.current_progress {
            current.current_progress = current_progress;
        }
        if let Some(target_value) = patch.target_value {
            current.target_value = target_value;
        }
        if let Some(unit) = patch.unit {
            current.unit = unit;
        }
        if let Some(completed) = patch.completed {
            current.completed = completed;
        }

        sqlx::query(
            "UPDATE goals SET title = $1, category = $2, target_date = $3, current_progress = $4, \
             target_value = $5, unit = $6, completed = $7 WHERE id = $8",
        )
        .bind(&current.title)
        .bind(&current.category)
        .bind(&current.target_date)
        .bind(current.current_progress)
        .bind(current.target_value)
        .bind(&current.unit)
        .bind(current.completed)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(current))
    }

    pub async fn delete_goal(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // Habits: creation order.
    pub async fn list_habits(&self) -> Result<Vec<Habit>, sqlx::Error> {
        sqlx::query_as::<_, Habit>(
            "SELECT id, name, category, streak FROM habits ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create_habit(&self, input: InsertHabit) -> Result<Habit, sqlx::Error> {
        sqlx::query_as::<_, Habit>(
            "INSERT INTO habits (name, category, streak) VALUES ($1, $2, $3) \
             RETURNING id, name, category, streak",
        )
        .bind(input.name)
        .bind(input.category)
        .bind(input.streak)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_habit(
        &self,
        id: i64,
        patch: UpdateHabit,
    ) -> Result<Option<Habit>, sqlx::Error> {
        let mut current = match sqlx::query_as::<_, Habit>(
            "SELECT id, name, category, streak FROM habits WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        {
            Some(row) => row,
            None => return Ok(None),
        };

        if let Some(name) = patch.name {
            current.name = name;
        }
        if let Some(category) = patch.category {
            current.category = category;
        }
        if let Some(streak) = patch.streak {
            current.streak = streak;
        }

        sqlx::query("UPDATE habits SET name = $1, category = $2, streak = $3 WHERE id = $4")
            .bind(&current.name)
            .bind(&current.category)
            .bind(current.streak)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Some(current))
    }

    pub async fn delete_habit(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM habits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // Habit logs: most recent completion first.
    pub async fn list_habit_logs(&self) -> Result<Vec<HabitLog>, sqlx::Error> {
        sqlx::query_as::<_, HabitLog>(
            "SELECT id, habit_id, completed_at FROM habit_logs ORDER BY completed_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create_habit_log(&self, input: InsertHabitLog) -> Result<HabitLog, sqlx::Error> {
        let completed_at = input.completed_at.unwrap_or_else(models::today);
        sqlx::query_as::<_, HabitLog>(
            "INSERT INTO habit_logs (habit_id, completed_at) VALUES ($1, $2) \
             RETURNING id, habit_id, completed_at",
        )
        .bind(input.habit_id)
        .bind(completed_at)
        .fetch_one(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::storage;

    async fn setup() -> Repository {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: Some("sqlite::memory:".to_string()),
            db_max_connections: 1,
        };
        let pool = storage::open(&config).await.expect("in-memory storage");
        Repository::new(pool)
    }

    fn todo(title: &str) -> InsertTodo {
        InsertTodo {
            title: title.to_string(),
            completed: 0,
            priority: "medium".to_string(),
            date: None,
        }
    }

    #[tokio::test]
    async fn todos_list_newest_first() {
        let repo = setup().await;

        repo.create_todo(todo("first")).await.expect("create");
        repo.create_todo(todo("second")).await.expect("create");
        repo.create_todo(todo("third")).await.expect("create");

        let todos = repo.list_todos().await.expect("list");
        let titles: Vec<_> = todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["third", "second", "first"]);
        assert!(todos[0].id > todos[2].id);
    }

    #[tokio::test]
    async fn create_returns_defaulted_fields() {
        let repo = setup().await;

        let created = repo.create_todo(todo("documented")).await.expect("create");
        assert!(created.id > 0);
        assert_eq!(created.priority, "medium");
        assert_eq!(created.completed, 0);
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let repo = setup().await;

        let created = repo
            .create_todo(InsertTodo {
                title: "write tests".to_string(),
                completed: 0,
                priority: "high".to_string(),
                date: Some("2024-05-01".to_string()),
            })
            .await
            .expect("create");

        let updated = repo
            .update_todo(
                created.id,
                UpdateTodo {
                    completed: Some(1),
                    ..Default::default()
                },
            )
            .await
            .expect("update")
            .expect("row exists");

        assert_eq!(updated.completed, 1);
        assert_eq!(updated.title, "write tests");
        assert_eq!(updated.priority, "high");
        assert_eq!(updated.date.as_deref(), Some("2024-05-01"));
    }

    #[tokio::test]
    async fn update_of_missing_id_returns_none() {
        let repo = setup().await;

        let result = repo
            .update_todo(
                9999,
                UpdateTodo {
                    completed: Some(1),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_removes_only_the_target_row() {
        let repo = setup().await;

        let keep = repo.create_todo(todo("keep")).await.expect("create");
        let gone = repo.create_todo(todo("gone")).await.expect("create");

        repo.delete_todo(gone.id).await.expect("delete");

        let ids: Vec<_> = repo
            .list_todos()
            .await
            .expect("list")
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, [keep.id]);
    }

    #[tokio::test]
    async fn goals_list_by_soonest_deadline() {
        let repo = setup().await;

        for (title, date) in [("later", "2025-01-01"), ("sooner", "2024-06-01")] {
            repo.create_goal(InsertGoal {
                title: title.to_string(),
                category: "Learning".to_string(),
                target_date: date.to_string(),
                current_progress: 0,
                target_value: 100,
                unit: "%".to_string(),
                completed: 0,
            })
            .await
            .expect("create");
        }

        let goals = repo.list_goals().await.expect("list");
        let titles: Vec<_> = goals.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, ["sooner", "later"]);
    }

    #[tokio::test]
    async fn work_sessions_list_by_most_recent_start() {
        let repo = setup().await;

        for start in ["2024-05-01T09:00:00Z", "2024-05-02T09:00:00Z"] {
            repo.create_work_session(InsertWorkSession {
                start_time: start.to_string(),
                end_time: None,
                duration: None,
            })
            .await
            .expect("create");
        }

        let sessions = repo.list_work_sessions().await.expect("list");
        assert_eq!(sessions[0].start_time, "2024-05-02T09:00:00Z");
    }

    #[tokio::test]
    async fn habits_list_in_creation_order() {
        let repo = setup().await;

        for name in ["alpha", "beta"] {
            repo.create_habit(InsertHabit {
                name: name.to_string(),
                category: "Health".to_string(),
                streak: 0,
            })
            .await
            .expect("create");
        }

        let habits = repo.list_habits().await.expect("list");
        let names: Vec<_> = habits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta"]);
    }

    #[tokio::test]
    async fn habit_log_defaults_completed_at_to_today() {
        let repo = setup().await;

        let log = repo
            .create_habit_log(InsertHabitLog {
                habit_id: 42,
                completed_at: None,
            })
            .await
            .expect("create");

        assert_eq!(log.habit_id, 42);
        assert_eq!(log.completed_at, crate::models::today());
    }

    #[tokio::test]
    async fn habit_logs_list_most_recent_first() {
        let repo = setup().await;

        for date in ["2024-05-01", "2024-05-03", "2024-05-02"] {
            repo.create_habit_log(InsertHabitLog {
                habit_id: 1,
                completed_at: Some(date.to_string()),
            })
            .await
            .expect("create");
        }

        let logs = repo.list_habit_logs().await.expect("list");
        let dates: Vec<_> = logs.iter().map(|l| l.completed_at.as_str()).collect();
        assert_eq!(dates, ["2024-05-03", "2024-05-02", "2024-05-01"]);
    }
}
