//! First-run fixtures. Each table is checked independently and repopulated
//! whenever it is observed empty, so a fresh database comes up with
//! something to show.

use tracing::info;

use crate::models::{InsertGoal, InsertHabit, InsertTodo, today};
use crate::repository::Repository;

pub async fn run(repo: &Repository) -> Result<(), sqlx::Error> {
    if repo.list_todos().await?.is_empty() {
        for (title, priority, completed) in [
            ("Complete project documentation", "high", 0),
            ("Review pull requests", "medium", 0),
            ("Team sync meeting", "medium", 1),
        ] {
            repo.create_todo(InsertTodo {
                title: title.to_string(),
                completed,
                priority: priority.to_string(),
                date: Some(today()),
            })
            .await?;
        }
        info!("seeded todos");
    }

    if repo.list_habits().await?.is_empty() {
        for (name, category, streak) in [
            ("Drink 2L Water", "Health", 5),
            ("Read 30 mins", "Learning", 12),
            ("Code for 1 hour", "Productivity", 3),
        ] {
            repo.create_habit(InsertHabit {
                name: name.to_string(),
                category: category.to_string(),
                streak,
            })
            .await?;
        }
        info!("seeded habits");
    }

    if repo.list_goals().await?.is_empty() {
        repo.create_goal(InsertGoal {
            title: "Learn Rust".to_string(),
            category: "Learning".to_string(),
            target_date: "2024-12-31".to_string(),
            current_progress: 45,
            target_value: 100,
            unit: "%".to_string(),
            completed: 0,
        })
        .await?;
        repo.create_goal(InsertGoal {
            title: "Launch Side Project".to_string(),
            category: "Productivity".to_string(),
            target_date: "2024-06-30".to_string(),
            current_progress: 3,
            target_value: 10,
            unit: "milestones".to_string(),
            completed: 0,
        })
        .await?;
        info!("seeded goals");
    }

    Ok(())
}
