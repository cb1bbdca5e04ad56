use crate::domain::{models::user::{User, UserRole}, ports::UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepo {
    async fn create(&self, name: &str, role: UserRole, created_at: DateTime<Utc>) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (name, role, created_at) VALUES (?, ?, ?) RETURNING id, name, role, created_at",
        )
            .bind(name)
            .bind(role)
            .bind(created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_student_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, role, created_at FROM users WHERE role = 'student' AND name = ? ORDER BY id ASC LIMIT 1",
        )
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
