//! User Storage
//! Mission: Persist platform accounts (viewers, creators, admins) in SQLite

use crate::auth::models::{User, UserRole};
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{info, warn};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
    bcrypt_cost: u32,
}

impl UserStore {
    /// Create a new user store, initialize the schema and seed an admin
    pub fn new(db_path: &str, admin_password: &str) -> Result<Self> {
        Self::with_cost(db_path, admin_password, DEFAULT_COST)
    }

    /// Same as `new` with an explicit bcrypt cost (tests use the minimum)
    pub fn with_cost(db_path: &str, admin_password: &str, bcrypt_cost: u32) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
            bcrypt_cost,
        };
        store.init_db(admin_password)?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open user database {}", self.db_path))
    }

    fn init_db(&self, admin_password: &str) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        self.create_default_admin(&conn, admin_password)?;

        Ok(())
    }

    /// Seed one admin account so a fresh deployment can be managed
    fn create_default_admin(&self, conn: &Connection, admin_password: &str) -> Result<()> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE role = 'admin'",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin users")?;

        if count > 0 {
            return Ok(());
        }

        let admin = self.new_user("admin", admin_password, UserRole::Admin)?;
        Self::insert(conn, &admin).context("Failed to insert admin user")?;

        info!("🔐 Default admin user created (username: admin)");
        warn!("⚠️  Set ADMIN_PASSWORD before exposing this instance");

        Ok(())
    }

    fn new_user(&self, username: &str, password: &str, role: UserRole) -> Result<User> {
        let password_hash =
            hash(password, self.bcrypt_cost).context("Failed to hash password")?;

        Ok(User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            role,
            created_at: Utc::now().to_rfc3339(),
        })
    }

    fn insert(conn: &Connection, user: &User) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO users (id, username, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.username,
                user.password_hash,
                user.role.as_str(),
                user.created_at,
            ],
        )
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        let id: String = row.get(0)?;
        let id = Uuid::parse_str(&id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let role_str: String = row.get(3)?;

        Ok(User {
            id,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            role: UserRole::from_str(&role_str).unwrap_or(UserRole::Viewer),
            created_at: row.get(4)?,
        })
    }

    /// Get user by username
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.connect()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
                params![username],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Verify username and password
    pub fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        match self.get_user_by_username(username)? {
            Some(user) => {
                verify(password, &user.password_hash).context("Failed to verify password")
            }
            None => Ok(false),
        }
    }

    /// Create a new user; fails if the username is taken
    pub fn create_user(&self, username: &str, password: &str, role: UserRole) -> Result<User> {
        let user = self.new_user(username, password, role)?;

        let conn = self.connect()?;
        Self::insert(&conn, &user).context("Failed to insert user")?;

        info!(
            "✅ Created user: {} ({})",
            user.username,
            user.role.as_str()
        );

        Ok(user)
    }

    /// List all users (admin only)
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY created_at ASC",
            USER_COLUMNS
        ))?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Delete a user by ID (admin only)
    pub fn delete_user(&self, user_id: &Uuid) -> Result<()> {
        let conn = self.connect()?;

        let rows_affected = conn.execute(
            "DELETE FROM users WHERE id = ?1",
            params![user_id.to_string()],
        )?;

        if rows_affected == 0 {
            anyhow::bail!("User not found");
        }

        info!("🗑️  Deleted user: {}", user_id);
        Ok(())
    }
}
