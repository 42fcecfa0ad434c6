//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{Comment, Group, Post, Report, UserProfile};

/// A stored user account, including the password hash.
///
/// Never serialized directly; handlers convert to [`UserProfile`] first.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl UserAccount {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            uid: self.id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            is_admin: self.is_admin,
            created_at: self.created_at.clone(),
        }
    }
}

/// A stored session. The bearer token is `"<id>.<secret>"`.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub secret: String,
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// Create a new user account.
    pub async fn create_user(
        &self,
        display_name: &str,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<UserAccount, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (id, email, display_name, password_hash, is_admin, created_at) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(email)
        .bind(display_name)
        .bind(password_hash)
        .bind(is_admin as i32)
        .bind(&now)
        .execute(&self.pool)
        .await;

        if let Err(err) = result {
            if err
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                return Err(AppError::Conflict(format!(
                    "Email {} is already registered",
                    email
                )));
            }
            return Err(err.into());
        }

        Ok(UserAccount {
            id,
            email: email.to_string(),
            display_name: display_name.to_string(),
            password_hash: password_hash.to_string(),
            is_admin,
            created_at: now,
        })
    }

    /// Look up a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, AppError> {
        let row = sqlx::query(
            "SELECT id, email, display_name, password_hash, is_admin, created_at FROM users WHERE email = ?"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Look up a user by id.
    pub async fn get_user(&self, id: &str) -> Result<Option<UserAccount>, AppError> {
        let row = sqlx::query(
            "SELECT id, email, display_name, password_hash, is_admin, created_at FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// List all user profiles, newest first.
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, AppError> {
        let rows = sqlx::query(
            "SELECT id, email, display_name, password_hash, is_admin, created_at FROM users ORDER BY created_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| user_from_row(row).profile())
            .collect())
    }

    // ==================== SESSION OPERATIONS ====================

    /// Create a session for a user.
    pub async fn create_session(&self, user_id: &str) -> Result<Session, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let secret = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO sessions (id, user_id, secret, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(user_id)
            .bind(&secret)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(Session {
            id,
            user_id: user_id.to_string(),
            secret,
        })
    }

    /// Look up a session by id.
    pub async fn get_session(&self, id: &str) -> Result<Option<Session>, AppError> {
        let row = sqlx::query("SELECT id, user_id, secret FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Session {
            id: row.get("id"),
            user_id: row.get("user_id"),
            secret: row.get("secret"),
        }))
    }

    /// Delete a session (sign-out).
    pub async fn delete_session(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== POST OPERATIONS ====================

    /// Create a new post. A null group id means the global feed.
    pub async fn create_post(
        &self,
        user_id: &str,
        user_name: &str,
        content: &str,
        group_id: Option<&str>,
    ) -> Result<Post, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO posts (id, user_id, user_name, content, group_id, report_count, created_at) VALUES (?, ?, ?, ?, ?, 0, ?)"
        )
        .bind(&id)
        .bind(user_id)
        .bind(user_name)
        .bind(content)
        .bind(group_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Post {
            id,
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            content: content.to_string(),
            created_at: now,
            likes: Vec::new(),
            comments: Vec::new(),
            group_id: group_id.map(|g| g.to_string()),
            report_count: 0,
        })
    }

    /// Get a post by id with likes and comments embedded.
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_id, user_name, content, group_id, report_count, created_at FROM posts WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_post(&row).await?)),
            None => Ok(None),
        }
    }

    /// List global feed posts (no group), newest first, with an optional
    /// case-insensitive substring filter on content or author name.
    pub async fn list_feed_posts(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, AppError> {
        let rows = match search.filter(|s| !s.is_empty()) {
            Some(term) => {
                let pattern = like_pattern(term);
                sqlx::query(
                    r#"SELECT id, user_id, user_name, content, group_id, report_count, created_at
                       FROM posts
                       WHERE group_id IS NULL
                         AND (content LIKE ? ESCAPE '\' OR user_name LIKE ? ESCAPE '\')
                       ORDER BY created_at DESC LIMIT ? OFFSET ?"#,
                )
                .bind(&pattern)
                .bind(&pattern)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"SELECT id, user_id, user_name, content, group_id, report_count, created_at
                       FROM posts WHERE group_id IS NULL
                       ORDER BY created_at DESC LIMIT ? OFFSET ?"#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        self.hydrate_posts(rows).await
    }

    /// List posts belonging to a group, newest first.
    ///
    /// Does not verify the group exists: posts orphaned by a group deletion
    /// must still be retrievable.
    pub async fn list_group_posts(&self, group_id: &str) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, user_name, content, group_id, report_count, created_at
               FROM posts WHERE group_id = ? ORDER BY created_at DESC"#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate_posts(rows).await
    }

    /// List posts authored by a user, newest first.
    pub async fn list_user_posts(&self, user_id: &str) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, user_name, content, group_id, report_count, created_at
               FROM posts WHERE user_id = ? ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate_posts(rows).await
    }

    /// List every post regardless of group, newest first (admin view).
    pub async fn list_all_posts(&self) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, user_name, content, group_id, report_count, created_at
               FROM posts ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        self.hydrate_posts(rows).await
    }

    /// Delete a post. Likes and comments go with it; reports do not.
    pub async fn delete_post(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post {} not found", id)));
        }

        sqlx::query("DELETE FROM post_likes WHERE post_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Toggle a user's like on a post. Returns whether the post is liked
    /// after the toggle plus the resulting likes set.
    pub async fn toggle_like(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<(bool, Vec<String>), AppError> {
        if self.get_post_row(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }

        // Remove-then-insert gives union/remove set semantics: a repeated
        // like is a no-op pair.
        let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = ? AND user_id = ?")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let liked = if removed.rows_affected() == 0 {
            sqlx::query("INSERT OR IGNORE INTO post_likes (post_id, user_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
            true
        } else {
            false
        };

        let likes = self.list_likes(post_id).await?;
        Ok((liked, likes))
    }

    /// Append a comment to a post.
    pub async fn add_comment(
        &self,
        post_id: &str,
        user_id: &str,
        user_name: &str,
        text: &str,
    ) -> Result<Comment, AppError> {
        if self.get_post_row(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO comments (id, post_id, user_id, user_name, text, created_at) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(post_id)
        .bind(user_id)
        .bind(user_name)
        .bind(text)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Comment {
            id,
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            text: text.to_string(),
            created_at: now,
        })
    }

    /// List comments on a post, oldest first.
    pub async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, user_name, text, created_at FROM comments WHERE post_id = ? ORDER BY created_at"
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    // ==================== REPORT OPERATIONS ====================

    /// File a report against a post.
    ///
    /// Snapshots the post content and bumps the denormalized report counter
    /// in the same transaction.
    pub async fn create_report(
        &self,
        post_id: &str,
        reported_by: &str,
        reason: &str,
    ) -> Result<Report, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT content FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await?;
        let post_content: String = match row {
            Some(row) => row.get("content"),
            None => {
                return Err(AppError::NotFound(format!("Post {} not found", post_id)));
            }
        };

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO reports (id, post_id, post_content, reported_by, reason, created_at) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(post_id)
        .bind(&post_content)
        .bind(reported_by)
        .bind(reason)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE posts SET report_count = report_count + 1 WHERE id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Report {
            id,
            post_id: post_id.to_string(),
            post_content,
            reported_by: reported_by.to_string(),
            reason: reason.to_string(),
            timestamp: now,
        })
    }

    /// List all reports, newest first.
    pub async fn list_reports(&self) -> Result<Vec<Report>, AppError> {
        let rows = sqlx::query(
            "SELECT id, post_id, post_content, reported_by, reason, created_at FROM reports ORDER BY created_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(report_from_row).collect())
    }

    /// Dismiss a report: deletes the report only, the post stays.
    pub async fn delete_report(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM reports WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Report {} not found", id)));
        }

        Ok(())
    }

    /// Purge: delete the reported post and the report in one transaction.
    ///
    /// A post that was already deleted by another path is tolerated; the
    /// report is removed either way.
    pub async fn purge_report(&self, report_id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT post_id FROM reports WHERE id = ?")
            .bind(report_id)
            .fetch_optional(&mut *tx)
            .await?;
        let post_id: String = match row {
            Some(row) => row.get("post_id"),
            None => {
                return Err(AppError::NotFound(format!(
                    "Report {} not found",
                    report_id
                )));
            }
        };

        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(&post_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM post_likes WHERE post_id = ?")
            .bind(&post_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(&post_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM reports WHERE id = ?")
            .bind(report_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ==================== GROUP OPERATIONS ====================

    /// Create a new group with the creator as sole initial member.
    ///
    /// Name uniqueness is not enforced.
    pub async fn create_group(
        &self,
        name: &str,
        description: &str,
        created_by: &str,
    ) -> Result<Group, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO groups (id, name, description, created_by, created_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(name)
        .bind(description)
        .bind(created_by)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO group_members (group_id, user_id) VALUES (?, ?)")
            .bind(&id)
            .bind(created_by)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Group {
            id,
            name: name.to_string(),
            description: description.to_string(),
            created_by: created_by.to_string(),
            members: vec![created_by.to_string()],
            created_at: now,
        })
    }

    /// List groups sorted by name, with an optional substring filter.
    pub async fn list_groups(&self, search: Option<&str>) -> Result<Vec<Group>, AppError> {
        let rows = match search.filter(|s| !s.is_empty()) {
            Some(term) => {
                let pattern = like_pattern(term);
                sqlx::query(
                    r#"SELECT id, name, description, created_by, created_at
                       FROM groups WHERE name LIKE ? ESCAPE '\' ORDER BY name"#,
                )
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, name, description, created_by, created_at FROM groups ORDER BY name",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut groups = Vec::with_capacity(rows.len());
        for row in &rows {
            groups.push(self.hydrate_group(row).await?);
        }
        Ok(groups)
    }

    /// Get a group by id with its member list.
    pub async fn get_group(&self, id: &str) -> Result<Option<Group>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, description, created_by, created_at FROM groups WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_group(&row).await?)),
            None => Ok(None),
        }
    }

    /// Delete a group and its membership rows. Posts are not cascaded and
    /// become orphaned.
    pub async fn delete_group(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM groups WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Group {} not found", id)));
        }

        sqlx::query("DELETE FROM group_members WHERE group_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ==================== HELPERS ====================

    async fn get_post_row(&self, id: &str) -> Result<Option<sqlx::sqlite::SqliteRow>, AppError> {
        let row = sqlx::query("SELECT id FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_likes(&self, post_id: &str) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query("SELECT user_id FROM post_likes WHERE post_id = ? ORDER BY user_id")
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|row| row.get("user_id")).collect())
    }

    async fn hydrate_post(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Post, AppError> {
        let id: String = row.get("id");
        let likes = self.list_likes(&id).await?;
        let comments = self.list_comments(&id).await?;

        Ok(Post {
            id,
            user_id: row.get("user_id"),
            user_name: row.get("user_name"),
            content: row.get("content"),
            created_at: row.get("created_at"),
            likes,
            comments,
            group_id: row.get("group_id"),
            report_count: row.get("report_count"),
        })
    }

    async fn hydrate_posts(
        &self,
        rows: Vec<sqlx::sqlite::SqliteRow>,
    ) -> Result<Vec<Post>, AppError> {
        let mut posts = Vec::with_capacity(rows.len());
        for row in &rows {
            posts.push(self.hydrate_post(row).await?);
        }
        Ok(posts)
    }

    async fn hydrate_group(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Group, AppError> {
        let id: String = row.get("id");
        let member_rows =
            sqlx::query("SELECT user_id FROM group_members WHERE group_id = ? ORDER BY user_id")
                .bind(&id)
                .fetch_all(&self.pool)
                .await?;

        Ok(Group {
            id,
            name: row.get("name"),
            description: row.get("description"),
            created_by: row.get("created_by"),
            members: member_rows.iter().map(|r| r.get("user_id")).collect(),
            created_at: row.get("created_at"),
        })
    }
}

// Helper functions for row conversion

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> UserAccount {
    let is_admin: i32 = row.get("is_admin");
    UserAccount {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        password_hash: row.get("password_hash"),
        is_admin: is_admin != 0,
        created_at: row.get("created_at"),
    }
}

fn comment_from_row(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        user_id: row.get("user_id"),
        user_name: row.get("user_name"),
        text: row.get("text"),
        created_at: row.get("created_at"),
    }
}

fn report_from_row(row: &sqlx::sqlite::SqliteRow) -> Report {
    Report {
        id: row.get("id"),
        post_id: row.get("post_id"),
        post_content: row.get("post_content"),
        reported_by: row.get("reported_by"),
        reason: row.get("reason"),
        timestamp: row.get("created_at"),
    }
}

/// Build a `LIKE` pattern for a case-insensitive substring match, escaping
/// the wildcard characters in the user-supplied term.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{}%", escaped)
}
