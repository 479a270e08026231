//! Notification rows created by the other write paths.
//!
//! The pool handle is always passed in explicitly; there is no shared
//! emitter instance. Callers treat a failed insert as non-fatal and log it.

use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::notifications::NotificationList,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Notification,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

pub async fn notify(
    pool: &DbPool,
    user_id: Uuid,
    kind: &str,
    message: &str,
    related_id: Option<Uuid>,
    related_type: Option<&str>,
) -> AppResult<Notification> {
    let notification = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (id, user_id, kind, message, related_id, related_type)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(kind)
    .bind(message)
    .bind(related_id)
    .bind(related_type)
    .fetch_one(pool)
    .await?;

    Ok(notification)
}

pub async fn list_notifications(
    pool: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
    unread_only: bool,
) -> AppResult<ApiResponse<NotificationList>> {
    let (page, limit, offset) = pagination.normalize();

    let items = sqlx::query_as::<_, Notification>(
        r#"
        SELECT * FROM notifications
        WHERE user_id = $1 AND (NOT $2 OR read = FALSE)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(user.user_id)
    .bind(unread_only)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND (NOT $2 OR read = FALSE)",
    )
    .bind(user.user_id)
    .bind(unread_only)
    .fetch_one(pool)
    .await?;

    let unread: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE")
            .bind(user.user_id)
            .fetch_one(pool)
            .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "OK",
        NotificationList {
            items,
            unread: unread.0,
        },
        Some(meta),
    ))
}

pub async fn set_read(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    read: bool,
) -> AppResult<ApiResponse<Notification>> {
    let notification = sqlx::query_as::<_, Notification>(
        "UPDATE notifications SET read = $3 WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user.user_id)
    .bind(read)
    .fetch_optional(pool)
    .await?;

    match notification {
        Some(n) => Ok(ApiResponse::success("Updated", n, Some(Meta::empty()))),
        None => Err(AppError::NotFound),
    }
}

pub async fn mark_all_read(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
        .bind(user.user_id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "All read",
        serde_json::json!({ "updated": result.rows_affected() }),
        Some(Meta::empty()),
    ))
}
