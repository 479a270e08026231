use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::dto::recipes::{
    AddCommentRequest, CommentList, CreateRecipeRequest, RateRecipeRequest, RecipeDetail,
    RecipeList, UpdateRecipeRequest,
};
use crate::{
    aggregate,
    audit::log_audit,
    entity::recipe_comments::{
        ActiveModel as CommentActive, Column as CommentCol, Entity as RecipeComments,
        Model as CommentModel,
    },
    entity::recipe_likes::{ActiveModel as LikeActive, Column as LikeCol, Entity as RecipeLikes},
    entity::recipe_ratings::{
        ActiveModel as RatingActive, Column as RatingCol, Entity as RecipeRatings,
    },
    entity::recipes::{ActiveModel as RecipeActive, Column, Entity as Recipes, Model as RecipeModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Recipe,
    response::{ApiResponse, Meta},
    routes::params::{Pagination, RecipeQuery, RecipeSortBy, SortOrder},
    services::notification_service,
    state::AppState,
};

pub async fn list_recipes(
    state: &AppState,
    query: RecipeQuery,
) -> AppResult<ApiResponse<RecipeList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Title).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(author_id) = query.author_id {
        condition = condition.add(Column::AuthorId.eq(author_id));
    }

    let sort_by = query.sort_by.unwrap_or(RecipeSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        RecipeSortBy::CreatedAt => Column::CreatedAt,
        RecipeSortBy::Rating => Column::AverageRating,
        RecipeSortBy::Title => Column::Title,
    };

    let mut finder = Recipes::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(recipe_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Recipes", RecipeList { items }, Some(meta)))
}

pub async fn get_recipe(
    state: &AppState,
    user: Option<&AuthUser>,
    id: Uuid,
) -> AppResult<ApiResponse<RecipeDetail>> {
    let recipe = Recipes::find_by_id(id).one(&state.orm).await?;
    let recipe = match recipe {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let like_count = RecipeLikes::find()
        .filter(LikeCol::RecipeId.eq(id))
        .count(&state.orm)
        .await? as i64;

    let liked_by_me = match user {
        Some(u) => {
            RecipeLikes::find()
                .filter(
                    Condition::all()
                        .add(LikeCol::RecipeId.eq(id))
                        .add(LikeCol::UserId.eq(u.user_id)),
                )
                .count(&state.orm)
                .await?
                > 0
        }
        None => false,
    };

    let data = RecipeDetail {
        recipe: recipe_from_entity(recipe),
        like_count,
        liked_by_me,
    };
    Ok(ApiResponse::success("Recipe", data, Some(Meta::empty())))
}

pub async fn create_recipe(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRecipeRequest,
) -> AppResult<ApiResponse<Recipe>> {
    let ingredients = serde_json::to_value(&payload.ingredients)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    let instructions = serde_json::to_value(&payload.instructions)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    let active = RecipeActive {
        id: Set(Uuid::new_v4()),
        author_id: Set(user.user_id),
        title: Set(payload.title),
        description: Set(payload.description),
        ingredients: Set(ingredients),
        instructions: Set(instructions),
        average_rating: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let recipe = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "recipe_create",
        Some("recipes"),
        Some(serde_json::json!({ "recipe_id": recipe.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Recipe created",
        recipe_from_entity(recipe),
        Some(Meta::empty()),
    ))
}

pub async fn update_recipe(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRecipeRequest,
) -> AppResult<ApiResponse<Recipe>> {
    let existing = find_authored(state, user, id).await?;

    let mut active: RecipeActive = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(ingredients) = payload.ingredients {
        let value = serde_json::to_value(&ingredients)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
        active.ingredients = Set(value);
    }
    if let Some(instructions) = payload.instructions {
        let value = serde_json::to_value(&instructions)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
        active.instructions = Set(value);
    }
    active.updated_at = Set(Utc::now().into());

    let recipe = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "recipe_update",
        Some("recipes"),
        Some(serde_json::json!({ "recipe_id": recipe.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        recipe_from_entity(recipe),
        Some(Meta::empty()),
    ))
}

pub async fn delete_recipe(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    find_authored(state, user, id).await?;

    let result = Recipes::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "recipe_delete",
        Some("recipes"),
        Some(serde_json::json!({ "recipe_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Upsert the caller's rating and recompute the recipe's average inside one
/// transaction.
pub async fn rate_recipe(
    state: &AppState,
    user: &AuthUser,
    recipe_id: Uuid,
    payload: RateRecipeRequest,
) -> AppResult<ApiResponse<Recipe>> {
    if !(1..=5).contains(&payload.score) {
        return Err(AppError::BadRequest("score must be between 1 and 5".into()));
    }

    let txn = state.orm.begin().await?;

    let recipe = lock_recipe(&txn, recipe_id).await?;

    let existing = RecipeRatings::find()
        .filter(
            Condition::all()
                .add(RatingCol::RecipeId.eq(recipe_id))
                .add(RatingCol::UserId.eq(user.user_id)),
        )
        .one(&txn)
        .await?;

    match existing {
        Some(rating) => {
            let mut active: RatingActive = rating.into();
            active.score = Set(payload.score);
            active.update(&txn).await?;
        }
        None => {
            RatingActive {
                id: Set(Uuid::new_v4()),
                recipe_id: Set(recipe_id),
                user_id: Set(user.user_id),
                score: Set(payload.score),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
        }
    }

    let author_id = recipe.author_id;
    let recipe = recompute_recipe_rating(&txn, recipe).await?;

    txn.commit().await?;

    if author_id != user.user_id {
        if let Err(err) = notification_service::notify(
            &state.pool,
            author_id,
            "rating",
            "Your recipe received a new rating",
            Some(recipe_id),
            Some("recipe"),
        )
        .await
        {
            tracing::warn!(error = %err, "notification failed");
        }
    }

    Ok(ApiResponse::success(
        "Rating recorded",
        recipe_from_entity(recipe),
        Some(Meta::empty()),
    ))
}

/// Remove the caller's rating; an emptied rating set resets the average to
/// the no-rating sentinel.
pub async fn unrate_recipe(
    state: &AppState,
    user: &AuthUser,
    recipe_id: Uuid,
) -> AppResult<ApiResponse<Recipe>> {
    let txn = state.orm.begin().await?;

    let recipe = lock_recipe(&txn, recipe_id).await?;

    let result = RecipeRatings::delete_many()
        .filter(RatingCol::RecipeId.eq(recipe_id))
        .filter(RatingCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    let recipe = recompute_recipe_rating(&txn, recipe).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Rating removed",
        recipe_from_entity(recipe),
        Some(Meta::empty()),
    ))
}

pub async fn like_recipe(
    state: &AppState,
    user: &AuthUser,
    recipe_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let recipe = Recipes::find_by_id(recipe_id).one(&state.orm).await?;
    let recipe = match recipe {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let existing = RecipeLikes::find()
        .filter(
            Condition::all()
                .add(LikeCol::RecipeId.eq(recipe_id))
                .add(LikeCol::UserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?;

    // Liking twice is a no-op, like the favorites path.
    if existing.is_none() {
        LikeActive {
            id: Set(Uuid::new_v4()),
            recipe_id: Set(recipe_id),
            user_id: Set(user.user_id),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?;

        if recipe.author_id != user.user_id {
            if let Err(err) = notification_service::notify(
                &state.pool,
                recipe.author_id,
                "like",
                "Someone liked your recipe",
                Some(recipe_id),
                Some("recipe"),
            )
            .await
            {
                tracing::warn!(error = %err, "notification failed");
            }
        }
    }

    Ok(ApiResponse::success(
        "Liked",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn unlike_recipe(
    state: &AppState,
    user: &AuthUser,
    recipe_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = RecipeLikes::delete_many()
        .filter(LikeCol::RecipeId.eq(recipe_id))
        .filter(LikeCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Unliked",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_comments(
    state: &AppState,
    recipe_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<CommentList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = RecipeComments::find()
        .filter(CommentCol::RecipeId.eq(recipe_id))
        .order_by_desc(CommentCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(comment_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Comments", CommentList { items }, Some(meta)))
}

pub async fn add_comment(
    state: &AppState,
    user: &AuthUser,
    recipe_id: Uuid,
    payload: AddCommentRequest,
) -> AppResult<ApiResponse<crate::models::RecipeComment>> {
    if payload.content.trim().is_empty() {
        return Err(AppError::BadRequest("content must not be empty".into()));
    }

    let recipe = Recipes::find_by_id(recipe_id).one(&state.orm).await?;
    let recipe = match recipe {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let comment = CommentActive {
        id: Set(Uuid::new_v4()),
        recipe_id: Set(recipe_id),
        user_id: Set(user.user_id),
        content: Set(payload.content),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if recipe.author_id != user.user_id {
        if let Err(err) = notification_service::notify(
            &state.pool,
            recipe.author_id,
            "comment",
            "Someone commented on your recipe",
            Some(recipe_id),
            Some("recipe"),
        )
        .await
        {
            tracing::warn!(error = %err, "notification failed");
        }
    }

    Ok(ApiResponse::success(
        "Comment added",
        comment_from_entity(comment),
        Some(Meta::empty()),
    ))
}

pub async fn delete_comment(
    state: &AppState,
    user: &AuthUser,
    recipe_id: Uuid,
    comment_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let comment = RecipeComments::find_by_id(comment_id)
        .filter(CommentCol::RecipeId.eq(recipe_id))
        .one(&state.orm)
        .await?;
    let comment = match comment {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    if comment.user_id != user.user_id && ensure_admin(user).is_err() {
        return Err(AppError::Forbidden);
    }

    RecipeComments::delete_by_id(comment_id)
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_authored(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<RecipeModel> {
    let recipe = Recipes::find_by_id(id).one(&state.orm).await?;
    let recipe = match recipe {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    if recipe.author_id != user.user_id && ensure_admin(user).is_err() {
        return Err(AppError::Forbidden);
    }
    Ok(recipe)
}

async fn lock_recipe<C: ConnectionTrait>(conn: &C, recipe_id: Uuid) -> AppResult<RecipeModel> {
    let recipe = Recipes::find_by_id(recipe_id)
        .lock(LockType::Update)
        .one(conn)
        .await?;
    match recipe {
        Some(r) => Ok(r),
        None => Err(AppError::NotFound),
    }
}

/// Recompute the recipe's average from the current rating set, inside the
/// caller's transaction. Empty set writes the sentinel (NULL), never a stale
/// value.
async fn recompute_recipe_rating<C: ConnectionTrait>(
    conn: &C,
    recipe: RecipeModel,
) -> AppResult<RecipeModel> {
    let scores: Vec<i16> = RecipeRatings::find()
        .filter(RatingCol::RecipeId.eq(recipe.id))
        .all(conn)
        .await?
        .into_iter()
        .map(|r| r.score)
        .collect();

    let mean = aggregate::mean_rating(&scores);

    let mut active: RecipeActive = recipe.into();
    active.average_rating = Set(mean);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(conn).await?;

    Ok(updated)
}

pub fn recipe_from_entity(model: RecipeModel) -> Recipe {
    Recipe {
        id: model.id,
        author_id: model.author_id,
        title: model.title,
        description: model.description,
        ingredients: serde_json::from_value(model.ingredients).unwrap_or_default(),
        instructions: serde_json::from_value(model.instructions).unwrap_or_default(),
        average_rating: model.average_rating,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn comment_from_entity(model: CommentModel) -> crate::models::RecipeComment {
    crate::models::RecipeComment {
        id: model.id,
        recipe_id: model.recipe_id,
        user_id: model.user_id,
        content: model.content,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
