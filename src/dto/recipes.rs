use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Ingredient, Instruction, Recipe, RecipeComment};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<Vec<Instruction>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RateRecipeRequest {
    /// 1 to 5.
    pub score: i16,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeList {
    pub items: Vec<Recipe>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub like_count: i64,
    pub liked_by_me: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentList {
    pub items: Vec<RecipeComment>,
}
