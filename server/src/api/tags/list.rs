use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::catalogue;
use crate::services::read_models::TagView;
use axum::{extract::State, Json};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "tags",
    operation_id = "list_tags",
    responses(
        (status = 200, description = "All tags, ordered by slug", body = Vec<TagView>)
    )
)]
pub async fn list_tags(State(pool): State<Arc<DbPool>>) -> Result<Json<Vec<TagView>>, ApiError> {
    let mut conn = get_conn!(pool);
    let tags = catalogue::list_tags(&mut conn)?;
    Ok(Json(tags.into_iter().map(TagView::from).collect()))
}
