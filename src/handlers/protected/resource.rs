// handlers/protected/resource.rs - CRUD for one resource kind
//
// Handlers are generic over `Resource` and registered once per kind:
//   get(resource::list::<Note>).post(resource::create::<Note>)
// The repository for the kind is pulled out of `AppState` through `FromRef`.

use std::sync::Arc;

use axum::extract::{
    rejection::{JsonRejection, QueryRejection},
    Extension, Path, Query, State,
};
use axum::Json;
use serde_json::Value;

use crate::database::models::Resource;
use crate::database::{Repository, RepositoryError};
use crate::filter::{ListQuery, ResourceFilter};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// Ids that are not unsigned integers can never name a stored resource
fn parse_id<T: Resource>(raw: &str) -> Result<u64, RepositoryError> {
    raw.parse::<u64>()
        .map_err(|_| RepositoryError::NotFound(T::LABEL))
}

/// POST /api/{kind} - Create a resource owned by the caller
pub async fn create<T: Resource>(
    State(repository): State<Arc<Repository<T>>>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<T> {
    let Json(payload) = payload?;
    let created = repository.create(auth_user.user_id, &payload).await?;
    Ok(ApiResponse::created(created))
}

/// GET /api/{kind}?q=&tags= - List the caller's resources, optionally filtered
pub async fn list<T: Resource>(
    State(repository): State<Arc<Repository<T>>>,
    Extension(auth_user): Extension<AuthUser>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Vec<T>> {
    let Query(params) = params?;
    let filter = ResourceFilter::from(&ListQuery::from_pairs(params));
    let items = repository.list(auth_user.user_id, &filter).await;
    Ok(ApiResponse::success(items))
}

/// GET /api/{kind}/:id
pub async fn get<T: Resource>(
    State(repository): State<Arc<Repository<T>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<T> {
    let id = parse_id::<T>(&id)?;
    let item = repository.get(auth_user.user_id, id).await?;
    Ok(ApiResponse::success(item))
}

/// PUT /api/{kind}/:id - Full replacement of the editable fields
pub async fn update<T: Resource>(
    State(repository): State<Arc<Repository<T>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<T> {
    let id = parse_id::<T>(&id)?;
    // A missing resource is reported before anything about the body
    repository.get(auth_user.user_id, id).await?;
    let Json(payload) = payload?;
    let updated = repository.update(auth_user.user_id, id, &payload).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/{kind}/:id
pub async fn delete<T: Resource>(
    State(repository): State<Arc<Repository<T>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id::<T>(&id)?;
    repository.delete(auth_user.user_id, id).await?;
    Ok(ApiResponse::no_content())
}

/// PATCH /api/{kind}/:id/favorite - Flip the favorite flag
pub async fn toggle_favorite<T: Resource>(
    State(repository): State<Arc<Repository<T>>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<T> {
    let id = parse_id::<T>(&id)?;
    let toggled = repository.toggle_favorite(auth_user.user_id, id).await?;
    Ok(ApiResponse::success(toggled))
}
