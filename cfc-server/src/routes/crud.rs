//! Generic CRUD handlers shared by resources, posts and quiz questions
//!
//! Each content type implements [`Kind`]; [`routes`] mounts list/create on the
//! collection path and get/update/delete on `{id}` below it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use cfc_store::{Document, ID_FIELD};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::extractors::ValidJson;
use crate::models::{from_document, to_document, ValidationError};
use crate::state::AppState;

/// Query parameters accepted by list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
}

/// A content type stored in its own collection
pub trait Kind: Serialize + DeserializeOwned + Send + 'static {
    const COLLECTION: &'static str;
    const PATH: &'static str;
    const ITEM_PATH: &'static str;
    /// Singular name used in messages
    const LABEL: &'static str;

    /// Equality filter built from the list query
    fn filter(params: &ListParams) -> Option<Document>;

    /// Called before a full replacement is written
    fn touch(&mut self, _now: DateTime<Utc>) {}
}

pub fn routes<K: Kind>() -> Router<AppState> {
    Router::new()
        .route(K::PATH, get(list::<K>).post(create::<K>))
        .route(
            K::ITEM_PATH,
            get(get_one::<K>).put(update::<K>).delete(delete::<K>),
        )
}

/// One-field equality filter, or none when the parameter is absent
pub(crate) fn field_filter(field: &str, value: Option<&String>) -> Option<Document> {
    value.map(|v| {
        let mut filter = Document::new();
        filter.insert(field.to_string(), Value::String(v.clone()));
        filter
    })
}

/// GET /api/data/{kind}
async fn list<K: Kind>(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<K>>, ApiError> {
    let filter = K::filter(&params);
    let docs = state.content().list(K::COLLECTION, filter.as_ref()).await?;

    let items = docs
        .into_iter()
        .map(from_document)
        .collect::<Result<Vec<K>, _>>()?;
    Ok(Json(items))
}

/// GET /api/data/{kind}/{id}
async fn get_one<K: Kind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<K>, ApiError> {
    let doc = state.content().get_by_id(K::COLLECTION, &id).await?;
    Ok(Json(from_document(doc)?))
}

/// POST /api/data/{kind}
async fn create<K: Kind>(
    State(state): State<AppState>,
    ValidJson(item): ValidJson<K>,
) -> Result<(StatusCode, Json<K>), ApiError> {
    let doc = to_document(&item)?;

    if let Some(Value::String(id)) = doc.get(ID_FIELD) {
        if cfc_store::id::external_to_internal(id).is_err() {
            return Err(ValidationError::InvalidFormat {
                field: "id",
                reason: "must be a 24-character hexadecimal identifier",
            }
            .into());
        }
    }

    let created = state.content().create(K::COLLECTION, doc).await?;
    tracing::info!(collection = K::COLLECTION, id = ?created.get(ID_FIELD), "created {}", K::LABEL);

    Ok((StatusCode::CREATED, Json(from_document(created)?)))
}

/// PUT /api/data/{kind}/{id}
///
/// The body is a full model; its `id`, if any, is ignored.
async fn update<K: Kind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(mut item): ValidJson<K>,
) -> Result<Json<K>, ApiError> {
    item.touch(Utc::now());
    let doc = to_document(&item)?;

    let updated = state.content().update(K::COLLECTION, &id, doc).await?;
    Ok(Json(from_document(updated)?))
}

/// DELETE /api/data/{kind}/{id}
async fn delete<K: Kind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.content().delete(K::COLLECTION, &id).await?;
    tracing::info!(collection = K::COLLECTION, %id, "deleted {}", K::LABEL);

    Ok(Json(json!({
        "message": format!("{} deleted successfully", K::LABEL)
    })))
}
