//! `/api/v1` 配下のリクエストハンドラ
//!
//! 各ハンドラは入力を解釈し、ストアを 1〜2 回呼び出して JSON を組み立てます。
//! 失敗は [`ApiError`] として返し、サーバを止めることはありません。

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{ListFilter, NewTodo, Todo, TodoChanges, TodoId};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::{error::ApiError, AppState};

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}

/// ヘルスチェック（ストアには触れません）
pub(crate) async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthBody { status: "ok" }))
}

/// `GET /todos?completed=&window=`
///
/// クエリ値は生のまま読み取ります（同名キーは先勝ち）。
/// どんな入力でも一覧取得自体は失敗しません。
pub(crate) async fn list_todos(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let filter = ListFilter::from_query(
        first_value(&params, "completed"),
        first_value(&params, "window"),
    );

    let todos = state.store.list_all()?;
    Ok(Json(filter.apply(todos, domain::now())))
}

pub(crate) async fn get_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    find(&state, &raw_id)?
        .map(Json)
        .ok_or(ApiError::TodoNotFound)
}

pub(crate) async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(body) = payload?;
    let new_todo = NewTodo::from_json(&body)?;

    let todo = state.store.insert(new_todo)?;
    info!(id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// `PUT /todos/{id}`
///
/// 存在確認をボディ検証より先に行うため、未知の id は
/// ボディが不正でも 404 になります。
pub(crate) async fn update_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let mut todo = find(&state, &raw_id)?.ok_or(ApiError::TodoNotFound)?;

    let Json(body) = payload?;
    TodoChanges::from_json(&body)?.apply_to(&mut todo);

    let updated = state.store.update(&todo)?;
    info!(id = %updated.id, "todo updated");
    Ok(Json(updated))
}

/// `DELETE /todos/{id}`。未知の id は 200 で `{}` を返します。
pub(crate) async fn delete_todo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let deleted = match parse_id(&raw_id)? {
        Some(id) => state.store.delete(id)?,
        None => None,
    };
    match deleted {
        Some(todo) => {
            info!(id = %todo.id, "todo deleted");
            Ok(Json(todo).into_response())
        }
        None => Ok(Json(serde_json::json!({})).into_response()),
    }
}

pub(crate) async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

fn first_value<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// `{id}` パスセグメントを読み取ります。
///
/// 数字のみのセグメントだけを Todo へルーティングし、それ以外は 404 です。
/// ストアが持ち得ない id（`0` や桁あふれ）は「該当なし」として扱います。
fn parse_id(raw: &str) -> Result<Option<TodoId>, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::TodoNotFound);
    }
    Ok(raw.parse().ok())
}

fn find(state: &AppState, raw_id: &str) -> Result<Option<Todo>, ApiError> {
    match parse_id(raw_id)? {
        Some(id) => Ok(state.store.get(id)?),
        None => Ok(None),
    }
}
