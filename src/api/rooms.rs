use crate::api::UserRequest;
use crate::error::AppResult;
use crate::models::{GiftExchangeRoom, RoomKind, RoomStatus, Wish};
use crate::services::{RoomRef, TargetView};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/santa/create", post(create_room))
        .route("/api/santa/group/:group_id", get(list_group_rooms))
        .route("/api/santa/:room_id/join", post(join_room))
        .route("/api/santa/:room_id/draw", post(draw_room))
        .route("/api/santa/:room_id/target/:user_id", get(get_target))
        .route(
            "/api/events/:event_id/angel",
            post(create_angel_room).get(get_event_room),
        )
        .route("/api/events/:event_id/angel/join", post(join_event_room))
        .route("/api/events/:event_id/angel/draw", post(draw_event_room))
        .route(
            "/api/events/:event_id/angel/target/:user_id",
            get(get_event_target),
        )
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub group_id: Uuid,
    pub admin_id: Uuid,
    pub title: String,
    pub budget: Option<String>,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAngelRoomRequest {
    pub admin_id: Uuid,
    pub title: Option<String>,
    pub budget: Option<String>,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub user_id: Uuid,
    pub wish_text: Option<String>,
    pub wishlist_item_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ParticipantView {
    pub user_id: Uuid,
    pub wish_text: Option<String>,
    pub wishlist_item_id: Option<Uuid>,
    pub joined_at: NaiveDateTime,
}

/// A room as clients see it. Assignments stay private: each participant
/// asks for their own target.
#[derive(Debug, Serialize)]
pub struct RoomView {
    pub id: Uuid,
    pub group_id: Uuid,
    pub event_id: Option<Uuid>,
    pub kind: RoomKind,
    pub title: String,
    pub budget: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub admin_id: Uuid,
    pub status: RoomStatus,
    pub participants: Vec<ParticipantView>,
    pub created_at: NaiveDateTime,
}

impl From<GiftExchangeRoom> for RoomView {
    fn from(room: GiftExchangeRoom) -> Self {
        let kind = room.kind();
        Self {
            id: room.id,
            group_id: room.group_id,
            event_id: room.event_id,
            kind,
            title: room.title,
            budget: room.budget,
            deadline: room.deadline,
            admin_id: room.admin_id,
            status: room.status,
            participants: room
                .participants
                .into_iter()
                .map(|p| ParticipantView {
                    user_id: p.user_id,
                    wish_text: p.wish.text,
                    wishlist_item_id: p.wish.wishlist_item_id,
                    joined_at: p.joined_at,
                })
                .collect(),
            created_at: room.created_at,
        }
    }
}

async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRoomRequest>,
) -> AppResult<(StatusCode, Json<RoomView>)> {
    let room = state
        .room_service
        .create_room(req.group_id, req.admin_id, &req.title, req.budget, req.deadline)
        .await?;
    Ok((StatusCode::CREATED, Json(room.into())))
}

async fn list_group_rooms(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
) -> AppResult<Json<Vec<RoomView>>> {
    let rooms = state.room_service.list_group_rooms(group_id).await?;
    Ok(Json(rooms.into_iter().map(RoomView::from).collect()))
}

async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<Uuid>,
    Json(req): Json<JoinRoomRequest>,
) -> AppResult<Json<RoomView>> {
    let wish = Wish::new(req.wish_text, req.wishlist_item_id);
    let room = state
        .room_service
        .join_room(RoomRef::Id(room_id), req.user_id, wish)
        .await?;
    Ok(Json(room.into()))
}

async fn draw_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<Uuid>,
    Json(req): Json<UserRequest>,
) -> AppResult<Json<RoomView>> {
    let room = state
        .room_service
        .draw_room(RoomRef::Id(room_id), req.user_id)
        .await?;
    Ok(Json(room.into()))
}

async fn get_target(
    State(state): State<Arc<AppState>>,
    Path((room_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<TargetView>> {
    let target = state
        .room_service
        .get_target(RoomRef::Id(room_id), user_id)
        .await?;
    Ok(Json(target))
}

async fn create_angel_room(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<CreateAngelRoomRequest>,
) -> AppResult<(StatusCode, Json<RoomView>)> {
    let room = state
        .room_service
        .create_angel_room(
            event_id,
            req.admin_id,
            req.title.as_deref(),
            req.budget,
            req.deadline,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(room.into())))
}

async fn get_event_room(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<RoomView>> {
    let room = state.room_service.get_room(RoomRef::Event(event_id)).await?;
    Ok(Json(room.into()))
}

async fn join_event_room(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<JoinRoomRequest>,
) -> AppResult<Json<RoomView>> {
    let wish = Wish::new(req.wish_text, req.wishlist_item_id);
    let room = state
        .room_service
        .join_room(RoomRef::Event(event_id), req.user_id, wish)
        .await?;
    Ok(Json(room.into()))
}

async fn draw_event_room(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<UserRequest>,
) -> AppResult<Json<RoomView>> {
    let room = state
        .room_service
        .draw_room(RoomRef::Event(event_id), req.user_id)
        .await?;
    Ok(Json(room.into()))
}

async fn get_event_target(
    State(state): State<Arc<AppState>>,
    Path((event_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<TargetView>> {
    let target = state
        .room_service
        .get_target(RoomRef::Event(event_id), user_id)
        .await?;
    Ok(Json(target))
}
