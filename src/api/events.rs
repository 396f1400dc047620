use crate::api::{UserQuery, UserRequest};
use crate::error::AppResult;
use crate::funding::FundingView;
use crate::models::{Event, NewEvent, NewFundItem, WishlistItem};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", post(create_event))
        .route("/api/groups/:group_id/events", get(list_group_events))
        .route("/api/events/:event_id", delete(delete_event))
        .route("/api/events/:event_id/funding", get(funding_view))
        .route("/api/events/:event_id/contribute", post(contribute))
        .route(
            "/api/events/:event_id/contributions/:contribution_id/confirm",
            post(confirm_contribution),
        )
        .route(
            "/api/events/:event_id/contributions/:contribution_id/reject",
            post(reject_contribution),
        )
        .route("/api/events/:event_id/participate", post(toggle_participation))
        .route("/api/events/:event_id/payment-info", put(set_payment_info))
        .route("/api/events/:event_id/target-amount", put(set_target_amount))
        .route("/api/events/:event_id/wishlist", get(event_wishlist))
        .route("/api/events/:event_id/wishlist/:item_id/book", post(book_item))
        .route("/api/events/:event_id/wishlist/:item_id/fund", post(fund_item))
        .route(
            "/api/events/:event_id/wishlist/:item_id/unbook",
            delete(unbook_item),
        )
        .route(
            "/api/events/:event_id/manual-fund-item",
            post(add_manual_fund_item),
        )
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub group_id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub target_amount: Decimal,
    pub currency: Option<String>,
    pub beneficiary_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ContributeRequest {
    pub user_id: Uuid,
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct PaymentInfoRequest {
    pub user_id: Uuid,
    pub payment_info: String,
}

#[derive(Debug, Deserialize)]
pub struct TargetAmountRequest {
    pub user_id: Uuid,
    pub target_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ManualFundItemRequest {
    pub user_id: Uuid,
    pub title: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
}

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let event = state
        .funding_service
        .create_event(NewEvent {
            group_id: req.group_id,
            creator_id: req.creator_id,
            title: req.title,
            description: req.description,
            date: req.date,
            target_amount: req.target_amount,
            currency: req.currency,
            beneficiary_id: req.beneficiary_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn list_group_events(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
) -> AppResult<Json<Vec<Event>>> {
    let events = state
        .funding_service
        .list_group_events(group_id, today())
        .await?;
    Ok(Json(events))
}

async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> AppResult<StatusCode> {
    state
        .funding_service
        .delete_event(event_id, query.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn funding_view(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<FundingView>> {
    let view = state
        .funding_service
        .funding_view(event_id, query.user_id)
        .await?;
    Ok(Json(view))
}

async fn contribute(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<ContributeRequest>,
) -> AppResult<(StatusCode, Json<FundingView>)> {
    let view = state
        .funding_service
        .contribute(event_id, req.user_id, req.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn confirm_contribution(
    State(state): State<Arc<AppState>>,
    Path((event_id, contribution_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UserRequest>,
) -> AppResult<Json<FundingView>> {
    let view = state
        .funding_service
        .confirm_contribution(event_id, contribution_id, req.user_id)
        .await?;
    Ok(Json(view))
}

async fn reject_contribution(
    State(state): State<Arc<AppState>>,
    Path((event_id, contribution_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UserRequest>,
) -> AppResult<Json<FundingView>> {
    let view = state
        .funding_service
        .reject_contribution(event_id, contribution_id, req.user_id)
        .await?;
    Ok(Json(view))
}

async fn toggle_participation(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<UserRequest>,
) -> AppResult<Json<FundingView>> {
    let view = state
        .funding_service
        .toggle_participation(event_id, req.user_id)
        .await?;
    Ok(Json(view))
}

async fn set_payment_info(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<PaymentInfoRequest>,
) -> AppResult<Json<FundingView>> {
    let view = state
        .funding_service
        .set_payment_info(event_id, req.user_id, &req.payment_info)
        .await?;
    Ok(Json(view))
}

async fn set_target_amount(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<TargetAmountRequest>,
) -> AppResult<Json<FundingView>> {
    let view = state
        .funding_service
        .set_target_amount(event_id, req.user_id, req.target_amount)
        .await?;
    Ok(Json(view))
}

async fn event_wishlist(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<WishlistItem>>> {
    let items = state
        .funding_service
        .event_wishlist(event_id, query.user_id)
        .await?;
    Ok(Json(items))
}

async fn book_item(
    State(state): State<Arc<AppState>>,
    Path((event_id, item_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UserRequest>,
) -> AppResult<Json<WishlistItem>> {
    let item = state
        .funding_service
        .book_item(event_id, item_id, req.user_id)
        .await?;
    Ok(Json(item))
}

async fn fund_item(
    State(state): State<Arc<AppState>>,
    Path((event_id, item_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UserRequest>,
) -> AppResult<Json<FundingView>> {
    let view = state
        .funding_service
        .fund_item(event_id, item_id, req.user_id)
        .await?;
    Ok(Json(view))
}

async fn add_manual_fund_item(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<ManualFundItemRequest>,
) -> AppResult<(StatusCode, Json<WishlistItem>)> {
    let item = state
        .funding_service
        .add_manual_fund_item(
            event_id,
            req.user_id,
            NewFundItem {
                title: req.title,
                url: req.url,
                image_url: req.image_url,
                price: req.price,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn unbook_item(
    State(state): State<Arc<AppState>>,
    Path((event_id, item_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<WishlistItem>> {
    let item = state
        .funding_service
        .unbook_item(event_id, item_id, query.user_id)
        .await?;
    Ok(Json(item))
}
