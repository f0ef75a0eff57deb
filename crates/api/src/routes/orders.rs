//! Order placement, lifecycle, and payment endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{OrderId, UserId};
use domain::{Actor, Money, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, Role};
use lifecycle::LifecycleEngine;
use order_store::OrderStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore> {
    pub engine: LifecycleEngine<S>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_id: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub dish_id: String,
    pub dish_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub target: OrderStatus,
    pub actor_id: String,
    pub actor_role: Role,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub staff_id: String,
    pub actor_id: String,
    pub actor_role: Role,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct PaymentProofRequest {
    pub reference: String,
}

#[derive(Deserialize)]
pub struct PaymentStatusRequest {
    pub status: PaymentStatus,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub customer_id: String,
    pub status: String,
    pub items: Vec<OrderItemResponse>,
    pub subtotal_cents: i64,
    pub final_amount_cents: i64,
    pub payment_method: String,
    pub payment_status: String,
    pub payment_proof: Option<String>,
    pub delivery_staff: Option<String>,
    pub created_at: String,
    pub delivered_at: Option<String>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub dish_id: String,
    pub dish_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

#[derive(Serialize)]
pub struct StatusEntryResponse {
    pub status: String,
    pub actor_role: String,
    pub timestamp: String,
    pub notes: Option<String>,
}

pub(crate) fn order_response(order: &Order) -> OrderResponse {
    let items = order
        .items()
        .iter()
        .map(|item| OrderItemResponse {
            dish_id: item.dish_id.to_string(),
            dish_name: item.dish_name.clone(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
        })
        .collect();

    OrderResponse {
        id: order.id().to_string(),
        customer_id: order.customer().to_string(),
        status: order.status().to_string(),
        items,
        subtotal_cents: order.subtotal().cents(),
        final_amount_cents: order.final_amount().cents(),
        payment_method: order.payment_method().to_string(),
        payment_status: order.payment_status().to_string(),
        payment_proof: order.payment_proof().map(String::from),
        delivery_staff: order.delivery_staff().map(|s| s.to_string()),
        created_at: order.created_at().to_rfc3339(),
        delivered_at: order.delivered_at().map(|t| t.to_rfc3339()),
    }
}

// -- Handlers --

/// POST /orders — place a new order for an employee.
#[tracing::instrument(skip(state, req))]
pub async fn place<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError> {
    let customer = parse_user_id(&req.customer_id, "customer_id")?;

    let items: Vec<OrderItem> = req
        .items
        .iter()
        .map(|item| {
            OrderItem::new(
                item.dish_id.as_str(),
                item.dish_name.as_str(),
                item.quantity,
                Money::from_cents(item.unit_price_cents),
            )
        })
        .collect();

    let order = state
        .engine
        .place_order(Actor::employee(customer), items, req.payment_method)
        .await?;

    Ok((axum::http::StatusCode::CREATED, Json(order_response(&order))))
}

/// GET /orders — list all orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.engine.list_orders().await?;
    Ok(Json(orders.iter().map(order_response).collect()))
}

/// GET /orders/:id — load an order by id.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.engine.get_order(order_id).await?;
    Ok(Json(order_response(&order)))
}

/// GET /orders/:id/history — the order's audit trail.
#[tracing::instrument(skip(state))]
pub async fn history<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<StatusEntryResponse>>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.engine.get_order(order_id).await?;

    let entries = order
        .status_history()
        .iter()
        .map(|entry| StatusEntryResponse {
            status: entry.status.to_string(),
            actor_role: entry.actor_role.to_string(),
            timestamp: entry.timestamp.to_rfc3339(),
            notes: entry.notes.clone(),
        })
        .collect();
    Ok(Json(entries))
}

/// POST /orders/:id/transition — move the order to a new status.
#[tracing::instrument(skip(state, req))]
pub async fn transition<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let actor = Actor::new(parse_user_id(&req.actor_id, "actor_id")?, req.actor_role);

    let order = state
        .engine
        .apply_transition(order_id, req.target, actor, req.notes)
        .await?;
    Ok(Json(order_response(&order)))
}

/// POST /orders/:id/assign — assign or swap the delivery agent.
#[tracing::instrument(skip(state, req))]
pub async fn assign<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let staff_id = parse_user_id(&req.staff_id, "staff_id")?;
    let actor = Actor::new(parse_user_id(&req.actor_id, "actor_id")?, req.actor_role);

    let order = state
        .engine
        .assign(order_id, staff_id, actor, req.notes)
        .await?;
    Ok(Json(order_response(&order)))
}

/// POST /orders/:id/payment/proof — attach a payment-proof reference.
#[tracing::instrument(skip(state, req))]
pub async fn payment_proof<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<PaymentProofRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .engine
        .attach_payment_proof(order_id, req.reference)
        .await?;
    Ok(Json(order_response(&order)))
}

/// POST /orders/:id/payment/status — record the verification outcome.
#[tracing::instrument(skip(state, req))]
pub async fn payment_status<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<PaymentStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .engine
        .record_payment_status(order_id, req.status)
        .await?;
    Ok(Json(order_response(&order)))
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order id: {e}")))?;
    Ok(OrderId::from(uuid))
}

pub(crate) fn parse_user_id(id: &str, field: &str) -> Result<UserId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {field}: {e}")))?;
    Ok(UserId::from(uuid))
}
