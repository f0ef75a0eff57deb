//! Integration tests for the API server.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::UserId;
use domain::Role;
use lifecycle::UserProfile;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::InMemoryOrderStore;
use tower::ServiceExt;

use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    app: axum::Router,
    employee: UserId,
    admin: UserId,
    staff: UserId,
}

fn setup() -> TestApp {
    let store = InMemoryOrderStore::new();
    let (state, directory, _dispatcher) = api::create_default_state(store);

    let employee = UserId::new();
    let admin = UserId::new();
    let staff = UserId::new();
    directory.upsert(UserProfile::new(employee, "Priya", Role::Employee));
    directory.upsert(UserProfile::new(admin, "Dev", Role::Admin));
    directory.upsert(UserProfile::new(staff, "Asha", Role::Delivery));

    let app = api::create_app(state, get_metrics_handle());

    TestApp {
        app,
        employee,
        admin,
        staff,
    }
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn place_body(tc: &TestApp, payment_method: &str) -> serde_json::Value {
    serde_json::json!({
        "customer_id": tc.employee.to_string(),
        "payment_method": payment_method,
        "items": [{
            "dish_id": "DISH-001",
            "dish_name": "Veg Thali",
            "quantity": 2,
            "unit_price_cents": 1000
        }]
    })
}

async fn place_order(tc: &TestApp, payment_method: &str) -> String {
    let response = tc
        .app
        .clone()
        .oneshot(json_request("POST", "/orders", place_body(tc, payment_method)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["id"].as_str().unwrap().to_string()
}

async fn assign_order(tc: &TestApp, order_id: &str) {
    let response = tc
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{order_id}/assign"),
            serde_json::json!({
                "staff_id": tc.staff.to_string(),
                "actor_id": tc.admin.to_string(),
                "actor_role": "admin"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn transition(
    tc: &TestApp,
    order_id: &str,
    target: &str,
    actor_id: UserId,
    actor_role: &str,
) -> axum::response::Response {
    tc.app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{order_id}/transition"),
            serde_json::json!({
                "target": target,
                "actor_id": actor_id.to_string(),
                "actor_role": actor_role
            }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn health_check() {
    let tc = setup();
    let response = tc.app.clone().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn place_and_get_order() {
    let tc = setup();
    let order_id = place_order(&tc, "cod").await;

    let response = tc
        .app
        .clone()
        .oneshot(get_request(&format!("/orders/{order_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let order = json_body(response).await;
    assert_eq!(order["id"], order_id);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["final_amount_cents"], 2000);
    assert_eq!(order["payment_method"], "cod");
    assert!(order["delivery_staff"].is_null());
}

#[tokio::test]
async fn place_order_with_no_items_rejected() {
    let tc = setup();
    let response = tc
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders",
            serde_json::json!({
                "customer_id": tc.employee.to_string(),
                "payment_method": "cod",
                "items": []
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn place_order_with_overflowing_total_rejected() {
    let tc = setup();
    let response = tc
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders",
            serde_json::json!({
                "customer_id": tc.employee.to_string(),
                "payment_method": "cod",
                "items": [{
                    "dish_id": "DISH-001",
                    "dish_name": "Veg Thali",
                    "quantity": 2,
                    "unit_price_cents": i64::MAX
                }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_nonexistent_order() {
    let tc = setup();
    let fake_id = uuid::Uuid::new_v4();
    let response = tc
        .app
        .clone()
        .oneshot(get_request(&format!("/orders/{fake_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_order_id_format() {
    let tc = setup();
    let response = tc
        .app
        .clone()
        .oneshot(get_request("/orders/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assignment_confirms_pending_order() {
    let tc = setup();
    let order_id = place_order(&tc, "cod").await;
    assign_order(&tc, &order_id).await;

    let response = tc
        .app
        .clone()
        .oneshot(get_request(&format!("/orders/{order_id}")))
        .await
        .unwrap();
    let order = json_body(response).await;
    assert_eq!(order["status"], "confirmed");
    assert_eq!(order["delivery_staff"], tc.staff.to_string());
}

#[tokio::test]
async fn assignment_requires_admin() {
    let tc = setup();
    let order_id = place_order(&tc, "cod").await;

    let response = tc
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{order_id}/assign"),
            serde_json::json!({
                "staff_id": tc.staff.to_string(),
                "actor_id": tc.employee.to_string(),
                "actor_role": "employee"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn assignment_of_unknown_staff_is_not_found() {
    let tc = setup();
    let order_id = place_order(&tc, "cod").await;

    let response = tc
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{order_id}/assign"),
            serde_json::json!({
                "staff_id": uuid::Uuid::new_v4().to_string(),
                "actor_id": tc.admin.to_string(),
                "actor_role": "admin"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bare_confirmation_conflicts() {
    let tc = setup();
    let order_id = place_order(&tc, "cod").await;

    let response = transition(&tc, &order_id, "confirmed", tc.admin, "admin").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn status_skip_conflicts() {
    let tc = setup();
    let order_id = place_order(&tc, "cod").await;

    let response = transition(&tc, &order_id, "delivering", tc.admin, "admin").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn delivery_gated_on_payment_proof() {
    let tc = setup();
    let order_id = place_order(&tc, "cod").await;
    assign_order(&tc, &order_id).await;

    let response = transition(&tc, &order_id, "delivering", tc.admin, "admin").await;
    assert_eq!(response.status(), StatusCode::OK);

    // Gate closed: no proof on file
    let response = transition(&tc, &order_id, "delivered", tc.staff, "delivery").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Upload proof
    let response = tc
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{order_id}/payment/proof"),
            serde_json::json!({ "reference": "proof/receipt-17.jpg" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Same call now succeeds
    let response = transition(&tc, &order_id, "delivered", tc.staff, "delivery").await;
    assert_eq!(response.status(), StatusCode::OK);

    let order = json_body(response).await;
    assert_eq!(order["status"], "delivered");
    assert!(order["delivered_at"].is_string());
}

#[tokio::test]
async fn online_payment_gated_on_verification() {
    let tc = setup();
    let order_id = place_order(&tc, "upi").await;
    assign_order(&tc, &order_id).await;
    transition(&tc, &order_id, "delivering", tc.admin, "admin").await;

    let response = transition(&tc, &order_id, "delivered", tc.admin, "admin").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = tc
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{order_id}/payment/status"),
            serde_json::json!({ "status": "completed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = transition(&tc, &order_id, "delivered", tc.admin, "admin").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_delivery_agent_forbidden() {
    let tc = setup();
    let order_id = place_order(&tc, "cod").await;
    assign_order(&tc, &order_id).await;
    transition(&tc, &order_id, "delivering", tc.admin, "admin").await;

    let impostor = UserId::new();
    let response = transition(&tc, &order_id, "delivered", impostor, "delivery").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn history_grows_once_per_change() {
    let tc = setup();
    let order_id = place_order(&tc, "cod").await;
    assign_order(&tc, &order_id).await;
    transition(&tc, &order_id, "delivering", tc.admin, "admin").await;

    let response = tc
        .app
        .clone()
        .oneshot(get_request(&format!("/orders/{order_id}/history")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let history = json_body(response).await;
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["status"], "pending");
    assert_eq!(entries[1]["status"], "confirmed");
    assert_eq!(entries[2]["status"], "delivering");
}

#[tokio::test]
async fn list_orders() {
    let tc = setup();
    place_order(&tc, "cod").await;
    place_order(&tc, "upi").await;

    let response = tc.app.clone().oneshot(get_request("/orders")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let orders = json_body(response).await;
    assert_eq!(orders.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn cancelled_order_is_terminal() {
    let tc = setup();
    let order_id = place_order(&tc, "cod").await;

    let response = transition(&tc, &order_id, "cancelled", tc.admin, "admin").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = tc
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{order_id}/assign"),
            serde_json::json!({
                "staff_id": tc.staff.to_string(),
                "actor_id": tc.admin.to_string(),
                "actor_role": "admin"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Payment evidence is likewise rejected once the order is closed
    let response = tc
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{order_id}/payment/proof"),
            serde_json::json!({ "reference": "proof/receipt-1.jpg" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn staff_performance_endpoint() {
    let tc = setup();
    let order_id = place_order(&tc, "cod").await;
    assign_order(&tc, &order_id).await;
    transition(&tc, &order_id, "delivering", tc.admin, "admin").await;
    tc.app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{order_id}/payment/proof"),
            serde_json::json!({ "reference": "proof/receipt-1.jpg" }),
        ))
        .await
        .unwrap();
    transition(&tc, &order_id, "delivered", tc.staff, "delivery").await;

    let response = tc
        .app
        .clone()
        .oneshot(get_request(&format!("/staff/{}/performance", tc.staff)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let perf = json_body(response).await;
    assert_eq!(perf["total_assigned"], 1);
    assert_eq!(perf["delivered"], 1);
    assert_eq!(perf["delivery_rate"], 1.0);
    assert!(perf["average_delivery_ms"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn performance_for_unknown_staff_is_not_found() {
    let tc = setup();
    let fake = uuid::Uuid::new_v4();
    let response = tc
        .app
        .clone()
        .oneshot(get_request(&format!("/staff/{fake}/performance")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_endpoint() {
    let tc = setup();
    let response = tc.app.clone().oneshot(get_request("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
