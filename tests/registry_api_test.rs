use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use azals::api;
use azals::infrastructure::AppState;
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

// Helper to build the API router over the built-in registry
fn setup_app(max_batch_size: usize) -> Router {
    api::api_router(AppState::builtin(max_batch_size))
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = setup_app(10).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "azals");
}

#[tokio::test]
async fn test_list_entries() {
    let response = setup_app(10).oneshot(get("/registry")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(json["count"], entries.len());
    assert!(entries.iter().any(|e| e["id"] == "validators.iban"));
    assert!(entries.iter().any(|e| e["id"] == "calculations.invoice_totals"));
}

#[tokio::test]
async fn test_list_kind() {
    let app = setup_app(10);

    let response = app.clone().oneshot(get("/registry/generators")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "generators");
    assert!(json["entries"]
        .as_array()
        .unwrap()
        .iter()
        .all(|e| e["kind"] == "generator"));

    let response = app.oneshot(get("/registry/widgets")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_describe_entry() {
    let app = setup_app(10);

    let response = app
        .clone()
        .oneshot(get("/registry/calculations/vat"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["entry"]["module"], "accounting");
    assert_eq!(json["entry"]["inputs"][0]["name"], "amount_ht");
    assert_eq!(json["entry"]["inputs"][0]["required"], true);

    let response = app
        .oneshot(get("/registry/calculations/unknown"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invoke_validator() {
    let app = setup_app(10);

    let req = post_json(
        "/registry/validators/iban",
        &json!({ "value": "fr76 3000 6000 0112 3456 7890 189" }),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["id"], "validators.iban");
    assert_eq!(json["result"]["valid"], true);
    assert_eq!(json["result"]["normalized"], "FR7630006000011234567890189");

    // An invalid identifier is a successful call with valid = false
    let req = post_json("/registry/validators/siret", &json!({ "value": "12345678901234" }));
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["result"]["valid"], false);
    assert_eq!(json["result"]["error"], "SIRET checksum mismatch");
}

#[tokio::test]
async fn test_invoke_calculation() {
    let req = post_json(
        "/registry/calculations/invoice_totals",
        &json!({
            "lines": [
                { "quantity": 2, "unit_price": 50, "vat_rate": 20 },
                { "quantity": "1", "unit_price": "10", "vat_rate": "5,5" }
            ]
        }),
    );
    let response = setup_app(10).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["result"]["total_ht"], 110.0);
    assert_eq!(json["result"]["total_vat"], 20.55);
    assert_eq!(json["result"]["total_ttc"], 130.55);
    assert_eq!(json["result"]["vat_breakdown"][0]["rate"], 5.5);
}

#[tokio::test]
async fn test_invoke_missing_field_reports_module_and_tenant() {
    let req = Request::builder()
        .uri("/registry/calculations/vat")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .header(api::TENANT_HEADER, "tenant-acme")
        .body(Body::from(r#"{"amount_ht": 100}"#))
        .unwrap();

    let response = setup_app(10).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["module"], "accounting");
    assert_eq!(json["field"], "rate");
    assert_eq!(json["tenant_id"], "tenant-acme");
}

#[tokio::test]
async fn test_invoke_invalid_field() {
    let req = post_json(
        "/registry/calculations/payment_due_date",
        &json!({ "invoice_date": "2026-01-15", "days": 90 }),
    );
    let response = setup_app(10).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["field"], "days");
    assert!(json.get("tenant_id").is_none());
}

#[tokio::test]
async fn test_invoke_non_object_payload() {
    let req = post_json("/registry/transformers/slugify", &json!(["Société"]));
    let response = setup_app(10).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_invoke_malformed_json_body() {
    let req = Request::builder()
        .uri("/registry/calculations/vat")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = setup_app(10).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["module"], "accounting");
    assert!(json["error"].as_str().unwrap().contains("invalid JSON"));
}

#[tokio::test]
async fn test_invoke_without_content_type() {
    let req = Request::builder()
        .uri("/registry/calculations/vat")
        .method("POST")
        .body(Body::from(r#"{"amount_ht": 100, "rate": 20}"#))
        .unwrap();

    let response = setup_app(10).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["result"]["amount_ttc"], 120.0);
}

#[tokio::test]
async fn test_depreciation_years_are_bounded() {
    let app = setup_app(10);

    for name in ["straight_line_depreciation", "declining_balance_depreciation"] {
        let req = post_json(
            &format!("/registry/calculations/{}", name),
            &json!({ "cost": 1000, "years": 4294967295u64 }),
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{}", name);

        let json = body_json(response).await;
        assert_eq!(json["field"], "years");
    }

    let req = post_json(
        "/registry/calculations/straight_line_depreciation",
        &json!({ "cost": 1000, "years": 3 }),
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["result"]["annual_amount"], 333.33);
    assert!(json["result"]["schedule"].is_array());
}

#[tokio::test]
async fn test_invoke_unknown_entry() {
    let req = post_json("/registry/validators/isbn", &json!({ "value": "x" }));
    let response = setup_app(10).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["module"], "registry");
}

#[tokio::test]
async fn test_batch_json() {
    let req = post_json(
        "/registry/validators/siren/batch",
        &json!([
            { "value": "732829320" },
            { "value": "123456789" },
            { "nothing": true }
        ]),
    );
    let response = setup_app(10).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["ok_count"], 2);
    assert_eq!(json["error_count"], 1);

    let results = json["results"].as_array().unwrap();
    assert_eq!(results[0]["result"]["valid"], true);
    assert_eq!(results[1]["ok"], true);
    assert_eq!(results[1]["result"]["valid"], false);
    assert_eq!(results[2]["ok"], false);
    assert_eq!(results[2]["field"], "value");
}

#[tokio::test]
async fn test_batch_csv() {
    let csv = "amount_ht,rate\n100,20\n19.99,5.5\n50,\n";
    let req = Request::builder()
        .uri("/registry/calculations/vat/batch")
        .method("POST")
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .body(Body::from(csv))
        .unwrap();

    let response = setup_app(10).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["result"]["amount_ttc"], 120.0);
    assert_eq!(results[1]["result"]["amount_ttc"], 21.09);
    assert_eq!(results[2]["ok"], false);
    assert_eq!(results[2]["field"], "rate");
}

#[tokio::test]
async fn test_batch_too_large() {
    let records: Vec<Value> = (0..5).map(|_| json!({ "value": "732829320" })).collect();
    let req = post_json("/registry/validators/siren/batch", &json!(records));

    let response = setup_app(3).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_batch_body_must_be_array() {
    let req = post_json(
        "/registry/validators/siren/batch",
        &json!({ "value": "732829320" }),
    );
    let response = setup_app(10).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
