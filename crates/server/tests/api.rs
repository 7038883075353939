use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use db::DBService;
use local_deployment::LocalDeployment;
use serde_json::{Value, json};
use server::routes;
use services::services::config::Config;
use tower::ServiceExt;
use utils::response::ApiResponse;

async fn app() -> Router {
    let db = DBService::new_in_memory().await.unwrap();
    routes::router(LocalDeployment::new_with(Config::default(), db))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, HeaderMap, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, json)
}

fn envelope(body: Value) -> ApiResponse<Value> {
    serde_json::from_value(body).unwrap()
}

async fn create(app: &Router, uri: &str, body: Value) -> Value {
    let (status, _, json) = send(app, Method::POST, uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    let response = envelope(json);
    assert!(response.is_success());
    response.into_data().unwrap()
}

#[tokio::test]
async fn create_returns_created_with_alert_headers() {
    let app = app().await;
    let (status, headers, body) = send(
        &app,
        Method::POST,
        "/api/regions",
        Some(json!({ "regionName": "Europe" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["regionName"], "Europe");
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(headers["x-hrapp-alert"], "hrApp.region.created");
    assert_eq!(headers["x-hrapp-params"], id.to_string().as_str());
    assert_eq!(headers["location"], format!("/api/regions/{id}").as_str());
}

#[tokio::test]
async fn create_with_identity_is_rejected() {
    let app = app().await;
    let (status, headers, body) = send(
        &app,
        Method::POST,
        "/api/regions",
        Some(json!({ "id": 5, "regionName": "Europe" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response = envelope(body);
    assert!(!response.is_success());
    assert_eq!(
        response.message(),
        Some("A new region cannot already have an ID")
    );
    let details = response.error_data().unwrap();
    assert_eq!(details["entityName"], "region");
    assert_eq!(details["errorKey"], "idexists");
    assert_eq!(headers["x-hrapp-error"], "error.idexists");
    assert_eq!(headers["x-hrapp-params"], "region");

    let (_, headers, _) = send(&app, Method::GET, "/api/regions", None).await;
    assert_eq!(headers["x-total-count"], "0");
}

#[tokio::test]
async fn create_with_zero_identity_counts_as_new() {
    let app = app().await;
    let region = create(&app, "/api/regions", json!({ "id": 0, "regionName": "Asia" })).await;
    assert_ne!(region["id"], 0);
}

#[tokio::test]
async fn update_without_identity_is_rejected() {
    let app = app().await;
    let (status, headers, body) = send(
        &app,
        Method::PUT,
        "/api/piece-of-works",
        Some(json!({ "title": "Deploy" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_data"]["entityName"], "pieceOfWork");
    assert_eq!(body["error_data"]["errorKey"], "idnull");
    assert_eq!(headers["x-hrapp-error"], "error.idnull");
}

#[tokio::test]
async fn update_of_unknown_identity_is_not_found() {
    let app = app().await;
    let (status, _, body) = send(
        &app,
        Method::PUT,
        "/api/regions",
        Some(json!({ "id": 99, "regionName": "Nowhere" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_data"]["errorKey"], "notfound");
}

#[tokio::test]
async fn get_and_delete_of_absent_identity_are_not_found() {
    let app = app().await;
    for uri in ["/api/jobs/42", "/api/employees/42", "/api/job-histories/42"] {
        let (status, _, _) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {uri}");
        let (status, _, _) = send(&app, Method::DELETE, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {uri}");
    }
}

#[tokio::test]
async fn delete_removes_entity() {
    let app = app().await;
    let region = create(&app, "/api/regions", json!({ "regionName": "Europe" })).await;
    let uri = format!("/api/regions/{}", region["id"]);

    let (status, headers, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-hrapp-alert"], "hrApp.region.deleted");

    let (status, _, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_is_paginated_and_sorted() {
    let app = app().await;
    for name in ["Americas", "Europe", "Asia"] {
        create(&app, "/api/regions", json!({ "regionName": name })).await;
    }

    let (status, headers, body) = send(
        &app,
        Method::GET,
        "/api/regions?page=0&size=2&sort=regionName,desc",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-total-count"], "3");
    let link = headers["link"].to_str().unwrap();
    assert!(link.contains("</api/regions?page=1&size=2>; rel=\"next\""));
    assert!(link.contains("</api/regions?page=1&size=2>; rel=\"last\""));

    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["regionName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Europe", "Asia"]);

    let (_, _, body) = send(&app, Method::GET, "/api/regions?page=1&size=2&sort=regionName,desc", None).await;
    assert_eq!(body["data"][0]["regionName"], "Americas");
}

#[tokio::test]
async fn page_beyond_the_last_is_empty() {
    let app = app().await;
    create(&app, "/api/regions", json!({ "regionName": "Europe" })).await;

    for page in ["7", "4294967295"] {
        let uri = format!("/api/regions?page={page}&size=20");
        let (status, headers, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK, "page {page}");
        assert_eq!(headers["x-total-count"], "1");
        assert_eq!(body["data"], json!([]));
        let link = headers["link"].to_str().unwrap();
        assert!(!link.contains("rel=\"next\""));
        assert!(link.contains("</api/regions?page=0&size=20>; rel=\"prev\""));
    }
}

#[tokio::test]
async fn unknown_sort_property_is_rejected() {
    let app = app().await;
    let (status, headers, body) =
        send(&app, Method::GET, "/api/jobs?sort=salary,asc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_data"]["errorKey"], "badsort");
    assert_eq!(headers["x-hrapp-error"], "error.badsort");
}

#[tokio::test]
async fn dangling_reference_is_rejected_before_writing() {
    let app = app().await;
    let (status, headers, body) = send(
        &app,
        Method::POST,
        "/api/countries",
        Some(json!({ "countryName": "Atlantis", "region": { "id": 77 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_data"]["entityName"], "region");
    assert_eq!(body["error_data"]["errorKey"], "idnotfound");
    assert_eq!(headers["x-hrapp-error"], "error.idnotfound");

    let (_, headers, _) = send(&app, Method::GET, "/api/countries", None).await;
    assert_eq!(headers["x-total-count"], "0");
}

#[tokio::test]
async fn references_are_included_and_can_be_cleared() {
    let app = app().await;
    let region = create(&app, "/api/regions", json!({ "regionName": "Europe" })).await;
    let country = create(
        &app,
        "/api/countries",
        json!({ "countryName": "France", "region": { "id": region["id"] } }),
    )
    .await;
    assert_eq!(country["region"]["regionName"], "Europe");
    assert_eq!(country["regionId"], region["id"]);

    let (status, headers, body) = send(
        &app,
        Method::PUT,
        "/api/countries",
        Some(json!({ "id": country["id"], "countryName": "France" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-hrapp-alert"], "hrApp.country.updated");
    assert!(body["data"]["region"].is_null());

    let (_, _, body) = send(&app, Method::GET, &format!("/api/countries/{}", country["id"]), None).await;
    assert!(body["data"]["regionId"].is_null());
    assert!(body["data"]["region"].is_null());
}

#[tokio::test]
async fn employee_includes_manager_and_department() {
    let app = app().await;
    let department = create(&app, "/api/departments", json!({ "departmentName": "R&D" })).await;
    let manager = create(&app, "/api/employees", json!({ "firstName": "Ada" })).await;
    let employee = create(
        &app,
        "/api/employees",
        json!({
            "firstName": "Grace",
            "hireDate": "2024-03-01T09:00:00Z",
            "manager": { "id": manager["id"] },
            "department": { "id": department["id"] }
        }),
    )
    .await;

    assert_eq!(employee["manager"]["firstName"], "Ada");
    assert_eq!(employee["department"]["departmentName"], "R&D");
    assert_eq!(employee["hireDate"], "2024-03-01T09:00:00Z");

    let (_, _, body) = send(&app, Method::GET, "/api/employees?sort=firstName,asc", None).await;
    assert_eq!(body["data"][1]["firstName"], "Grace");
    assert_eq!(body["data"][1]["manager"]["id"], manager["id"]);
}

#[tokio::test]
async fn department_name_is_required() {
    let app = app().await;
    let (status, _, _) = send(&app, Method::POST, "/api/departments", Some(json!({}))).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn job_chores_follow_the_payload() {
    let app = app().await;
    let build = create(&app, "/api/piece-of-works", json!({ "title": "Build" })).await;
    let test = create(&app, "/api/piece-of-works", json!({ "title": "Test" })).await;
    let ship = create(&app, "/api/piece-of-works", json!({ "title": "Ship" })).await;

    let job = create(
        &app,
        "/api/jobs",
        json!({
            "jobTitle": "Engineer",
            "chores": [{ "id": test["id"] }, { "id": build["id"] }, { "id": test["id"] }]
        }),
    )
    .await;
    let titles = |job: &Value| -> Vec<String> {
        job["chores"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["title"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(titles(&job), vec!["Test", "Build"]);

    let uri = format!("/api/jobs/{}", job["id"]);
    let (_, _, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(titles(&body["data"]), vec!["Test", "Build"]);

    let (status, _, body) = send(
        &app,
        Method::PUT,
        "/api/jobs",
        Some(json!({
            "id": job["id"],
            "jobTitle": "Engineer",
            "chores": [{ "id": build["id"] }, { "id": ship["id"] }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body["data"]), vec!["Build", "Ship"]);

    let (status, _, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/piece-of-works/{}", ship["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, _, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(titles(&body["data"]), vec!["Build"]);
}

#[tokio::test]
async fn job_with_unknown_chore_is_rejected() {
    let app = app().await;
    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/jobs",
        Some(json!({ "jobTitle": "Engineer", "chores": [{ "id": 404 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_data"]["entityName"], "pieceOfWork");
    assert_eq!(body["error_data"]["errorKey"], "idnotfound");
}

#[tokio::test]
async fn job_history_links_job_department_and_employee() {
    let app = app().await;
    let job = create(&app, "/api/jobs", json!({ "jobTitle": "Engineer" })).await;
    let department = create(&app, "/api/departments", json!({ "departmentName": "Ops" })).await;
    let employee = create(&app, "/api/employees", json!({ "lastName": "Hopper" })).await;

    let history = create(
        &app,
        "/api/job-histories",
        json!({
            "startDate": "2023-01-01T00:00:00Z",
            "job": { "id": job["id"] },
            "department": { "id": department["id"] },
            "employee": { "id": employee["id"] }
        }),
    )
    .await;
    assert_eq!(history["job"]["jobTitle"], "Engineer");
    assert_eq!(history["department"]["departmentName"], "Ops");
    assert_eq!(history["employee"]["lastName"], "Hopper");

    let (status, headers, body) = send(&app, Method::GET, "/api/job-histories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-total-count"], "1");
    assert_eq!(body["data"][0]["employee"]["id"], employee["id"]);
}

#[tokio::test]
async fn health_check_reports_ok() {
    let app = app().await;
    let (status, _, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], "OK");
}

#[tokio::test]
async fn health_check_reports_closed_database() {
    let db = DBService::new_in_memory().await.unwrap();
    let pool = db.pool.clone();
    let app = routes::router(LocalDeployment::new_with(Config::default(), db));
    pool.close().await;

    let (status, _, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let response = envelope(body);
    assert!(!response.is_success());
    assert_eq!(response.message(), Some("Database unavailable"));
    assert!(response.into_data().is_none());
}
