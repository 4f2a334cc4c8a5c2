//! Resource API Tests
//!
//! End-to-end tests through the HTTP router:
//! - Reads require the user role, writes the admin role
//! - Denied requests never touch a store
//! - Create, get, update and delete behave identically for every type
//! - Missing keys and unparseable inputs map to NotFound and MalformedInput

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use campus_api::auth::{AuthorizationGate, JwtConfig, Role};
use campus_api::http_server::{HttpServer, HttpServerConfig};
use campus_api::records::Resources;

// =============================================================================
// Helper Functions
// =============================================================================

struct TestApp {
    router: Router,
    resources: Resources,
    user: String,
    admin: String,
}

fn setup_app() -> TestApp {
    let gate = AuthorizationGate::new(JwtConfig {
        secret: "integration-secret".to_string(),
        ..Default::default()
    });
    let user = bearer(&gate, &[Role::User]);
    let admin = bearer(&gate, &[Role::Admin]);

    let resources = Resources::in_memory();
    let server = HttpServer::new(HttpServerConfig::default(), gate, resources.clone());

    TestApp {
        router: server.router(),
        resources,
        user,
        admin,
    }
}

fn bearer(gate: &AuthorizationGate, roles: &[Role]) -> String {
    let token = gate
        .jwt()
        .generate_access_token("tester", Some("tester@ucsb.edu"), roles)
        .unwrap();
    format!("Bearer {}", token)
}

async fn call(app: &TestApp, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", token);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

const HELP_REQUEST_CREATE: &str = "/api/helprequest/post?title=test%20request%201\
    &requester=someuser&requestBody=test%20request%20body%201\
    &requestDateTime=2022-01-03T00:00:00";

// =============================================================================
// Authorization Tests
// =============================================================================

/// Anonymous callers are refused on every operation.
#[tokio::test]
async fn test_anonymous_caller_forbidden_everywhere() {
    let app = setup_app();

    for (method, uri) in [
        ("GET", "/api/helprequest/all"),
        ("GET", "/api/helprequest?id=1"),
        ("POST", HELP_REQUEST_CREATE),
        ("DELETE", "/api/helprequest?id=1"),
    ] {
        let (status, body) = call(&app, method, uri, None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
        assert_eq!(body["type"], "Forbidden");
    }
}

/// A user-role caller may read but every write is refused and nothing changes.
#[tokio::test]
async fn test_user_role_cannot_write() {
    let app = setup_app();
    let user = app.user.clone();

    let (status, _) = call(&app, "POST", HELP_REQUEST_CREATE, Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.resources.help_requests.find_all().unwrap().is_empty());

    let (status, body) = call(&app, "GET", "/api/helprequest/all", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

/// Tokens signed with another secret resolve to an anonymous caller.
#[tokio::test]
async fn test_foreign_token_is_anonymous() {
    let app = setup_app();
    let foreign = AuthorizationGate::new(JwtConfig {
        secret: "someone-else".to_string(),
        ..Default::default()
    });
    let token = bearer(&foreign, &[Role::Admin]);

    let (status, _) = call(&app, "GET", "/api/helprequest/all", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

/// Create returns the stored record with the first surrogate key.
#[tokio::test]
async fn test_help_request_lifecycle() {
    let app = setup_app();
    let admin = app.admin.clone();

    let (status, created) = call(&app, "POST", HELP_REQUEST_CREATE, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        created,
        json!({
            "id": 1,
            "title": "test request 1",
            "requester": "someuser",
            "requestBody": "test request body 1",
            "requestDateTime": "2022-01-03T00:00:00"
        })
    );

    let (status, listed) = call(&app, "GET", "/api/helprequest/all", Some(&app.user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created.clone()]));

    let replacement = json!({
        "id": 77,
        "title": "updated",
        "requester": "otheruser",
        "requestBody": "",
        "requestDateTime": "2023-05-06T07:08:09"
    });
    let (status, updated) = call(&app, "PUT", "/api/helprequest?id=1", Some(&admin), Some(replacement)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["title"], "updated");
    assert_eq!(updated["requestBody"], "");

    let (status, body) = call(&app, "DELETE", "/api/helprequest?id=1", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "HelpRequest with id 1 deleted");

    let (status, body) = call(&app, "GET", "/api/helprequest?id=1", Some(&app.user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "HelpRequest with id 1 not found");
}

/// Keys keep increasing after a delete.
#[tokio::test]
async fn test_keys_are_not_reused() {
    let app = setup_app();
    let admin = app.admin.clone();

    call(&app, "POST", HELP_REQUEST_CREATE, Some(&admin), None).await;
    call(&app, "DELETE", "/api/helprequest?id=1", Some(&admin), None).await;
    let (_, created) = call(&app, "POST", HELP_REQUEST_CREATE, Some(&admin), None).await;

    assert_eq!(created["id"], 2);
}

/// Every resource type supports the same create/get/update/delete cycle.
#[tokio::test]
async fn test_all_types_share_contract() {
    let app = setup_app();
    let admin = app.admin.clone();

    // (create, keyed, key field, key sent in the body, updated field, new value, delete message)
    let cases = [
        (
            "/api/menuitemreview/post?itemId=7&reviewerEmail=cgaucho%40ucsb.edu&stars=5\
             &dateReviewed=2022-04-20T12:30:00&comments=tasty",
            "/api/menuitemreview?id=1",
            "id",
            json!(42),
            "stars",
            json!(2),
            "MenuItemReview with id 1 deleted",
        ),
        (
            "/api/recommendationrequest/post?requesterEmail=s%40ucsb.edu&professorEmail=p%40ucsb.edu\
             &explanation=grad%20school&dateRequested=2022-01-03T00:00:00\
             &dateNeeded=2022-03-11T00:00:00&done=false",
            "/api/recommendationrequest?id=1",
            "id",
            json!(42),
            "done",
            json!(true),
            "RecommendationRequest with id 1 deleted",
        ),
        (
            "/api/UCSBDiningCommonsMenuItem/post?diningCommonsCode=ortega\
             &name=Baked%20Pesto%20Pasta&station=Entree%20Specials",
            "/api/UCSBDiningCommonsMenuItem?id=1",
            "id",
            json!(42),
            "station",
            json!("Grill"),
            "UCSBDiningCommonsMenuItem with id 1 deleted",
        ),
        (
            "/api/UCSBOrganization/post?orgCode=SKY&orgTranslationShort=SKYDIVING%20CLUB\
             &orgTranslation=SKYDIVING%20CLUB%20AT%20UCSB&inactive=false",
            "/api/UCSBOrganization?orgCode=SKY",
            "orgCode",
            json!("OTHER"),
            "inactive",
            json!(true),
            "UCSBOrganization with id SKY deleted",
        ),
    ];

    for (create, keyed, key_field, foreign_key, field, value, deleted) in cases {
        let (status, created) = call(&app, "POST", create, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK, "{}", create);

        let (status, fetched) = call(&app, "GET", keyed, Some(&app.user), None).await;
        assert_eq!(status, StatusCode::OK, "{}", keyed);
        assert_eq!(fetched, created);

        let mut replacement = created.clone();
        replacement[key_field] = foreign_key;
        replacement[field] = value.clone();
        let (status, updated) = call(&app, "PUT", keyed, Some(&admin), Some(replacement)).await;
        assert_eq!(status, StatusCode::OK, "PUT {}", keyed);
        assert_eq!(updated[key_field], created[key_field]);
        assert_eq!(updated[field], value);

        let (_, fetched) = call(&app, "GET", keyed, Some(&app.user), None).await;
        assert_eq!(fetched, updated);

        let (status, body) = call(&app, "DELETE", keyed, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], deleted);

        let (status, _) = call(&app, "GET", keyed, Some(&app.user), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

/// Updating an organization keeps the addressed code even when the body names another.
#[tokio::test]
async fn test_organization_update_keeps_code() {
    let app = setup_app();
    let admin = app.admin.clone();

    call(
        &app,
        "POST",
        "/api/UCSBOrganization/post?orgCode=SKY&orgTranslationShort=SKYDIVING%20CLUB\
         &orgTranslation=SKYDIVING%20CLUB%20AT%20UCSB&inactive=true",
        Some(&admin),
        None,
    )
    .await;

    let (status, updated) = call(
        &app,
        "PUT",
        "/api/UCSBOrganization?orgCode=SKY",
        Some(&admin),
        Some(json!({
            "orgCode": "OTHER",
            "orgTranslationShort": "SKYDIVING",
            "orgTranslation": "SKYDIVING CLUB",
            "inactive": false
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["orgCode"], "SKY");

    let store = &app.resources.organizations;
    let sky = store.find_by_key(&"SKY".to_string()).unwrap().unwrap();
    assert!(!sky.inactive);
    assert_eq!(sky.org_translation, "SKYDIVING CLUB");
    assert!(store.find_by_key(&"OTHER".to_string()).unwrap().is_none());
    assert_eq!(store.find_all().unwrap().len(), 1);
}

/// Creating an organization with an existing code replaces it.
#[tokio::test]
async fn test_organization_create_replaces_existing_code() {
    let app = setup_app();
    let admin = app.admin.clone();

    call(
        &app,
        "POST",
        "/api/UCSBOrganization/post?orgCode=ZPR&orgTranslationShort=ZPR&orgTranslation=ZPR&inactive=false",
        Some(&admin),
        None,
    )
    .await;
    call(
        &app,
        "POST",
        "/api/UCSBOrganization/post?orgCode=ZPR&orgTranslationShort=ZETA&orgTranslation=ZETA&inactive=true",
        Some(&admin),
        None,
    )
    .await;

    let (_, listed) = call(&app, "GET", "/api/UCSBOrganization/all", Some(&app.user), None).await;
    assert_eq!(
        listed,
        json!([{
            "orgCode": "ZPR",
            "orgTranslationShort": "ZETA",
            "orgTranslation": "ZETA",
            "inactive": true
        }])
    );
}

// =============================================================================
// Failure Mapping Tests
// =============================================================================

/// Unknown natural keys report the key verbatim.
#[tokio::test]
async fn test_unknown_organization() {
    let app = setup_app();
    let (status, body) = call(
        &app,
        "GET",
        "/api/UCSBOrganization?orgCode=munger-hall",
        Some(&app.user),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"type": "NotFound", "message": "UCSBOrganization with id munger-hall not found"})
    );
}

/// Keys no record can hold are looked up like any other key.
#[tokio::test]
async fn test_never_assigned_keys_are_not_found() {
    let app = setup_app();
    let admin = app.admin.clone();
    call(&app, "POST", HELP_REQUEST_CREATE, Some(&admin), None).await;

    for (method, uri, message) in [
        ("GET", "/api/helprequest?id=0", "HelpRequest with id 0 not found"),
        ("GET", "/api/helprequest?id=-5", "HelpRequest with id -5 not found"),
        ("DELETE", "/api/helprequest?id=0", "HelpRequest with id 0 not found"),
        ("GET", "/api/UCSBOrganization?orgCode=", "UCSBOrganization with id  not found"),
    ] {
        let (status, body) = call(&app, method, uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert_eq!(body, json!({"type": "NotFound", "message": message}));
    }

    assert_eq!(app.resources.help_requests.find_all().unwrap().len(), 1);
}

/// Update and delete of a missing key write nothing.
#[tokio::test]
async fn test_missing_key_writes_nothing() {
    let app = setup_app();
    let admin = app.admin.clone();
    call(&app, "POST", HELP_REQUEST_CREATE, Some(&admin), None).await;

    let replacement = json!({
        "title": "x",
        "requester": "y",
        "requestBody": "z",
        "requestDateTime": "2022-01-03T00:00:00"
    });
    let (status, _) = call(&app, "PUT", "/api/helprequest?id=99", Some(&admin), Some(replacement)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "DELETE", "/api/helprequest?id=99", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let stored = app.resources.help_requests.find_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "test request 1");
}

/// Unparseable inputs are rejected before anything is stored.
#[tokio::test]
async fn test_malformed_inputs() {
    let app = setup_app();
    let admin = app.admin.clone();

    let (status, body) = call(
        &app,
        "POST",
        "/api/helprequest/post?title=t&requester=r&requestBody=b&requestDateTime=next-tuesday",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "MalformedInput");

    let (status, _) = call(
        &app,
        "POST",
        "/api/menuitemreview/post?itemId=7&reviewerEmail=a&stars=five&dateReviewed=2022-04-20T12:30:00&comments=c",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, "POST", "/api/helprequest/post?title=only", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(app.resources.help_requests.find_all().unwrap().is_empty());
    assert!(app.resources.menu_item_reviews.find_all().unwrap().is_empty());
}
