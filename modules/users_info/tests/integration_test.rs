use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use sea_orm::{Database, DatabaseConnection};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use users_info::{
    api::rest::dto::{CreateUserReq, UserEnvelope, UserListDto},
    config::UsersInfoConfig,
    contract::client::UsersInfoApi,
    contract::error::UsersInfoError,
    contract::model::{CreateUserInput, GetUserInput, ListUsersInput, UpdateUserInput, UserPatch},
    domain::service::{Service, ServiceConfig},
    gateways::observed::TracingObserver,
    infra::storage::sea_orm_repo::SeaOrmUsersRepository,
    UsersInfo,
};

/// Create a fresh test database for each test
async fn create_test_db() -> DatabaseConnection {
    Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database")
}

/// Create a test domain service over a migrated database
async fn create_test_service() -> Arc<Service> {
    let db = create_test_db().await;
    UsersInfo::migrate(&db)
        .await
        .expect("Failed to run migrations");
    let repo = Arc::new(SeaOrmUsersRepository::new(db));
    Arc::new(Service::new(repo, ServiceConfig::default()))
}

/// Create the fully wired client (local client behind the observer)
async fn create_test_client() -> Arc<dyn UsersInfoApi> {
    let module = UsersInfo::init(create_test_db().await, &UsersInfoConfig::default())
        .await
        .expect("Failed to init module");
    module.client()
}

/// Create a test HTTP router
async fn create_test_router() -> Router {
    let db = create_test_db().await;
    UsersInfo::migrate(&db)
        .await
        .expect("Failed to run migrations");
    let module = UsersInfo::wire(db, &UsersInfoConfig::default(), Arc::new(TracingObserver));
    module.register_rest(Router::new())
}

fn create_input(email: &str, first: &str, last: &str) -> CreateUserInput {
    CreateUserInput {
        email: email.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_domain_service_crud() -> Result<()> {
    let service = create_test_service().await;

    // Create: fresh id, equal timestamps
    let created = service
        .create_user(create_input("a@b.com", "Jo", "Do"))
        .await?;
    assert_eq!(created.email, "a@b.com");
    assert_eq!(created.created_at, created.updated_at);

    // Get
    let retrieved = service
        .get_user(GetUserInput::new(created.id.to_string()))
        .await?;
    assert_eq!(retrieved, created);

    // Partial update of one field
    let updated = service
        .update_user(UpdateUserInput {
            id: created.id.to_string(),
            patch: UserPatch {
                first_name: Some("Jon".to_string()),
                ..Default::default()
            },
        })
        .await?;
    assert_eq!(updated.first_name, "Jon");
    assert_eq!(updated.email, "a@b.com"); // Unchanged
    assert_eq!(updated.last_name, "Do"); // Unchanged
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > updated.created_at);

    // Empty patch is accepted and changes nothing
    let untouched = service
        .update_user(UpdateUserInput {
            id: created.id.to_string(),
            patch: UserPatch::default(),
        })
        .await?;
    assert_eq!(untouched, updated);

    // List
    let page = service.list_users(ListUsersInput::default()).await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.users, vec![updated]);

    Ok(())
}

#[tokio::test]
async fn test_domain_service_email_uniqueness() -> Result<()> {
    let service = create_test_service().await;

    let x = service
        .create_user(create_input("x@example.com", "X", "X"))
        .await?;
    let y = service
        .create_user(create_input("y@example.com", "Y", "Y"))
        .await?;

    // Duplicate on create
    let result = service
        .create_user(create_input("x@example.com", "Other", "Person"))
        .await;
    assert!(matches!(
        result,
        Err(users_info::domain::error::DomainError::EmailAlreadyExists { .. })
    ));

    // Duplicate on update
    let result = service
        .update_user(UpdateUserInput {
            id: x.id.to_string(),
            patch: UserPatch {
                email: Some(y.email.clone()),
                ..Default::default()
            },
        })
        .await;
    assert!(matches!(
        result,
        Err(users_info::domain::error::DomainError::EmailAlreadyExists { .. })
    ));

    // X is left as it was
    let still_x = service.get_user(GetUserInput::new(x.id.to_string())).await?;
    assert_eq!(still_x, x);

    Ok(())
}

#[tokio::test]
async fn test_client_error_categories() -> Result<()> {
    let client = create_test_client().await;

    let short_id = "550e8400-e29b-41d4-a716-44665544000";
    let err = client.get_user(GetUserInput::new(short_id)).await.unwrap_err();
    assert_eq!(err.category(), "validation");

    let missing = Uuid::new_v4();
    let err = client
        .get_user(GetUserInput::new(missing.to_string()))
        .await
        .unwrap_err();
    assert_eq!(err, UsersInfoError::not_found(missing));

    client
        .create_user(create_input("taken@example.com", "T", "T"))
        .await?;
    let err = client
        .create_user(create_input("taken@example.com", "U", "U"))
        .await
        .unwrap_err();
    assert_eq!(err, UsersInfoError::conflict("taken@example.com".to_string()));

    Ok(())
}

#[tokio::test]
async fn test_client_list_filter_and_paging() -> Result<()> {
    let client = create_test_client().await;

    for (email, first, last) in [
        ("ann@acme.com", "Ann", "Smith"),
        ("bob@acme.com", "Bob", "Jones"),
        ("cyd@other.org", "Cyd", "Acme"),
        ("dan@other.org", "Dan", "Brown"),
    ] {
        client.create_user(create_input(email, first, last)).await?;
    }

    let page = client
        .list_users(ListUsersInput {
            query: Some("acme".to_string()),
            order_by: Some("first_name desc".to_string()),
            limit: Some(2),
            offset: Some(1),
        })
        .await?;
    assert_eq!(page.total, 3);
    let names: Vec<_> = page.users.iter().map(|u| u.first_name.as_str()).collect();
    assert_eq!(names, vec!["Bob", "Ann"]);

    let err = client
        .list_users(ListUsersInput {
            query: Some(String::new()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.category(), "validation");

    Ok(())
}

#[tokio::test]
async fn test_rest_api_create_user() -> Result<()> {
    let router = create_test_router().await;

    let create_request = CreateUserReq {
        email: "rest@example.com".to_string(),
        first_name: "Rest".to_string(),
        last_name: "User".to_string(),
    };

    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&create_request)?))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let envelope: UserEnvelope = serde_json::from_slice(&body)?;

    assert_eq!(envelope.user.email, "rest@example.com");
    assert_eq!(envelope.user.first_name, "Rest");
    assert_eq!(envelope.user.created_at, envelope.user.updated_at);

    Ok(())
}

#[tokio::test]
async fn test_rest_api_list_users() -> Result<()> {
    let router = create_test_router().await;

    send(
        &router,
        "POST",
        "/users",
        Some(json!({"email": "a@b.com", "first_name": "Jo", "last_name": "Do"})),
    )
    .await;

    let request = Request::builder()
        .method("GET")
        .uri("/users?limit=5&order_by=-email")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let user_list: UserListDto = serde_json::from_slice(&body)?;

    assert_eq!(user_list.total, 1);
    assert_eq!(user_list.users[0].email, "a@b.com");

    Ok(())
}

#[tokio::test]
async fn test_rest_api_patch_and_put() -> Result<()> {
    let router = create_test_router().await;

    let (_, created) = send(
        &router,
        "POST",
        "/users",
        Some(json!({"email": "a@b.com", "first_name": "Jo", "last_name": "Do"})),
    )
    .await;
    let id = created["user"]["id"].as_str().unwrap().to_string();
    let uri = format!("/users/{}", id);

    let (status, body) = send(&router, "PATCH", &uri, Some(json!({"first_name": "Jon"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["first_name"], "Jon");
    assert_eq!(body["user"]["email"], "a@b.com");
    assert_ne!(body["user"]["updated_at"], created["user"]["updated_at"]);

    // null means "leave as is"
    let (status, body) = send(
        &router,
        "PUT",
        &uri,
        Some(json!({"email": null, "last_name": "Doe"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "a@b.com");
    assert_eq!(body["user"]["last_name"], "Doe");

    let (status, body) = send(&router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["first_name"], "Jon");
    assert_eq!(body["user"]["last_name"], "Doe");

    Ok(())
}

#[tokio::test]
async fn test_rest_api_validation_errors() -> Result<()> {
    let router = create_test_router().await;

    // Invalid email
    let (status, body) = send(
        &router,
        "POST",
        "/users",
        Some(json!({"email": "invalid-email", "first_name": "Jo", "last_name": "Do"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert_eq!(body["code"], "USERS_VALIDATION");

    // 35-character id
    let (status, body) = send(
        &router,
        "GET",
        "/users/550e8400-e29b-41d4-a716-44665544000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["instance"], "/users/550e8400-e29b-41d4-a716-44665544000");

    // Empty free-text filter
    let (status, _) = send(&router, "GET", "/users?query=", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_rest_api_not_found() -> Result<()> {
    let router = create_test_router().await;

    let non_existent_id = Uuid::new_v4();
    let request = Request::builder()
        .method("GET")
        .uri(format!("/users/{}", non_existent_id))
        .body(Body::empty())
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );

    let (status, _) = send(
        &router,
        "PATCH",
        &format!("/users/{}", non_existent_id),
        Some(json!({"first_name": "Ghost"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_rest_api_conflict() -> Result<()> {
    let router = create_test_router().await;

    let new_user = json!({"email": "dup@example.com", "first_name": "A", "last_name": "B"});
    let (status, _) = send(&router, "POST", "/users", Some(new_user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&router, "POST", "/users", Some(new_user)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "USERS_EMAIL_CONFLICT");

    Ok(())
}
