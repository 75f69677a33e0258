use tfwait::{ClientError, HttpResourceClient, ResourceClient};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_create_posts_to_collection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/integrations"))
        .and(header("authorization", "Bearer test_token"))
        .and(body_json(serde_json::json!({ "integration_name": "orders" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "int-123",
            "status": "creating",
            "integration_name": "orders"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client =
        HttpResourceClient::new(mock_server.uri(), "integrations", Some("test_token")).unwrap();

    let created = client
        .create(&serde_json::json!({ "integration_name": "orders" }))
        .await
        .unwrap();

    assert_eq!(created.id, "int-123");
    assert_eq!(created.status, "creating");
    assert_eq!(created.property_str("integration_name"), Some("orders"));
}

#[tokio::test]
async fn test_read_returns_resource_with_sub_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/integrations/int-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "int-123",
            "status": "needs_attention",
            "errors": [
                { "error_code": "SourceLag", "error_message": "replication is behind" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = HttpResourceClient::new(mock_server.uri(), "integrations", None).unwrap();

    let resource = client.read("int-123").await.unwrap().unwrap();

    assert_eq!(resource.status, "needs_attention");
    assert_eq!(
        resource.error_messages(),
        vec!["SourceLag: replication is behind"]
    );
}

#[tokio::test]
async fn test_read_not_found_is_absence() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/integrations/int-404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = HttpResourceClient::new(mock_server.uri(), "integrations", None).unwrap();

    assert_eq!(client.read("int-404").await.unwrap(), None);
}

#[tokio::test]
async fn test_read_percent_encodes_arn() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(
            "/integrations/arn%3Aaws%3Aredshift%3Aus-east-1%3A123456789012%3Aintegration%3Aabc",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "arn:aws:redshift:us-east-1:123456789012:integration:abc",
            "status": "active"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpResourceClient::new(mock_server.uri(), "integrations", None).unwrap();

    let resource = client
        .read("arn:aws:redshift:us-east-1:123456789012:integration:abc")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resource.status, "active");
}

#[tokio::test]
async fn test_update_patches_item() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/layers/layer-1"))
        .and(body_json(serde_json::json!({ "name": "edge" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "layer-1",
            "name": "edge"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpResourceClient::new(mock_server.uri(), "layers", None).unwrap();

    let updated = client
        .update("layer-1", &serde_json::json!({ "name": "edge" }))
        .await
        .unwrap();
    assert_eq!(updated.property_str("name"), Some("edge"));
    // layers carry no status field
    assert_eq!(updated.status, "");
}

#[tokio::test]
async fn test_delete_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/layers/layer-gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = HttpResourceClient::new(mock_server.uri(), "layers", None).unwrap();

    let err = client.delete("layer-gone").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/integrations/int-123"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "token expired"
        })))
        .mount(&mock_server)
        .await;

    let client =
        HttpResourceClient::new(mock_server.uri(), "integrations", Some("stale")).unwrap();

    let err = client.read("int-123").await.unwrap_err();
    match err {
        ClientError::Auth { message } => assert_eq!(message, "token expired"),
        other => panic!("Expected Auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_message_from_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/integrations"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "message": "integration already exists"
        })))
        .mount(&mock_server)
        .await;

    let client = HttpResourceClient::new(mock_server.uri(), "integrations", None).unwrap();

    let err = client.create(&serde_json::json!({})).await.unwrap_err();
    assert_eq!(err.to_string(), "API error (409): integration already exists");
}

#[tokio::test]
async fn test_server_error_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/integrations/int-123"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = HttpResourceClient::new(mock_server.uri(), "integrations", None).unwrap();

    let err = client.delete("int-123").await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Unknown error");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_response_without_id_is_invalid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/integrations/int-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "active"
        })))
        .mount(&mock_server)
        .await;

    let client = HttpResourceClient::new(mock_server.uri(), "integrations", None).unwrap();

    let err = client.read("int-123").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_invoke_posts_item_action() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/layers/layer-1/attach-elastic-load-balancer"))
        .and(body_json(serde_json::json!({ "elastic_load_balancer_name": "web" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpResourceClient::new(mock_server.uri(), "layers", None).unwrap();

    client
        .invoke(
            Some("layer-1"),
            "attach-elastic-load-balancer",
            &serde_json::json!({ "elastic_load_balancer_name": "web" }),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_invoke_on_missing_item_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/layers/layer-gone/detach-elastic-load-balancer"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/layers/register-ecs-cluster"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "stack not found"
        })))
        .mount(&mock_server)
        .await;

    let client = HttpResourceClient::new(mock_server.uri(), "layers", None).unwrap();

    let err = client
        .invoke(
            Some("layer-gone"),
            "detach-elastic-load-balancer",
            &serde_json::json!({}),
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    // a collection action has no item to be missing
    let err = client
        .invoke(None, "register-ecs-cluster", &serde_json::json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "API error (404): stack not found");
}
