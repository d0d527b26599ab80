//! HTTP transport tests against a fake IAM server.

use std::sync::Arc;

use iam_engine::{
    BackendError, IamError, MemberType, PolicySetter, PrincipalResolver, PrincipalService,
    PrincipalView, ResourceUpdater,
};
use iam_http::{IamClientConfig, IamHttpClient};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> IamHttpClient {
    let config = IamClientConfig::new(server.uri(), "org-1").with_api_token("test-token");
    IamHttpClient::new(&config).expect("client")
}

fn viewer_policy(etag: &str) -> serde_json::Value {
    json!({
        "bindings": [
            {"role_id": "roles/viewer", "members": [{"member_id": "u1", "member_type": "USER"}]}
        ],
        "etag": etag
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Policy endpoints
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_policy_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/p-1/iam-policy"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(viewer_policy("v1")))
        .expect(1)
        .mount(&server)
        .await;

    let policy = client(&server).project("p-1").get_policy().await.unwrap();

    assert_eq!(policy.etag, "v1");
    assert_eq!(policy.bindings.len(), 1);
    assert_eq!(policy.bindings[0].members[0].member_type, MemberType::User);
}

#[tokio::test]
async fn set_policy_puts_document_and_returns_stored() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/groups/g-7/iam-policy"))
        .and(body_json(viewer_policy("v1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(viewer_policy("v2")))
        .expect(1)
        .mount(&server)
        .await;

    let policy: iam_engine::Policy = serde_json::from_value(viewer_policy("v1")).unwrap();
    let stored = client(&server).group("g-7").set_policy(policy).await.unwrap();

    assert_eq!(stored.etag, "v2");
}

#[tokio::test]
async fn conflict_maps_to_version_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/organizations/org-1/iam-policy"))
        .respond_with(ResponseTemplate::new(409).set_body_string("etag is stale"))
        .mount(&server)
        .await;

    let err = client(&server)
        .organization("org-1")
        .set_policy(iam_engine::Policy::default())
        .await
        .unwrap_err();

    assert_eq!(err, BackendError::VersionMismatch("etag is stale".into()));
}

#[tokio::test]
async fn missing_resource_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/gone/iam-policy"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server).project("gone").get_policy().await.unwrap_err();

    assert!(matches!(err, BackendError::NotFound(_)), "got: {err:?}");
}

#[tokio::test]
async fn server_error_keeps_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/p-1/iam-policy"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server).project("p-1").get_policy().await.unwrap_err();

    assert_eq!(
        err,
        BackendError::Api {
            status: 503,
            message: "maintenance".into(),
        }
    );
}

#[tokio::test]
async fn malformed_body_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/p-1/iam-policy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).project("p-1").get_policy().await.unwrap_err();

    assert!(matches!(err, BackendError::Transport(_)), "got: {err:?}");
}

#[tokio::test]
async fn extra_response_fields_are_ignored() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/p-1/iam-policy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bindings": [{
                "role_id": "roles/viewer",
                "members": [{"member_id": "u1", "member_type": "USER", "display": "Ada"}],
                "condition": null
            }],
            "etag": "v1",
            "version": 3
        })))
        .mount(&server)
        .await;

    let policy = client(&server).project("p-1").get_policy().await.unwrap();

    assert_eq!(policy.etag, "v1");
    assert_eq!(policy.bindings[0].members[0].member_id, "u1");
}

// ─────────────────────────────────────────────────────────────────────────────
// Principal lookups
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_get_follows_page_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/organizations/org-1/principals:batchGet"))
        .and(body_json(json!({"principal_ids": ["u1", "g1"], "view": "FULL"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "principals": [{"id": "u1", "type": "USER", "user": {"full_name": "Ada"}}],
            "next_page_token": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/organizations/org-1/principals:batchGet"))
        .and(body_partial_json(json!({"page_token": "page-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "principals": [{"id": "g1", "type": "GROUP", "group": {"display_name": "Analysts"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ids = vec!["u1".to_string(), "g1".to_string()];
    let principals = client(&server)
        .batch_get_principals("org-1", &ids, PrincipalView::Full)
        .await
        .unwrap();

    let names: Vec<_> = principals
        .iter()
        .map(|p| (p.id.as_str(), p.display_name().unwrap()))
        .collect();
    assert_eq!(names, vec![("u1", Some("Ada")), ("g1", Some("Analysts"))]);
}

#[tokio::test]
async fn repeated_page_token_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/organizations/org-1/principals:batchGet"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "principals": [],
            "next_page_token": "same"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let err = client(&server)
        .batch_get_principals("org-1", &["u1".to_string()], PrincipalView::Basic)
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Transport(_)), "got: {err:?}");
}

#[tokio::test]
async fn cycling_page_tokens_are_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/organizations/org-1/principals:batchGet"))
        .and(body_json(json!({"principal_ids": ["u1"], "view": "BASIC"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "principals": [], "next_page_token": "a"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/organizations/org-1/principals:batchGet"))
        .and(body_partial_json(json!({"page_token": "a"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "principals": [], "next_page_token": "b"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/organizations/org-1/principals:batchGet"))
        .and(body_partial_json(json!({"page_token": "b"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "principals": [], "next_page_token": "a"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .batch_get_principals("org-1", &["u1".to_string()], PrincipalView::Basic)
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Transport(_)), "got: {err:?}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine over HTTP
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_binding_round_trips_through_server() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/organizations/org-1/principals:batchGet"))
        .and(body_json(json!({"principal_ids": ["u2"], "view": "BASIC"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "principals": [{"id": "u2", "type": "GROUP"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/p-1/iam-policy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(viewer_policy("v1")))
        .expect(1)
        .mount(&server)
        .await;

    let expected_put = json!({
        "bindings": [
            {"role_id": "roles/editor", "members": [{"member_id": "u2", "member_type": "GROUP"}]},
            {"role_id": "roles/viewer", "members": [{"member_id": "u1", "member_type": "USER"}]}
        ],
        "etag": "v1"
    });
    let mut stored = expected_put.clone();
    stored["etag"] = json!("v2");

    Mock::given(method("PUT"))
        .and(path("/v1/projects/p-1/iam-policy"))
        .and(body_json(expected_put))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let setter = PolicySetter::new(
        Arc::new(client.project("p-1")),
        PrincipalResolver::new(Arc::new(client.clone())),
        "org-1",
    );

    let policy = setter.add_binding("u2", "editor").await.unwrap();

    assert_eq!(policy.etag, "v2");
    assert_eq!(policy.bindings.len(), 2);
}

#[tokio::test]
async fn stale_write_surfaces_version_mismatch_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/p-1/iam-policy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(viewer_policy("v1")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/v1/projects/p-1/iam-policy"))
        .respond_with(ResponseTemplate::new(412))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let setter = PolicySetter::new(
        Arc::new(client.project("p-1")),
        PrincipalResolver::new(Arc::new(client.clone())),
        "org-1",
    );

    let err = setter.delete_binding("u1", "viewer").await.unwrap_err();

    assert!(err.is_version_mismatch(), "got: {err:?}");
    assert!(matches!(err, IamError::Backend { .. }));
}
