//! Integration tests for the backend HTTP surface.
//!
//! These run the real request plumbing against a local mock of the hosted
//! backend: header pairs, body shapes, and the one-shot error
//! classification.

use kampos_client::{BackendClient, NewUser};
use kampos_types::{AccessToken, ApiKey, BackendUrl, ErrorKind, UserId, UserProfile};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = "anon-key-long-enough-to-validate";

fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(
        BackendUrl::new(server.uri()).unwrap(),
        ApiKey::new(TEST_KEY).unwrap(),
    )
}

fn user_json(id: Uuid, email: &str) -> serde_json::Value {
    json!({
        "id": id,
        "email": email,
        "user_metadata": { "full_name": "Ana Pereira", "role": "profesor" }
    })
}

#[tokio::test]
async fn create_user_sends_metadata_and_parses_identity() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .and(header("apikey", TEST_KEY))
        .and(body_partial_json(json!({
            "email": "ana@exemplo.gal",
            "email_confirm": true,
            "user_metadata": { "full_name": "Ana Pereira", "role": "profesor" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(id, "ana@exemplo.gal")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let user = client
        .create_user(&NewUser::new("ana@exemplo.gal", "contrasinal-forte", "Ana Pereira"))
        .await
        .unwrap();

    assert_eq!(user.id, UserId::new(id));
    assert_eq!(user.user_metadata.role.as_deref(), Some("profesor"));
}

#[tokio::test]
async fn sign_in_returns_session_with_identity() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-abc",
            "refresh_token": "refresh-def",
            "expires_at": 1_754_000_000,
            "user": user_json(id, "ana@exemplo.gal"),
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let session = client
        .sign_in_with_password("ana@exemplo.gal", "contrasinal-forte")
        .await
        .unwrap();

    assert_eq!(session.access_token.expose(), "access-abc");
    assert_eq!(session.user.id, UserId::new(id));
    assert_eq!(session.expires_at, Some(1_754_000_000));
}

#[tokio::test]
async fn sign_in_rejection_is_classified_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_code": "invalid_credentials",
            "msg": "Invalid login credentials",
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .sign_in_with_password("ana@exemplo.gal", "mal")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    assert_eq!(err.status, Some(400));
}

#[tokio::test]
async fn sign_out_uses_bearer_session_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("apikey", TEST_KEY))
        .and(header("Authorization", "Bearer access-abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .sign_out(&AccessToken::new("access-abc"))
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_profile_row_is_no_rows_not_an_error_blob() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{id}")))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "code": "PGRST116",
            "details": "The result contains 0 rows",
            "message": "JSON object requested, multiple (or no) rows returned",
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .select_profile(UserId::new(id), None)
        .await
        .unwrap_err();
    assert!(err.kind.is_missing_profile());
}

#[tokio::test]
async fn select_profile_parses_row() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "email": "ana@exemplo.gal",
            "full_name": "Ana Pereira",
            "role": "profesor",
            "created_at": "2026-03-01T10:00:00Z",
        })))
        .mount(&server)
        .await;

    let profile = client_for(&server)
        .select_profile(UserId::new(id), None)
        .await
        .unwrap();
    assert_eq!(profile.email, "ana@exemplo.gal");
    assert_eq!(profile.role, "profesor");
    assert!(profile.created_at.is_some());
}

#[tokio::test]
async fn upsert_asks_for_merge_resolution() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/profiles"))
        .and(header("Prefer", "resolution=merge-duplicates,return=minimal"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let profile = UserProfile {
        id: UserId::new(id),
        email: "ana@exemplo.gal".to_string(),
        full_name: None,
        role: "profesor".to_string(),
        created_at: None,
        updated_at: None,
    };
    client_for(&server)
        .upsert_profile(&profile, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn duplicate_profile_insert_maps_to_already_registered() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"profiles_pkey\"",
        })))
        .mount(&server)
        .await;

    let profile = UserProfile {
        id: UserId::new(id),
        email: "ana@exemplo.gal".to_string(),
        full_name: None,
        role: "profesor".to_string(),
        created_at: None,
        updated_at: None,
    };
    let err = client_for(&server)
        .insert_profile(&profile, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyRegistered);
}

#[tokio::test]
async fn count_profiles_reads_content_range() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/rest/v1/profiles"))
        .and(header("Prefer", "count=exact"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-range", "0-24/57"))
        .mount(&server)
        .await;

    assert_eq!(client_for(&server).count_profiles().await.unwrap(), 57);
}

#[tokio::test]
async fn rpc_returns_raw_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/check_email_confirmation_settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requires_email_confirmation": false,
        })))
        .mount(&server)
        .await;

    let value = client_for(&server)
        .rpc("check_email_confirmation_settings", None)
        .await
        .unwrap();
    assert_eq!(value["requires_email_confirmation"], json!(false));
}

#[tokio::test]
async fn connection_refused_is_network_kind() {
    // Nothing listens on this port; the connect fails before any response.
    let client = BackendClient::new(
        BackendUrl::new("http://127.0.0.1:1").unwrap(),
        ApiKey::new(TEST_KEY).unwrap(),
    );
    let err = client.count_profiles().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
}
