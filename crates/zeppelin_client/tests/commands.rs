use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeppelin_client::{
    AuthMode, ClientConfig, ClientError, ExecutionClient, FailureKind, Parameters, RunMode, Status,
};

fn ok(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "status": "OK", "message": "", "body": body }))
}

async fn setup() -> (MockServer, ExecutionClient) {
    zeppelin_logging::initialize_for_tests();
    let server = MockServer::start().await;
    let config = ClientConfig::new(server.uri()).with_query_interval(Duration::from_millis(10));
    let client = ExecutionClient::new(config).expect("client");
    (server, client)
}

#[tokio::test]
async fn get_version_reads_body_version() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .and(header("origin", "localhost"))
        .respond_with(ok(json!({ "version": "0.11.2", "git-commit-id": "abc" })))
        .mount(&server)
        .await;

    assert_eq!(client.get_version().await.unwrap(), "0.11.2");
}

#[tokio::test]
async fn rejected_envelope_carries_server_message() {
    let (server, client) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/api/notebook/missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "NOT_FOUND",
            "message": "No such note: missing"
        })))
        .mount(&server)
        .await;

    let err = client.delete_note("missing").await.unwrap_err();
    assert_eq!(
        err,
        ClientError::ServerRejected {
            message: "No such note: missing".to_string()
        }
    );
}

#[tokio::test]
async fn lowercase_ok_is_success() {
    let (server, client) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/notebook/n1/paragraph/p1"))
        .and(body_json(json!({ "title": "t", "text": "%python print(1)" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .update_paragraph("n1", "p1", "t", "%python print(1)")
        .await
        .unwrap();
}

#[tokio::test]
async fn http_error_status_is_a_transport_failure() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/notebook/n1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client.query_note_result("n1").await.unwrap_err();
    match err {
        ClientError::Transport(transport) => {
            assert_eq!(transport.kind, FailureKind::HttpStatus(500))
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_network_failure() {
    zeppelin_logging::initialize_for_tests();
    // Nothing listens on port 1.
    let client = ExecutionClient::new(ClientConfig::new("http://127.0.0.1:1")).unwrap();

    let err = client.get_version().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport(ref transport) if transport.kind == FailureKind::Network
    ));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    assert!(matches!(
        client.get_version().await,
        Err(ClientError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn session_commands_use_session_paths() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/session/spark"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "message": "spark-shared_process-1700000000"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/session/spark-shared_process-1700000000"))
        .respond_with(ok(json!({ "weburl": "http://spark-ui:4040" })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/session/spark/spark-shared_process-1700000000"))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let session = client.new_session("spark").await.unwrap();
    assert_eq!(session, "spark-shared_process-1700000000");
    assert_eq!(
        client.get_session_web_url(&session).await.unwrap().as_deref(),
        Some("http://spark-ui:4040")
    );
    client.stop_session("spark", &session).await.unwrap();
}

#[tokio::test]
async fn session_without_web_url_is_none() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/session/python-1"))
        .respond_with(ok(json!({ "sessionId": "python-1" })))
        .mount(&server)
        .await;

    assert_eq!(client.get_session_web_url("python-1").await.unwrap(), None);
}

#[tokio::test]
async fn note_and_paragraph_creation_return_ids() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/notebook"))
        .and(body_json(json!({ "name": "/tmp/note", "defaultInterpreterGroup": "spark" })))
        .respond_with(ok(json!("2NEW")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/notebook/2NEW"))
        .and(body_json(json!({ "name": "/tmp/copy", "defaultInterpreterGroup": "" })))
        .respond_with(ok(json!("2COPY")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/notebook/2NEW/paragraph"))
        .and(body_json(json!({ "title": "first", "text": "%sh echo hi" })))
        .respond_with(ok(json!("paragraph_1")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/notebook/2NEW/paragraph/next"))
        .and(query_param("maxParagraph", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "message": "paragraph_2"
        })))
        .mount(&server)
        .await;

    assert_eq!(client.create_note("/tmp/note", Some("spark")).await.unwrap(), "2NEW");
    assert_eq!(client.clone_note("/tmp/copy", "2NEW", None).await.unwrap(), "2COPY");
    assert_eq!(
        client.add_paragraph("2NEW", "first", "%sh echo hi").await.unwrap(),
        "paragraph_1"
    );
    assert_eq!(client.next_session_paragraph("2NEW", 3).await.unwrap(), "paragraph_2");
}

#[tokio::test]
async fn non_blocking_paragraph_run_returns_pending_snapshot() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/notebook/job/n1/p1"))
        .and(query_param("sessionId", "s-1"))
        .and(body_json(json!({ "params": { "name": "world" } })))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notebook/n1/paragraph/p1"))
        .respond_with(ok(json!({ "id": "p1", "status": "PENDING", "progress": 0 })))
        .expect(1)
        .mount(&server)
        .await;

    let mut parameters = Parameters::new();
    parameters.insert("name".to_string(), "world".to_string());
    let result = client
        .run_paragraph("n1", "p1", "s-1", &parameters, RunMode::Submit)
        .await
        .unwrap();

    assert_eq!(result.status, Status::Pending);
    assert!(result.results.is_empty());
}

#[tokio::test]
async fn blocking_paragraph_run_polls_until_finished() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/notebook/job/n1/p1"))
        .respond_with(ok(json!(null)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notebook/n1/paragraph/p1"))
        .respond_with(ok(json!({ "id": "p1", "status": "RUNNING", "progress": 30 })))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notebook/n1/paragraph/p1"))
        .respond_with(ok(json!({
            "id": "p1",
            "status": "FINISHED",
            "results": { "code": "SUCCESS", "msg": [{ "type": "TEXT", "data": "hello world" }] }
        })))
        .mount(&server)
        .await;

    let result = client
        .run_paragraph("n1", "p1", "", &Parameters::new(), RunMode::WaitForCompletion)
        .await
        .unwrap();

    assert_eq!(result.status, Status::Finished);
    assert_eq!(result.message(), "hello world\n");
}

#[tokio::test]
async fn blocking_note_run_returns_final_snapshot() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/notebook/job/n1"))
        .and(query_param("blocking", "true"))
        .and(query_param("isolated", "true"))
        .and(body_json(json!({ "params": {} })))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notebook/n1"))
        .respond_with(ok(json!({
            "id": "n1",
            "info": { "isRunning": false },
            "paragraphs": [
                { "id": "a", "status": "FINISHED", "results": { "msg": [{ "type": "TEXT", "data": "1" }] } },
                { "id": "b", "status": "FINISHED", "results": { "msg": [{ "type": "TEXT", "data": "2" }] } }
            ]
        })))
        .mount(&server)
        .await;

    let note = client
        .run_note("n1", RunMode::WaitForCompletion, &Parameters::new())
        .await
        .unwrap();

    assert!(!note.is_running);
    assert_eq!(note.paragraph_results.len(), 2);
    assert!(note
        .paragraph_results
        .iter()
        .all(|p| p.status == Status::Finished && p.results.len() == 1));
}

#[tokio::test]
async fn paragraph_query_collects_single_job_url() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/notebook/n1/paragraph/p1"))
        .respond_with(ok(json!({
            "id": "p1",
            "status": "RUNNING",
            "runtimeInfos": {
                "values": [
                    { "label": "stage 0" },
                    { "jobUrl": "http://spark-ui:4040/jobs/job?id=7" },
                    { "tooltip": "n/a" }
                ]
            }
        })))
        .mount(&server)
        .await;

    let result = client.query_paragraph_result("n1", "p1").await.unwrap();
    assert_eq!(result.job_urls, vec!["http://spark-ui:4040/jobs/job?id=7".to_string()]);
}

#[tokio::test]
async fn cancel_targets_the_paragraph_job() {
    let (server, client) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/api/notebook/job/n1/p1"))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    client.cancel_paragraph("n1", "p1").await.unwrap();
}

#[tokio::test]
async fn direct_login_posts_credentials() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "userName": "user1", "password": "password2" })))
        .respond_with(ok(json!({ "principal": "user1" })))
        .expect(1)
        .mount(&server)
        .await;

    client.login("user1", "password2").await.unwrap();
}

#[tokio::test]
async fn failed_login_reports_http_status() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client.login("user1", "wrong").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport(ref transport) if transport.kind == FailureKind::HttpStatus(403)
    ));
}

#[tokio::test]
async fn knox_login_uses_basic_auth() {
    zeppelin_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(basic_auth("user1", "password2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(server.uri()).with_auth_mode(AuthMode::KnoxGateway);
    let client = ExecutionClient::new(config).unwrap();
    client.login("user1", "password2").await.unwrap();
}
