mod common;

use std::fs;

use axum::http::{Method, StatusCode};
use common::TestServer;
use indexmap::IndexMap;
use serde_json::json;
use tempfile::tempdir;
use wftools::models::wes::{RunSubmission, State};
use wftools::WesClient;

fn client(server: &TestServer) -> WesClient {
    WesClient::new(&server.url()).unwrap()
}

#[test]
fn run_workflow_sends_each_attachment_as_a_part() {
    let server = TestServer::start();
    server.respond(
        Method::POST,
        "/ga4gh/wes/v1/runs",
        StatusCode::OK,
        json!({"run_id": "run-1"}),
    );

    let temp_dir = tempdir().unwrap();
    let params = temp_dir.path().join("params.json");
    let main = temp_dir.path().join("main.cwl");
    let tool = temp_dir.path().join("echo-tool.cwl");
    let engine = temp_dir.path().join("engine.json");
    fs::write(&params, r#"{"message": "hi"}"#).unwrap();
    fs::write(&main, "cwlVersion: v1.0\nclass: Workflow\n").unwrap();
    fs::write(&tool, "cwlVersion: v1.0\nclass: CommandLineTool\n").unwrap();
    fs::write(&engine, r#"{"--leave-tmpdir": "true"}"#).unwrap();

    let mut attachments = IndexMap::new();
    attachments.insert("main.cwl".to_string(), main);
    attachments.insert("tools/echo.cwl".to_string(), tool);
    let mut tags = IndexMap::new();
    tags.insert("project".to_string(), "alpha".to_string());

    let run = RunSubmission {
        workflow_url: "main.cwl".to_string(),
        workflow_params: params,
        workflow_type: "CWL".to_string(),
        workflow_type_version: "1.0".to_string(),
        attachments,
        engine_parameters: Some(engine),
        tags: Some(tags),
    };
    assert_eq!(client(&server).run_workflow(&run).unwrap(), "run-1");

    let request = server.last_request();
    assert!(request.is_multipart());
    assert_eq!(request.part("workflow_url").text(), "main.cwl");
    assert_eq!(request.part("workflow_type").text(), "CWL");
    assert_eq!(request.part("workflow_type_version").text(), "v1.0");
    assert_eq!(request.part("tags").json(), json!({"project": "alpha"}));
    assert_eq!(request.part("workflow_params").json(), json!({"message": "hi"}));
    assert_eq!(
        request.part("workflow_engine_parameters").json(),
        json!({"--leave-tmpdir": "true"})
    );

    let attachments = request.parts_named("workflow_attachment");
    let names: Vec<_> = attachments
        .iter()
        .map(|part| part.file_name.as_deref().unwrap())
        .collect();
    assert_eq!(names, vec!["main.cwl", "tools/echo.cwl"]);
    assert_eq!(attachments[1].text(), "cwlVersion: v1.0\nclass: CommandLineTool\n");
}

#[test]
fn run_workflow_omits_absent_optional_parts() {
    let server = TestServer::start();
    server.respond(
        Method::POST,
        "/ga4gh/wes/v1/runs",
        StatusCode::OK,
        json!({"run_id": "run-2"}),
    );

    let temp_dir = tempdir().unwrap();
    let params = temp_dir.path().join("params.json");
    fs::write(&params, "{}").unwrap();

    let run = RunSubmission {
        workflow_url: "https://example.org/hello.wdl".to_string(),
        workflow_params: params,
        workflow_type: "WDL".to_string(),
        workflow_type_version: "1.0".to_string(),
        ..RunSubmission::default()
    };
    client(&server).run_workflow(&run).unwrap();

    let request = server.last_request();
    assert_eq!(
        request.part_names(),
        vec![
            "workflow_url",
            "workflow_type",
            "workflow_type_version",
            "workflow_params"
        ]
    );
    assert_eq!(request.part("workflow_type_version").text(), "1.0");
}

#[test]
fn list_runs_passes_page_token() {
    let server = TestServer::start();
    server.respond(
        Method::GET,
        "/ga4gh/wes/v1/runs",
        StatusCode::OK,
        json!({
            "runs": [
                {"run_id": "run-1", "state": "RUNNING"},
                {"run_id": "run-2", "state": "CANCELING"}
            ],
            "next_page_token": "next"
        }),
    );

    let page = client(&server).list_runs(Some(2), Some("first")).unwrap();
    assert_eq!(page.runs[1].state, State::Canceling);
    assert_eq!(page.next_page_token.as_deref(), Some("next"));
    assert_eq!(
        server.last_request().query_pairs(),
        vec![("page_size", "2"), ("page_token", "first")]
    );
}

#[test]
fn run_log_and_status() {
    let server = TestServer::start();
    server.respond(
        Method::GET,
        "/ga4gh/wes/v1/run/run-1",
        StatusCode::OK,
        json!({
            "run_id": "run-1",
            "state": "COMPLETE",
            "request": {
                "workflow_url": "main.cwl",
                "workflow_type": "CWL",
                "workflow_type_version": "v1.0",
                "workflow_params": {"message": "hi"}
            },
            "run_log": {"name": "main", "exit_code": 0},
            "task_logs": [{"name": "echo", "stdout": "/logs/echo.out", "exit_code": 0}],
            "outputs": {"out": {"location": "file:///out/hello.txt"}}
        }),
    );
    server.respond(
        Method::GET,
        "/ga4gh/wes/v1/run/run-1/status",
        StatusCode::OK,
        json!({"run_id": "run-1", "state": "COMPLETE"}),
    );

    let client = client(&server);
    let log = client.get_run_log("run-1").unwrap();
    assert_eq!(log.state, State::Complete);
    assert_eq!(log.request.unwrap().workflow_params, json!({"message": "hi"}));
    assert_eq!(log.task_logs[0].stdout.as_deref(), Some("/logs/echo.out"));

    let status = client.get_run_status("run-1").unwrap();
    assert_eq!(status.run_id, "run-1");
    assert_eq!(status.state, State::Complete);
}

#[test]
fn cancel_run_posts_to_runs_path() {
    let server = TestServer::start();
    server.respond(
        Method::POST,
        "/ga4gh/wes/v1/runs/run-1/cancel",
        StatusCode::OK,
        json!({"run_id": "run-1"}),
    );

    assert_eq!(client(&server).cancel_run("run-1").unwrap(), "run-1");
    assert_eq!(server.last_request().method, Method::POST);
}

#[test]
fn service_info_and_versioned_base_path() {
    let server = TestServer::start();
    server.respond(
        Method::GET,
        "/ga4gh/wes/v2/service-info",
        StatusCode::OK,
        json!({
            "workflow_type_versions": {"CWL": {"workflow_type_version": ["v1.0"]}},
            "supported_wes_versions": ["1.0.0"],
            "supported_filesystem_protocols": ["file", "http"],
            "workflow_engine_versions": {"cwltool": "3.1"},
            "system_state_counts": {"RUNNING": 2}
        }),
    );

    let client = WesClient::with_version(&server.url(), "v2").unwrap();
    let info = client.get_service_info().unwrap();
    assert_eq!(
        info.workflow_type_versions["CWL"].workflow_type_version,
        vec!["v1.0"]
    );
    assert_eq!(info.system_state_counts["RUNNING"], 2);
}

#[test]
fn ga4gh_error_message_is_reported() {
    let server = TestServer::start();
    server.respond(
        Method::GET,
        "/ga4gh/wes/v1/run/missing/status",
        StatusCode::NOT_FOUND,
        json!({"msg": "run missing not found", "status_code": 404}),
    );

    let err = client(&server).get_run_status("missing").unwrap_err();
    assert!(err.is_transport());
    assert_eq!(
        err.to_string(),
        "server returned HTTP 404: run missing not found"
    );
}
