// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server};
use vtop_app::{DataSource, Snapshot, SourceError, TabKind};
use vtop_source::RemoteSource;

fn json_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body).with_status_code(status).with_header(
        Header::from_bytes("Content-Type", "application/json").expect("valid content type header"),
    )
}

#[test]
fn connect_error_names_the_agent() {
    let mut source =
        RemoteSource::new("http://127.0.0.1:1", Duration::from_millis(50)).expect("valid URL");

    let error = source
        .connect("http://127.0.0.1:1")
        .expect_err("connect should fail for unreachable agent");
    assert!(error.is_fatal());
    assert!(error.to_string().contains("cannot reach stats agent"));
}

#[test]
fn connect_fetch_and_clear_against_mock_agent() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("version request expected");
        assert_eq!(request.url(), "/version");
        request
            .respond(json_response(r#"{"version":"agent 24.02"}"#, 200))
            .expect("response should succeed");

        let request = server.recv().expect("stats request expected");
        assert_eq!(request.method(), &Method::Get);
        assert_eq!(request.url(), "/stats/errors");
        request
            .respond(json_response(
                r#"[{"count":12,"node":"ip4-input","reason":"ip4 ttl <= 1"}]"#,
                200,
            ))
            .expect("response should succeed");

        let request = server.recv().expect("clear request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/stats/errors/clear");
        request
            .respond(json_response("", 204))
            .expect("response should succeed");
    });

    let mut source = RemoteSource::new(&addr, Duration::from_secs(1))?;
    source.connect(&addr)?;
    assert_eq!(source.version(), "agent 24.02");

    let snapshot = source.fetch_snapshot(TabKind::Errors)?;
    let Snapshot::Errors(errors) = snapshot else {
        return Err(anyhow!("expected errors snapshot"));
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].count, 12);
    assert_eq!(errors[0].node, "ip4-input");

    source.clear_counters(TabKind::Errors)?;

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn agent_errors_become_transient_fetch_errors() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("version request expected");
        request
            .respond(json_response(r#"{"version":"agent"}"#, 200))
            .expect("response should succeed");

        let request = server.recv().expect("stats request expected");
        assert_eq!(request.url(), "/stats/nodes");
        request
            .respond(json_response(r#"{"error":"stats segment busy"}"#, 503))
            .expect("response should succeed");
    });

    let mut source = RemoteSource::new(&addr, Duration::from_secs(1))?;
    source.connect(&addr)?;

    let error = source
        .fetch_snapshot(TabKind::Nodes)
        .expect_err("503 should fail the fetch");
    assert!(matches!(
        error,
        SourceError::TransientFetch {
            tab: TabKind::Nodes,
            ..
        }
    ));
    assert!(error.to_string().contains("stats segment busy"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn non_counter_tabs_are_not_sent_to_the_agent() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("version request expected");
        request
            .respond(json_response(r#"{"version":"agent"}"#, 200))
            .expect("response should succeed");
    });

    let mut source = RemoteSource::new(&addr, Duration::from_secs(1))?;
    source.connect(&addr)?;
    handle.join().expect("server thread should join");

    let error = source
        .clear_counters(TabKind::Threads)
        .expect_err("threads have no counters");
    assert!(matches!(error, SourceError::Clear { .. }));
    Ok(())
}
