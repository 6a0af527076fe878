//! Requests built and executed against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the builder through
//! the default ureq transport over real HTTP. Validates that what the builder
//! materializes is what actually arrives on the wire, and that responses are
//! classified and decoded end-to-end.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use httprequest::{Context, Error, Headers, QueryParams, TransportConfig, UreqTransport, XmlCodec};
use mock_server::{Echo, User};
use serde::{Deserialize, Serialize};

/// Start the mock server on a background thread and return its address.
fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn host(addr: SocketAddr) -> String {
    format!("http://{addr}")
}

#[derive(Serialize)]
struct NewUser<'a> {
    name: &'a str,
    admin: bool,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
struct XmlUser {
    name: String,
    admin: bool,
}

#[derive(Serialize)]
#[serde(rename = "note")]
struct Note {
    text: String,
}

#[test]
fn echo_sees_path_params_query_and_headers() {
    let host = host(start_server());

    let response = httprequest::new(&host)
        .method("PATCH")
        .path("/echo/users/:id/address/:addr")
        .param("id", 123)
        .param("addr", 2)
        .query("fields", "street")
        .query("fields", "city")
        .query("q", "a b")
        .header("x-trace", "one")
        .header("X-TRACE", "two")
        .execute::<Echo>();

    assert_eq!(response.status, 200);
    assert!(response.error.is_none());
    let echo = response.body.unwrap();
    assert_eq!(echo.method, "PATCH");
    assert_eq!(echo.path, "/echo/users/123/address/2");
    assert_eq!(echo.query.as_deref(), Some("fields=street&fields=city&q=a+b"));
    assert_eq!(echo.headers["x-trace"], ["one", "two"]);
}

#[test]
fn json_body_arrives_with_content_type() {
    let host = host(start_server());

    let echo = httprequest::new(&host)
        .method("POST")
        .path("/echo")
        .json(serde_json::json!({ "field": "myField" }))
        .execute::<Echo>()
        .into_result()
        .unwrap()
        .unwrap();

    assert_eq!(echo.body, r#"{"field":"myField"}"#);
    assert_eq!(echo.headers["content-type"], ["application/json"]);
}

#[test]
fn xml_body_arrives_with_content_type() {
    let host = host(start_server());

    let echo = httprequest::new(&host)
        .method("PUT")
        .path("/echo")
        .xml(Note { text: "hi".to_string() })
        .execute::<Echo>()
        .into_result()
        .unwrap()
        .unwrap();

    assert_eq!(echo.body, "<note><text>hi</text></note>");
    assert_eq!(echo.headers["content-type"], ["application/xml"]);
}

#[test]
fn text_body_arrives_verbatim() {
    let host = host(start_server());

    let echo = httprequest::new(&host)
        .method("POST")
        .path("/echo")
        .text("plain words")
        .execute::<Echo>()
        .body
        .unwrap();

    assert_eq!(echo.body, "plain words");
}

#[test]
fn wholesale_headers_and_queries_replace_earlier_ones() {
    let host = host(start_server());
    let headers: Headers = [("X-Kept", "yes")].into_iter().collect();
    let queries: QueryParams = [("kept", "1")].into_iter().collect();

    let echo = httprequest::new(&host)
        .path("/echo")
        .header("X-Dropped", "no")
        .query("dropped", "1")
        .headers(headers)
        .queries(queries)
        .execute::<Echo>()
        .body
        .unwrap();

    assert_eq!(echo.query.as_deref(), Some("kept=1"));
    assert_eq!(echo.headers["x-kept"], ["yes"]);
    assert!(!echo.headers.contains_key("x-dropped"));
}

#[test]
fn create_and_fetch_user() {
    let host = host(start_server());

    let created = httprequest::new(&host)
        .method("POST")
        .path("/users")
        .json(NewUser { name: "alice", admin: true })
        .execute::<User>();
    assert_eq!(created.status, 201);
    let created = created.body.unwrap();
    assert_eq!(created.name, "alice");
    assert!(created.admin);

    let fetched = httprequest::new(&host)
        .path("/users/:id")
        .param("id", created.id)
        .execute::<User>();
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.body, Some(created.clone()));

    let listed = httprequest::new(&host).path("/users").execute::<Vec<User>>();
    assert_eq!(listed.body, Some(vec![created]));
}

#[test]
fn missing_user_is_not_an_error() {
    let host = host(start_server());

    let response = httprequest::new(&host)
        .path("/users/:id")
        .param("id", "00000000-0000-0000-0000-000000000000")
        .execute::<User>();

    assert_eq!(response.status, 404);
    assert!(response.body.is_none());
    assert!(response.error.is_none());
    assert_eq!(response.original.unwrap().status, 404);
}

#[test]
fn server_error_keeps_raw_body() {
    let host = host(start_server());

    let response = httprequest::new(&host)
        .path("/status/:code")
        .param("code", 503)
        .execute::<serde_json::Value>();

    assert_eq!(response.status, 503);
    assert!(response.error.is_none());
    assert_eq!(response.original.as_ref().unwrap().text(), "status 503");
    assert_eq!(
        response.into_result(),
        Err(Error::HttpError {
            status: 503,
            body: "status 503".to_string()
        })
    );
}

#[test]
fn empty_success_body_decodes_to_default() {
    let host = host(start_server());

    let response = httprequest::new(&host)
        .path("/empty")
        .execute::<BTreeMap<String, String>>();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, Some(BTreeMap::new()));
    assert!(response.error.is_none());
}

#[test]
fn xml_response_decodes_with_xml_codec() {
    let host = host(start_server());

    let response = httprequest::new(&host)
        .path("/xml/user")
        .decoder(XmlCodec)
        .execute::<XmlUser>();

    assert_eq!(
        response.body,
        Some(XmlUser {
            name: "xml-user".to_string(),
            admin: true
        })
    );
    assert_eq!(response.original.unwrap().header("content-type"), Some("application/xml"));
}

#[test]
fn xml_response_fails_json_decoding() {
    let host = host(start_server());

    let response = httprequest::new(&host).path("/xml/user").execute::<XmlUser>();

    assert_eq!(response.status, 200);
    assert!(response.body.is_none());
    assert!(matches!(response.error, Some(Error::DeserializationError(_))));
}

#[test]
fn context_deadline_times_out_slow_response() {
    let host = host(start_server());

    let response = httprequest::new(&host)
        .path("/slow/:millis")
        .param("millis", 2_000)
        .context(Context::with_timeout(Duration::from_millis(200)))
        .execute::<String>();

    assert_eq!(response.error, Some(Error::DeadlineExceeded));
    assert!(response.original.is_none());
}

#[test]
fn config_timeout_caps_longer_context_deadline() {
    let host = host(start_server());
    let transport = UreqTransport::new(TransportConfig {
        timeout: Some(Duration::from_millis(200)),
        ..TransportConfig::default()
    });

    let response = httprequest::new(&host)
        .path("/slow/:millis")
        .param("millis", 1_500)
        .context(Context::with_timeout(Duration::from_secs(10)))
        .transport(transport)
        .execute::<String>();

    assert_eq!(response.status, 0);
    assert!(matches!(response.error, Some(Error::TransportError(_))));
}

#[test]
fn configured_user_agent_is_sent() {
    let host = host(start_server());
    let transport = UreqTransport::new(TransportConfig {
        user_agent: Some("httprequest-tests/1.0".to_string()),
        ..TransportConfig::default()
    });

    let echo = httprequest::new(&host)
        .path("/echo")
        .transport(transport)
        .execute::<Echo>()
        .body
        .unwrap();

    assert_eq!(echo.headers["user-agent"], ["httprequest-tests/1.0"]);
}

#[test]
fn path_param_with_space_reaches_server_escaped() {
    let host = host(start_server());

    let echo = httprequest::new(&host)
        .path("/echo/:name")
        .param("name", "john doe")
        .execute::<Echo>()
        .body
        .unwrap();

    assert_eq!(echo.path, "/echo/john%20doe");
}

#[test]
fn explicit_transport_is_used() {
    let host = host(start_server());
    let transport = UreqTransport::new(TransportConfig {
        timeout: Some(Duration::from_secs(5)),
        max_body_bytes: 8,
        ..TransportConfig::default()
    });

    let response = httprequest::new(&host)
        .path("/xml/user")
        .transport(transport)
        .execute::<String>();

    assert!(matches!(response.error, Some(Error::TransportError(_))));
}

#[test]
fn connection_refused_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let response = httprequest::new(host(addr)).path("/echo").execute::<Echo>();

    assert_eq!(response.status, 0);
    assert!(matches!(response.error, Some(Error::TransportError(_))));
}
