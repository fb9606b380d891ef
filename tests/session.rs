//! Integration tests for the session facade.
//!
//! Drives a [`BrowserSession`] against an in-process mock debugging
//! endpoint: a WebSocket server that answers protocol commands with canned
//! responses, emits `Page.loadEventFired` after navigations, and records
//! every evaluated expression for assertions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use cdp_session::{
    BrowserSession, ConnectOptions, Error, ExtractOptions, SessionOptions, TypeOptions,
};

// ============================================================================
// Mock Endpoint
// ============================================================================

/// Shared log of every `Runtime.evaluate` expression the mock received.
type ExpressionLog = Arc<Mutex<Vec<String>>>;

struct MockEndpoint {
    addr: SocketAddr,
    expressions: ExpressionLog,
}

impl MockEndpoint {
    /// Binds the mock endpoint and spawns its accept loop.
    async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock endpoint");
        let addr = listener.local_addr().expect("local addr");
        let expressions: ExpressionLog = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&expressions);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle_connection(stream, Arc::clone(&log)));
            }
        });

        Self { addr, expressions }
    }

    fn connect_options(&self) -> ConnectOptions {
        ConnectOptions::websocket_url(format!("ws://{}/devtools/page/mock", self.addr))
    }

    fn evaluated(&self) -> Vec<String> {
        self.expressions.lock().clone()
    }
}

async fn handle_connection(stream: TcpStream, log: ExpressionLog) {
    let Ok(mut ws) = accept_async(stream).await else {
        return;
    };

    while let Some(Ok(message)) = ws.next().await {
        let Message::Text(text) = message else {
            continue;
        };
        let Ok(request) = serde_json::from_str::<Value>(&text) else {
            continue;
        };

        let id = request["id"].as_u64().unwrap_or(0);
        let method = request["method"].as_str().unwrap_or("").to_string();
        let params = request["params"].clone();

        let (result, followups) = dispatch(&method, &params, &log).await;

        let reply = json!({"id": id, "result": result});
        if ws.send(Message::Text(reply.to_string().into())).await.is_err() {
            break;
        }
        for event in followups {
            let _ = ws.send(Message::Text(event.to_string().into())).await;
        }
    }
}

/// Produces the canned result (and follow-up events) for one command.
async fn dispatch(method: &str, params: &Value, log: &ExpressionLog) -> (Value, Vec<Value>) {
    match method {
        "Network.enable" | "Page.enable" | "Runtime.enable" | "DOM.enable" => {
            (json!({}), vec![])
        }

        "Page.navigate" => {
            let result = json!({"frameId": "F1", "loaderId": "L1"});

            // A "no-load" host accepts the navigation but never finishes
            // loading: the load event is suppressed.
            let url = params["url"].as_str().unwrap_or("");
            if url.contains("no-load") {
                return (result, vec![]);
            }

            let event = json!({
                "method": "Page.loadEventFired",
                "params": {"timestamp": 1.0}
            });
            (result, vec![event])
        }

        "Page.captureScreenshot" => (json!({"data": "cG5nLWJ5dGVz"}), vec![]),

        "Runtime.evaluate" => {
            let expression = params["expression"].as_str().unwrap_or("").to_string();
            log.lock().push(expression.clone());
            (evaluate_result(&expression).await, vec![])
        }

        "Runtime.callFunctionOn" => {
            (json!({"result": {"type": "string", "value": "node text"}}), vec![])
        }

        "DOM.getDocument" => (
            json!({"root": {"nodeId": 1, "nodeType": 9, "nodeName": "#document"}}),
            vec![],
        ),

        "DOM.querySelector" => {
            let node_id = match params["selector"].as_str() {
                Some("#hit") => 42,
                _ => 0,
            };
            (json!({"nodeId": node_id}), vec![])
        }

        "DOM.querySelectorAll" => {
            let node_ids: Vec<i64> = match params["selector"].as_str() {
                Some(".a") => vec![],
                Some(".b") => vec![11, 12, 13],
                Some(".many") => (1000..1100).collect(),
                Some("h1") => vec![21],
                _ => vec![],
            };
            (json!({"nodeIds": node_ids}), vec![])
        }

        "DOM.getAttributes" => (json!({"attributes": ["id", "x", "class", "y"]}), vec![]),

        "DOM.getOuterHTML" => (
            json!({"outerHTML": "<div id=\"x\" class=\"y\"></div>"}),
            vec![],
        ),

        "DOM.resolveNode" => (json!({"object": {"type": "object", "objectId": "obj-1"}}), vec![]),

        _ => (json!({}), vec![]),
    }
}

/// Canned `Runtime.evaluate` results keyed off expression content.
async fn evaluate_result(expression: &str) -> Value {
    // Artificially delayed response for the timeout race test.
    if expression.contains("__slow__") {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        return by_value(json!(42));
    }

    // click on a missing element rejects page-side.
    if expression.contains("scrollIntoView") && expression.contains("#nonexistent") {
        return json!({
            "result": {"type": "object"},
            "exceptionDetails": {
                "text": "Uncaught (in promise)",
                "exception": {
                    "type": "object",
                    "description": "Error: Element not found: #nonexistent"
                }
            }
        });
    }
    if expression.contains("scrollIntoView") {
        return by_value(json!(true));
    }

    // Batch text collection for extract_elements.
    if expression.contains("querySelectorAll") {
        if expression.contains(".many") {
            let texts: Vec<String> = (0..100).map(|i| format!("item {i}")).collect();
            return by_value(json!(texts));
        }
        return by_value(json!(["one", "two", "three"]));
    }

    // Missing element: extractors observe null.
    if expression.contains("#nonexistent") {
        return json!({"result": {"type": "object", "subtype": "null", "value": null}});
    }

    // A selector that never appears: the page-side polling loop rejects
    // on its own deadline.
    if expression.contains(".never") {
        return json!({
            "result": {"type": "object"},
            "exceptionDetails": {
                "text": "Uncaught (in promise)",
                "exception": {
                    "type": "object",
                    "description": "Error: Timed out waiting for selector: .never"
                }
            }
        });
    }

    // wait_for_selector resolves immediately (selector present).
    if expression.contains("Timed out waiting") {
        return by_value(json!(true));
    }

    if expression.contains("location.href") {
        return by_value(json!("https://example.com/"));
    }
    if expression.contains("document.title") {
        return by_value(json!("Example Domain"));
    }
    if expression.contains("readyState") {
        return by_value(json!(true));
    }
    if expression.contains("textContent") {
        return by_value(json!("Example Domain"));
    }

    by_value(json!(true))
}

fn by_value(value: Value) -> Value {
    json!({"result": {"type": "object", "value": value}})
}

// ============================================================================
// Helpers
// ============================================================================

fn fast_options() -> SessionOptions {
    SessionOptions {
        rate_limit_ms: 0,
        default_timeout_ms: 5_000,
    }
}

async fn connected_session(mock: &MockEndpoint, options: SessionOptions) -> BrowserSession {
    let session = BrowserSession::new(options);
    session
        .connect(mock.connect_options())
        .await
        .expect("connect to mock endpoint");
    session
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn disconnect_is_idempotent() {
    // Never connected: both calls are no-ops.
    let session = BrowserSession::new(fast_options());
    session.disconnect().await;
    session.disconnect().await;

    // Connected: second disconnect is a no-op too.
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;
    assert!(session.is_connected());

    session.disconnect().await;
    session.disconnect().await;
    assert!(!session.is_connected());
}

#[tokio::test]
async fn operations_fail_before_connect() {
    let session = BrowserSession::new(fast_options());

    let err = session.evaluate("1 + 1", None).await.unwrap_err();
    assert!(matches!(err, Error::NotConnected));

    let err = session.open("https://example.com", None).await.unwrap_err();
    assert!(err.is_connection_error());
}

#[tokio::test]
async fn operations_fail_after_disconnect() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;
    session.disconnect().await;

    let err = session.evaluate("1 + 1", None).await.unwrap_err();
    assert!(matches!(err, Error::NotConnected));
}

// ============================================================================
// Rate Limiting
// ============================================================================

#[tokio::test]
async fn consecutive_actions_respect_rate_limit() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(
        &mock,
        SessionOptions {
            rate_limit_ms: 150,
            default_timeout_ms: 5_000,
        },
    )
    .await;

    let start = Instant::now();
    session.evaluate("1 + 1", None).await.expect("first evaluate");
    session.evaluate("2 + 2", None).await.expect("second evaluate");

    // The second action cannot start within 150ms of the first.
    assert!(
        start.elapsed() >= Duration::from_millis(150),
        "actions were {}ms apart",
        start.elapsed().as_millis()
    );

    session.disconnect().await;
}

// ============================================================================
// Timeout Race
// ============================================================================

#[tokio::test]
async fn evaluate_times_out_without_waiting_for_response() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    let start = Instant::now();
    let err = session
        .evaluate("__slow__", Some(Duration::from_millis(200)))
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got: {err}");
    // Rejected at ~200ms, well before the mock's 1000ms delayed response.
    assert!(
        start.elapsed() < Duration::from_millis(800),
        "timeout took {}ms",
        start.elapsed().as_millis()
    );

    session.disconnect().await;
}

#[tokio::test]
async fn wait_for_selector_times_out_when_nothing_matches() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    let err = session
        .wait_for_selector(".never", Some(Duration::from_millis(300)))
        .await
        .unwrap_err();

    // The page-side rejection surfaces as a timeout, not a script error.
    match err {
        Error::Timeout {
            operation,
            timeout_ms,
        } => {
            assert!(operation.contains(".never"), "operation was: {operation}");
            assert_eq!(timeout_ms, 300);
        }
        other => panic!("expected timeout, got: {other}"),
    }

    session.disconnect().await;
}

#[tokio::test]
async fn open_fails_within_budget_when_load_never_fires() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    let start = Instant::now();
    let err = session
        .open("https://no-load.test/page", Some(Duration::from_millis(400)))
        .await
        .unwrap_err();

    match &err {
        Error::Navigation { url, message } => {
            assert_eq!(url, "https://no-load.test/page");
            assert!(message.contains("load event"), "message was: {message}");
        }
        other => panic!("expected navigation error, got: {other}"),
    }

    // Bounded by the leftover budget, not hanging on the missing event.
    assert!(
        start.elapsed() < Duration::from_millis(1_500),
        "open took {}ms",
        start.elapsed().as_millis()
    );

    session.disconnect().await;
}

// ============================================================================
// Missing Element Asymmetry
// ============================================================================

#[tokio::test]
async fn get_text_resolves_null_where_click_rejects() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    let text = session.get_text("#nonexistent").await.expect("get_text");
    assert_eq!(text, None);

    let err = session.click("#nonexistent", None).await.unwrap_err();
    match err {
        Error::Evaluation { message } => assert!(message.contains("Element not found")),
        other => panic!("expected evaluation error, got: {other}"),
    }

    session.disconnect().await;
}

// ============================================================================
// Batch Extraction
// ============================================================================

#[tokio::test]
async fn extract_elements_falls_back_to_first_matching_selector() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    let descriptors = session
        .extract_elements(&[".a", ".b"], ExtractOptions::default())
        .await
        .expect("extract");

    assert_eq!(descriptors.len(), 3);
    for descriptor in &descriptors {
        assert_eq!(descriptor.selector, ".b");
    }

    let node_ids: Vec<i64> = descriptors.iter().map(|d| d.node.node_id()).collect();
    assert_eq!(node_ids, vec![11, 12, 13]);

    let texts: Vec<&str> = descriptors
        .iter()
        .map(|d| d.text.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(texts, vec!["one", "two", "three"]);

    let attributes = descriptors[0].attributes.as_ref().expect("attributes");
    assert_eq!(attributes.get("id"), Some(&"x".to_string()));
    assert_eq!(attributes.get("class"), Some(&"y".to_string()));

    session.disconnect().await;
}

#[tokio::test]
async fn extract_elements_caps_at_max_elements() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    let descriptors = session
        .extract_elements(
            &[".many"],
            ExtractOptions {
                max_elements: 50,
                ..ExtractOptions::default()
            },
        )
        .await
        .expect("extract");

    assert_eq!(descriptors.len(), 50);

    session.disconnect().await;
}

#[tokio::test]
async fn extract_elements_returns_empty_when_nothing_matches() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    let descriptors = session
        .extract_elements(&[".a", ".also-missing"], ExtractOptions::default())
        .await
        .expect("extract");
    assert!(descriptors.is_empty());

    session.disconnect().await;
}

// ============================================================================
// DOM Domain
// ============================================================================

#[tokio::test]
async fn dom_attributes_are_reassembled_from_flat_list() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    let node = session
        .dom_query_selector("#hit", None)
        .await
        .expect("query")
        .expect("node matched");
    assert_eq!(node.node_id(), 42);

    let attributes = session.dom_get_attributes(&node).await.expect("attributes");
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes.get("id"), Some(&"x".to_string()));
    assert_eq!(attributes.get("class"), Some(&"y".to_string()));

    session.disconnect().await;
}

#[tokio::test]
async fn dom_query_selector_miss_is_none() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    let node = session
        .dom_query_selector("#miss", None)
        .await
        .expect("query");
    assert!(node.is_none());

    session.disconnect().await;
}

#[tokio::test]
async fn dom_text_content_reads_through_resolved_object() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    let root = session.get_document().await.expect("document");
    let text = session.dom_get_text_content(&root).await.expect("text");
    assert_eq!(text, "node text");

    let html = session.dom_get_outer_html(&root).await.expect("html");
    assert!(html.starts_with("<div"));

    session.disconnect().await;
}

#[tokio::test]
async fn node_refs_go_stale_after_navigation() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    let node = session.get_document().await.expect("document");
    session
        .open("https://example.com", None)
        .await
        .expect("navigate");

    let err = session.dom_get_outer_html(&node).await.unwrap_err();
    assert!(matches!(err, Error::StaleNode { .. }));

    // Refs issued after the navigation work.
    let fresh = session.get_document().await.expect("document");
    assert!(session.dom_get_outer_html(&fresh).await.is_ok());

    session.disconnect().await;
}

// ============================================================================
// End-to-End
// ============================================================================

#[tokio::test]
async fn navigate_wait_and_extract() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    session
        .open("https://example.com", None)
        .await
        .expect("navigate");
    session
        .wait_for_selector("h1", None)
        .await
        .expect("wait for h1");

    let heading = session.get_text("h1").await.expect("get_text");
    assert_eq!(heading.as_deref(), Some("Example Domain"));

    let url = session.current_url().await.expect("url");
    assert_eq!(url, "https://example.com/");

    let title = session.title().await.expect("title");
    assert_eq!(title, "Example Domain");

    let screenshot = session.screenshot().await.expect("screenshot");
    assert_eq!(screenshot, "cG5nLWJ5dGVz");

    session.disconnect().await;
}

#[tokio::test]
async fn save_screenshot_writes_decoded_bytes() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    let path = std::env::temp_dir().join(format!("cdp-session-test-{}.png", std::process::id()));
    let data = session.save_screenshot(&path).await.expect("save");
    assert_eq!(data, "cG5nLWJ5dGVz");

    let bytes = std::fs::read(&path).expect("read screenshot file");
    assert_eq!(bytes, b"png-bytes");
    let _ = std::fs::remove_file(&path);

    session.disconnect().await;
}

#[tokio::test]
async fn type_text_embeds_special_characters_as_json_literal() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    session
        .type_text("#search", "O'Brien", TypeOptions::default())
        .await
        .expect("type");

    let typed = mock
        .evaluated()
        .into_iter()
        .find(|e| e.contains("dispatchEvent"))
        .expect("typing script evaluated");

    // The apostrophe survives intact inside a JSON string literal.
    assert!(typed.contains(r#""O'Brien""#), "script was: {typed}");
    assert!(typed.contains(r##""#search""##));

    session.disconnect().await;
}

#[tokio::test]
async fn type_text_without_clearing_keeps_existing_value() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    session
        .type_text("#search", "query", TypeOptions { clear_first: false })
        .await
        .expect("type");

    let typed = mock
        .evaluated()
        .into_iter()
        .find(|e| e.contains("dispatchEvent"))
        .expect("typing script evaluated");
    assert!(!typed.contains("element.value = '';"));

    session.disconnect().await;
}

#[tokio::test]
async fn wait_for_load_resolves() {
    let mock = MockEndpoint::spawn().await;
    let session = connected_session(&mock, fast_options()).await;

    session.wait_for_load(None).await.expect("wait for load");

    session.disconnect().await;
}
