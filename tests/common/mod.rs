//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use weka_event_logger::credentials::{Credentials, PasswordLogin, TokenBundle};
use weka_event_logger::poller::EventSink;
use weka_event_logger::utils::time::PollWindow;
use weka_event_logger::weka_api::{ApiError, AuthTokens, ClusterApi};

/// Shared record of every API call made, as "host:operation".
pub type CallLog = Rc<RefCell<Vec<String>>>;

/// In-memory stand-in for one cluster host.
pub struct FakeCluster {
    host: String,
    refresh_ok: bool,
    login_ok: bool,
    fetches: RefCell<VecDeque<Result<Vec<Value>, ApiError>>>,
    calls: CallLog,
    windows: RefCell<Vec<PollWindow>>,
}

impl FakeCluster {
    pub fn new(host: &str, refresh_ok: bool, login_ok: bool, calls: CallLog) -> Self {
        Self {
            host: host.to_string(),
            refresh_ok,
            login_ok,
            fetches: RefCell::new(VecDeque::new()),
            calls,
            windows: RefCell::new(Vec::new()),
        }
    }

    /// Queue the result of the next `get_events` call.
    pub fn push_fetch(&self, result: Result<Vec<Value>, ApiError>) {
        self.fetches.borrow_mut().push_back(result);
    }

    pub fn windows(&self) -> Vec<PollWindow> {
        self.windows.borrow().clone()
    }

    fn log(&self, op: &str) {
        self.calls.borrow_mut().push(format!("{}:{}", self.host, op));
    }
}

impl ClusterApi for FakeCluster {
    fn host(&self) -> &str {
        &self.host
    }

    async fn login(&self, login: &PasswordLogin) -> Result<AuthTokens, ApiError> {
        self.log("login");
        if self.login_ok {
            Ok(tokens(&format!("login-{}-{}", self.host, login.username)))
        } else {
            Err(unauthorized())
        }
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<AuthTokens, ApiError> {
        self.log("refresh");
        if self.refresh_ok {
            Ok(tokens(&format!("refresh-{}", self.host)))
        } else {
            Err(unauthorized())
        }
    }

    async fn get_events(
        &self,
        _tokens: &AuthTokens,
        window: &PollWindow,
    ) -> Result<Vec<Value>, ApiError> {
        self.log("events");
        self.windows.borrow_mut().push(*window);
        self.fetches.borrow_mut().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Sink that keeps records in memory.
#[derive(Default)]
pub struct MemorySink {
    pub events: Vec<Value>,
}

impl EventSink for MemorySink {
    fn record(&mut self, event: &Value) -> io::Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}

pub fn tokens(access: &str) -> AuthTokens {
    serde_json::from_value(json!({
        "access_token": access,
        "refresh_token": format!("{access}-refresh"),
        "token_type": "Bearer",
    }))
    .unwrap()
}

pub fn unauthorized() -> ApiError {
    ApiError::Status {
        status: 401,
        body: r#"{"message":"Unauthorized"}"#.to_string(),
    }
}

pub fn password_login() -> PasswordLogin {
    PasswordLogin {
        username: "admin".to_string(),
        password: "secret".to_string(),
        organization: "root".to_string(),
    }
}

pub fn token_bundle() -> TokenBundle {
    serde_json::from_value(json!({
        "access_token": "stale",
        "refresh_token": "refresh-me",
        "token_type": "Bearer",
    }))
    .unwrap()
}

pub fn password_only() -> Credentials {
    Credentials {
        tokens: None,
        login: Some(password_login()),
    }
}

pub fn sample_events() -> Vec<Value> {
    vec![
        json!({
            "type": "NodeStopped",
            "category": "Node",
            "severity": "MAJOR",
            "timestamp": "2025-10-06T07:59:12.120Z",
            "description": "Node 3 stopped",
            "params": {"nodeId": "NodeId<3>"}
        }),
        json!({
            "type": "FilesystemCreated",
            "category": "Filesystem",
            "severity": "INFO",
            "timestamp": "2025-10-06T07:59:40.002Z",
            "description": "Filesystem fs01 was created",
            "params": {"fsName": "fs01", "capacity": 1099511627776u64}
        }),
    ]
}

/// Serve one canned response per connection on a local port.
///
/// Returns the server root (`http://127.0.0.1:<port>`) and a channel that
/// yields each raw request as it arrives.
pub fn serve(responses: Vec<(u16, String)>) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            tx.send(read_request(&mut stream)).unwrap();
            let response = format!(
                "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        }
    });

    (format!("http://{addr}"), rx)
}

fn read_request(stream: &mut impl Read) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let content_length = head
            .lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= head_end + 4 + content_length {
            break;
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
