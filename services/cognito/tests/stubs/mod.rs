use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use fedsign_cognito::IdentityClaim;
use fedsign_core::{Context, Error, HttpSend, Result};
use fedsign_store_memory::MemoryKvStore;

pub const TOKEN_RESPONSE: &str = r#"{"IdentityId":"id123","Token":"tok456"}"#;
pub const CREDS_RESPONSE: &str = r#"{"IdentityId":"id123","Credentials":{"AccessKeyId":"AK","SecretKey":"SK","SessionToken":"ST","Expiration":1.7672256E9}}"#;

/// A scripted federation endpoint: pops canned responses in order and
/// records every request it saw.
#[derive(Debug, Clone, Default)]
pub struct StubFederation {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    responses: VecDeque<(u16, String)>,
    calls: Vec<RecordedCall>,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub uri: String,
    pub headers: http::HeaderMap,
    pub body: String,
}

impl RecordedCall {
    pub fn target(&self) -> &str {
        self.headers
            .get("x-amz-target")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
    }
}

impl StubFederation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, status: u16, body: &str) {
        self.state
            .lock()
            .expect("lock poisoned")
            .responses
            .push_back((status, body.to_string()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().expect("lock poisoned").calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().expect("lock poisoned").calls.len()
    }
}

#[async_trait]
impl HttpSend for StubFederation {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let mut state = self.state.lock().expect("lock poisoned");
        state.calls.push(RecordedCall {
            uri: req.uri().to_string(),
            headers: req.headers().clone(),
            body: String::from_utf8_lossy(req.body()).into_owned(),
        });

        let (status, body) = state
            .responses
            .pop_front()
            .ok_or_else(|| Error::unexpected("no scripted response left"))?;
        Ok(http::Response::builder()
            .status(status)
            .body(Bytes::from(body))?)
    }
}

pub fn claim() -> IdentityClaim {
    IdentityClaim::new("u1", "p", "pool1", "login.example.com")
}

pub fn context_with(stub: &StubFederation) -> Context {
    Context::new()
        .with_http_send(stub.clone())
        .with_kv_store(MemoryKvStore::new())
}
