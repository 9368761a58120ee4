#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, Once},
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use bytes::Bytes;
use tracing_subscriber::EnvFilter;
use url::Url;
use wkd::{
    ErrorCollection, KeyParser, KeyParsingError, KeyRecord, PublicKeyAlgorithm, StatusCode,
    TransportError, WkdClient, WkdError, WkdTransport,
};

pub const ADVANCED_POLICY: &str =
    "https://openpgpkey.example.org/.well-known/openpgpkey/example.org/policy";
pub const DIRECT_POLICY: &str = "https://example.org/.well-known/openpgpkey/policy";
pub const ADVANCED_SUBMISSION: &str =
    "https://openpgpkey.example.org/.well-known/openpgpkey/example.org/submission-address";
pub const DIRECT_SUBMISSION: &str = "https://example.org/.well-known/openpgpkey/submission-address";
pub const ADVANCED_JOE: &str = "https://openpgpkey.example.org/.well-known/openpgpkey/example.org/hu/iy9q119eutrkn8s1mk4r39qejnbu3n5q?l=Joe.Doe";
pub const DIRECT_JOE: &str =
    "https://example.org/.well-known/openpgpkey/hu/iy9q119eutrkn8s1mk4r39qejnbu3n5q?l=Joe.Doe";

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Clone)]
pub enum Reply {
    Body(Bytes),
    Fail(TransportError),
    /// Never answers.
    Hang,
}

/// In-memory transport answering from a fixed table. Unknown URLs get a 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, Reply>>,
    delays: Mutex<HashMap<String, Duration>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, url: &str, body: impl Into<Bytes>) -> &Self {
        self.set(url, Reply::Body(body.into()))
    }

    pub fn fail(&self, url: &str, error: TransportError) -> &Self {
        self.set(url, Reply::Fail(error))
    }

    pub fn hang(&self, url: &str) -> &Self {
        self.set(url, Reply::Hang)
    }

    /// Answer `url` only after `delay`.
    pub fn delay(&self, url: &str, delay: Duration) -> &Self {
        self.delays.lock().unwrap().insert(url.to_string(), delay);
        self
    }

    fn set(&self, url: &str, reply: Reply) -> &Self {
        self.replies.lock().unwrap().insert(url.to_string(), reply);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl WkdTransport for MockTransport {
    async fn get(&self, url: &Url) -> Result<Bytes, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());

        let delay = self.delays.lock().unwrap().get(url.as_str()).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().unwrap().get(url.as_str()).cloned();

        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(not_found()),
        }
    }
}

pub fn not_found() -> TransportError {
    TransportError::Status {
        status: StatusCode::NOT_FOUND,
        message: "Not Found".into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeKey {
    pub fingerprint: String,
    pub algorithm: PublicKeyAlgorithm,
    pub bits: u32,
    pub user_ids: Vec<String>,
}

impl KeyRecord for FakeKey {
    fn key_id(&self) -> String {
        self.fingerprint[self.fingerprint.len().saturating_sub(16)..].to_string()
    }
    fn version(&self) -> u8 {
        4
    }
    fn fingerprint(&self) -> String {
        self.fingerprint.clone()
    }
    fn algorithm(&self) -> PublicKeyAlgorithm {
        self.algorithm
    }
    fn bit_strength(&self) -> u32 {
        self.bits
    }
    fn creation_time(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH
    }
    fn expiration_time(&self) -> Option<SystemTime> {
        None
    }
    fn is_revoked(&self) -> bool {
        false
    }
    fn encoded(&self) -> Vec<u8> {
        self.fingerprint.as_bytes().to_vec()
    }
    fn user_ids(&self) -> Vec<String> {
        self.user_ids.clone()
    }
}

/// Reads one key per line: `fingerprint|algorithm code|bits|uid,uid`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeParser;

impl KeyParser for FakeParser {
    type Key = FakeKey;

    fn parse(&self, bytes: &[u8]) -> Result<Vec<FakeKey>, ErrorCollection> {
        let text = std::str::from_utf8(bytes).map_err(|err| parse_error(err.to_string()))?;

        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let fields: Vec<&str> = line.split('|').collect();
                let &[fingerprint, algorithm, bits, user_ids] = fields.as_slice() else {
                    return Err(parse_error(format!("Malformed key: {line}")));
                };
                Ok(FakeKey {
                    fingerprint: fingerprint.to_string(),
                    algorithm: algorithm
                        .parse::<u8>()
                        .map_err(|err| parse_error(err.to_string()))?
                        .into(),
                    bits: bits.parse().map_err(|err: std::num::ParseIntError| parse_error(err.to_string()))?,
                    user_ids: user_ids
                        .split(',')
                        .filter(|uid| !uid.is_empty())
                        .map(str::to_string)
                        .collect(),
                })
            })
            .collect()
    }
}

fn parse_error(message: impl Into<String>) -> ErrorCollection {
    ErrorCollection::from(WkdError::from(KeyParsingError::new(message)))
}

pub fn key(fingerprint: &str, algorithm: u8, bits: u32, user_ids: &[&str]) -> FakeKey {
    FakeKey {
        fingerprint: fingerprint.to_string(),
        algorithm: algorithm.into(),
        bits,
        user_ids: user_ids.iter().map(|uid| uid.to_string()).collect(),
    }
}

pub fn keyring(keys: &[FakeKey]) -> String {
    keys.iter()
        .map(|key| {
            format!(
                "{}|{}|{}|{}",
                key.fingerprint,
                key.algorithm.code(),
                key.bits,
                key.user_ids.join(",")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn client(transport: &Arc<MockTransport>) -> WkdClient<FakeParser> {
    init_tracing();
    WkdClient::builder(FakeParser)
        .transport(Arc::clone(transport) as Arc<dyn WkdTransport>)
        .build()
        .unwrap()
}
