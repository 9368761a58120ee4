//! Default transport backed by a shared [`reqwest::Client`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::{
    errors::BuildError,
    transport::{TransportError, WkdTransport},
    util::check_http_status,
};

/// [`WkdTransport`] over one pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport sending `user_agent`, giving up on requests after `timeout`.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, BuildError> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
        })
    }

    /// Wrap an already configured client.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl WkdTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<Bytes, TransportError> {
        let response = self.http.get(url.clone()).send().await?;
        let response = check_http_status(response).await?;

        Ok(response.bytes().await?)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout;
        }
        if let Some(status) = err.status() {
            return TransportError::Status {
                status,
                message: err.to_string(),
            };
        }
        TransportError::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use reqwest::StatusCode;

    use super::*;

    fn transport() -> ReqwestTransport {
        ReqwestTransport::new("wkd-test/1.0", Some(Duration::from_secs(5))).unwrap()
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/.well-known/openpgpkey/policy")
                    .header("user-agent", "wkd-test/1.0");
                then.status(200).body("mailbox-only\n");
            })
            .await;

        let url = Url::parse(&server.url("/.well-known/openpgpkey/policy")).unwrap();
        let body = transport().get(&url).await.unwrap();

        mock.assert_async().await;
        assert_eq!(&body[..], b"mailbox-only\n");
    }

    #[tokio::test]
    async fn maps_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(404).body("no such key");
            })
            .await;

        let url = Url::parse(&server.url("/.well-known/openpgpkey/hu/abc")).unwrap();
        let err = transport().get(&url).await.unwrap_err();

        assert_eq!(
            err,
            TransportError::Status {
                status: StatusCode::NOT_FOUND,
                message: "no such key".into(),
            }
        );
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_connection_error() {
        // Nothing listens on the discard port.
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let err = transport().get(&url).await.unwrap_err();

        assert!(matches!(err, TransportError::Connection(_)));
        assert_eq!(err.status(), None);
    }
}
