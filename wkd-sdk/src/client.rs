//! The WKD client and its builder.

use std::{fmt, sync::Arc, time::Duration};

use wkd_common::{MailAddress, policy::parse_policy_reader};

use crate::{
    errors::{BuildError, DataValidationError, Error, Result},
    http::ReqwestTransport,
    keys::{KeyParser, KeyRecord},
    responses::{DiscoveryResponse, PolicyResponse, SubmissionAddressResponse},
    retrieval::{RequestOptions, Retrieved, fetch},
    transport::WkdTransport,
    uri::{self, UriCandidate},
    validation::{DiscoveryContext, KeyringValidator, KeyringValidatorBuilder},
    wkd_log,
};

const DEFAULT_USER_AGENT: &str = concat!("wkd-client", "/", env!("CARGO_PKG_VERSION"));

/// Default upper bound for one lookup, all candidates included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(100);

/// Configures a [`WkdClient`] before construction.
///
/// # Defaults
/// - User-agent: `wkd-client/<crate-version>`
/// - Request timeout: [`DEFAULT_REQUEST_TIMEOUT`]
/// - Key validation: reject keys without a user id for the looked-up address
/// - Transport: [`ReqwestTransport`]
///
/// Settings are read once by [`WkdClientBuilder::build`]; the built client
/// never changes afterwards.
#[must_use]
pub struct WkdClientBuilder<P: KeyParser> {
    parser: Arc<P>,
    user_agent: Option<String>,
    request_timeout: Duration,
    validation: KeyringValidatorBuilder<P::Key>,
    transport: Option<Arc<dyn WkdTransport>>,
}

impl<P: KeyParser> WkdClientBuilder<P> {
    /// Start from the defaults, decoding certificates with `parser`.
    pub fn new(parser: P) -> Self {
        Self {
            parser: Arc::new(parser),
            user_agent: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            validation: KeyringValidatorBuilder::new(),
            transport: None,
        }
    }

    /// Replace the default user-agent. Blank values keep the default.
    pub fn user_agent<S: Into<String>>(&mut self, user_agent: S) -> &mut Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the upper bound for one lookup. [`Duration::ZERO`] disables it.
    pub fn request_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.request_timeout = timeout;
        self
    }

    /// Adjust the key validator chain with a callback.
    ///
    /// The chain starts with the default validators.
    pub fn configure_key_validation<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut KeyringValidatorBuilder<P::Key>),
    {
        f(&mut self.validation);
        self
    }

    /// Use `transport` instead of building a [`ReqwestTransport`].
    ///
    /// The user-agent setting only applies to the default transport.
    pub fn transport(&mut self, transport: Arc<dyn WkdTransport>) -> &mut Self {
        self.transport = Some(transport);
        self
    }

    /// Build [`WkdClient`].
    pub fn build(&self) -> std::result::Result<WkdClient<P>, BuildError> {
        let transport = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => {
                let user_agent = match &self.user_agent {
                    Some(user_agent) if !user_agent.trim().is_empty() => user_agent.trim(),
                    _ => DEFAULT_USER_AGENT,
                };
                let timeout = (!self.request_timeout.is_zero()).then_some(self.request_timeout);
                Arc::new(ReqwestTransport::new(user_agent, timeout)?) as Arc<dyn WkdTransport>
            }
        };

        Ok(WkdClient {
            parser: Arc::clone(&self.parser),
            transport,
            validator: self.validation.build(),
            request_timeout: self.request_timeout,
        })
    }
}

impl<P: KeyParser> fmt::Debug for WkdClientBuilder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WkdClientBuilder")
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .field("validation", &self.validation)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

/// Web Key Directory client.
///
/// Looks up certificates, policy files and submission addresses, trying the
/// Advanced method first and the Direct method second. Cloning is cheap:
/// clones share the transport, the parser and the validator chain.
///
/// Every operation has a `*_with` variant taking [`RequestOptions`] for a
/// shorter timeout or a cancellation token.
pub struct WkdClient<P: KeyParser> {
    parser: Arc<P>,
    transport: Arc<dyn WkdTransport>,
    validator: KeyringValidator<P::Key>,
    request_timeout: Duration,
}

impl<P: KeyParser> WkdClient<P> {
    /// Returns a builder to edit settings before creating [`WkdClient`].
    pub fn builder(parser: P) -> WkdClientBuilder<P> {
        WkdClientBuilder::new(parser)
    }

    /// The validator chain run over discovered keys.
    pub fn key_validator(&self) -> &KeyringValidator<P::Key> {
        &self.validator
    }

    /// Look up the submission address of `domain`.
    pub async fn get_submission_address(&self, domain: &str) -> Result<SubmissionAddressResponse> {
        self.get_submission_address_with(domain, &RequestOptions::default())
            .await
    }

    /// [`WkdClient::get_submission_address`] with per-call options.
    pub async fn get_submission_address_with(
        &self,
        domain: &str,
        options: &RequestOptions,
    ) -> Result<SubmissionAddressResponse> {
        let domain = required_domain(domain)?;
        let candidates = uri::submission_address_uris(domain).map_err(invalid_domain(domain))?;

        let Retrieved { method, value } = self.fetch(&candidates, options).await?;

        let text = std::str::from_utf8(&value).map_err(|err| {
            DataValidationError::UnreadableContent {
                message: err.to_string(),
            }
        })?;
        let text = text.trim();
        let address = MailAddress::parse(text)
            .map_err(|err| DataValidationError::invalid_mail_address(text, err))?;

        Ok(SubmissionAddressResponse { method, address })
    }

    /// Fetch and parse the policy file of `domain`.
    ///
    /// Lines that cannot be applied are reported in
    /// [`PolicyResponse::parsing_errors`]; they never fail the lookup.
    pub async fn get_policy_flags(&self, domain: &str) -> Result<PolicyResponse> {
        self.get_policy_flags_with(domain, &RequestOptions::default())
            .await
    }

    /// [`WkdClient::get_policy_flags`] with per-call options.
    pub async fn get_policy_flags_with(
        &self,
        domain: &str,
        options: &RequestOptions,
    ) -> Result<PolicyResponse> {
        let domain = required_domain(domain)?;
        let candidates = uri::policy_uris(domain).map_err(invalid_domain(domain))?;

        let Retrieved { method, value } = self.fetch(&candidates, options).await?;

        let (policy, parsing_errors) = parse_policy_reader(&value[..]).map_err(|err| {
            DataValidationError::UnreadableContent {
                message: err.to_string(),
            }
        })?;

        if !parsing_errors.is_empty() {
            wkd_log!(
                debug,
                "Policy file of {domain} has {} malformed lines",
                parsing_errors.len()
            );
        }

        Ok(PolicyResponse {
            method,
            policy,
            parsing_errors,
        })
    }

    /// Discover the keys published for `address`.
    ///
    /// Keys refused by the validator chain are listed in
    /// [`DiscoveryResponse::rejected_keys`]; a response without accepted keys
    /// is still a success.
    pub async fn discover_key(&self, address: &MailAddress) -> Result<DiscoveryResponse<P::Key>> {
        self.discover_key_with(address, &RequestOptions::default())
            .await
    }

    /// [`WkdClient::discover_key`] with per-call options.
    pub async fn discover_key_with(
        &self,
        address: &MailAddress,
        options: &RequestOptions,
    ) -> Result<DiscoveryResponse<P::Key>> {
        let candidates = uri::key_discovery_uris(address).map_err(invalid_domain(address.host()))?;

        let Retrieved { method, value } = self.fetch(&candidates, options).await?;

        let keys = self.parser.parse(&value)?;
        let context = DiscoveryContext::new(address.clone());
        let outcome = self.validator.validate_keys(&context, keys);

        for rejected in &outcome.rejected {
            wkd_log!(
                debug,
                "Rejected key {} for {address}: {}",
                rejected.key.fingerprint(),
                rejected.reason
            );
        }

        Ok(DiscoveryResponse {
            method,
            keys: outcome.accepted,
            rejected_keys: outcome.rejected,
        })
    }

    /// Parse `address` and discover its keys.
    ///
    /// An unparseable address fails the lookup with a single
    /// [`DataValidationError::InvalidMailAddress`], before any request.
    pub async fn discover_key_str(&self, address: &str) -> Result<DiscoveryResponse<P::Key>> {
        self.discover_key_str_with(address, &RequestOptions::default())
            .await
    }

    /// [`WkdClient::discover_key_str`] with per-call options.
    pub async fn discover_key_str_with(
        &self,
        address: &str,
        options: &RequestOptions,
    ) -> Result<DiscoveryResponse<P::Key>> {
        if address.trim().is_empty() {
            return Err(Error::invalid_input("the mail address must not be empty"));
        }

        let address = MailAddress::parse(address)
            .map_err(|err| DataValidationError::invalid_mail_address(address, err))?;

        self.discover_key_with(&address, options).await
    }

    async fn fetch(
        &self,
        candidates: &[UriCandidate],
        options: &RequestOptions,
    ) -> Result<Retrieved<bytes::Bytes>> {
        Ok(fetch(self.transport.as_ref(), candidates, options, self.request_timeout).await?)
    }
}

impl<P: KeyParser> Clone for WkdClient<P> {
    fn clone(&self) -> Self {
        Self {
            parser: Arc::clone(&self.parser),
            transport: Arc::clone(&self.transport),
            validator: self.validator.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

impl<P: KeyParser> fmt::Debug for WkdClient<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WkdClient")
            .field("transport", &self.transport)
            .field("validator", &self.validator)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

fn required_domain(domain: &str) -> Result<&str> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(Error::invalid_input("the domain must not be empty"));
    }
    // Same host alphabet as mail addresses; non-ASCII is left to IDNA.
    if let Some(c) = domain
        .chars()
        .find(|c| c.is_ascii() && !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.'))
    {
        return Err(Error::invalid_input(format!(
            "invalid character {c:?} in domain {domain}"
        )));
    }
    Ok(domain)
}

fn invalid_domain(domain: &str) -> impl FnOnce(url::ParseError) -> Error + '_ {
    move |err| Error::invalid_input(format!("invalid domain {domain}: {err}"))
}
