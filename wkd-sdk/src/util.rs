use reqwest::Response;

use crate::transport::TransportError;

/// Convert non-2xx responses into a [`TransportError::Status`] that carries the server body.
///
/// If the status is successful (2xx), the original response is returned.
/// Otherwise the response body is consumed to build the error message.
pub(crate) async fn check_http_status(
    response: Response,
) -> std::result::Result<Response, TransportError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let message = response.text().await.unwrap_or_else(|_| {
        status
            .canonical_reason()
            .unwrap_or("Unknown Error")
            .to_string()
    });

    Err(TransportError::Status { status, message })
}
