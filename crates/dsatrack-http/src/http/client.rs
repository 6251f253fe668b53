//! HTTP client for the tracker API.

use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use dsatrack_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use dsatrack_core::{AccessToken, ApiUrl, Result};

use super::endpoints::ErrorResponse;
use crate::request::AuthRequest;

/// Map a reqwest failure into the transport taxonomy.
pub(crate) fn map_transport(err: reqwest::Error) -> Error {
    let message = err.to_string();
    let err = if err.is_timeout() {
        TransportError::Timeout { message }
    } else if err.is_connect() {
        TransportError::Connection { message }
    } else if err.is_decode() {
        TransportError::Decode { message }
    } else {
        TransportError::Http { message }
    };
    Error::Transport(err)
}

/// HTTP client bound to one API origin.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    api: ApiUrl,
}

impl HttpClient {
    /// Create a new client for the given API origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(api: ApiUrl, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(map_transport)?;

        Ok(Self { client, api })
    }

    /// Returns the API origin this client is configured for.
    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    /// Dispatch a request descriptor, attaching `token` as a bearer credential.
    ///
    /// Without a token the request goes out with no `Authorization` header at
    /// all, even if the caller supplied one. The response is returned
    /// whatever its status.
    #[instrument(skip(self, request, token), fields(method = %request.method(), path = %request.path()))]
    pub async fn dispatch(
        &self,
        request: &AuthRequest,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::Response> {
        let url = self.api.endpoint(request.path());
        debug!(authorized = token.is_some(), "Dispatching request");

        let mut headers = request.headers().clone();
        match token {
            Some(token) => {
                let mut value =
                    HeaderValue::from_str(&token.bearer()).map_err(|e| InvalidInputError::Header {
                        name: AUTHORIZATION.to_string(),
                        reason: e.to_string(),
                    })?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            None => {
                headers.remove(AUTHORIZATION);
            }
        }

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .headers(headers);
        if let Some(body) = request.body_bytes() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().await.map_err(map_transport)?;
        trace!(status = %response.status(), "Response received");

        Ok(response)
    }

    /// Make an unauthenticated JSON POST and decode the success body.
    #[instrument(skip(self, body), fields(api = %self.api))]
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.api.endpoint(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;

        Self::handle_response(response).await
    }

    /// Make an unauthenticated JSON POST and return the raw response.
    pub async fn post_raw<B>(&self, path: &str, body: &B) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.api.endpoint(path);
        debug!(%url, "POST");

        self.client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_transport)
    }

    /// Make an unauthenticated GET against a full URL and decode the body.
    #[instrument(skip(self), fields(api = %self.api))]
    pub async fn get_json<R: DeserializeOwned>(&self, url: &str) -> Result<R> {
        debug!(%url, "GET");

        let response = self.client.get(url).send().await.map_err(map_transport)?;

        Self::handle_response(response).await
    }

    /// Decode a success body, or turn a non-2xx response into a protocol error.
    pub async fn handle_response<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
        let status = response.status();
        trace!(status = %status, "API response");

        if status.is_success() {
            response.json::<R>().await.map_err(map_transport)
        } else {
            Err(Error::Protocol(Self::parse_error_response(response).await))
        }
    }

    /// Parse an error response, keeping the server's message when there is one.
    pub async fn parse_error_response(response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(body) => ProtocolError::new(status, body.message()),
            Err(_) => ProtocolError::new(status, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let api = ApiUrl::new("https://api.example.com").unwrap();
        let client = HttpClient::new(api.clone(), "dsatrack-test").unwrap();
        assert_eq!(client.api().as_str(), api.as_str());
    }
}
