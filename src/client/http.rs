use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use super::{ClientError, ResourceClient};
use crate::resource::RemoteResource;

/// JSON-over-HTTP resource endpoint.
///
/// `POST {base}/{collection}` creates, `GET|PATCH|DELETE
/// {base}/{collection}/{id}` read, update and delete. A 404 is an explicit
/// absence. Side actions are `POST`s to `{collection}/{action}` or
/// `{collection}/{id}/{action}`.
#[derive(Clone)]
pub struct HttpResourceClient {
    client: reqwest::Client,
    base_url: String,
    collection: String,
}

impl HttpResourceClient {
    pub fn new(
        base_url: impl Into<String>,
        collection: impl Into<String>,
        token: Option<&str>,
    ) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let auth_value = format!("Bearer {}", token);
            let header_value =
                HeaderValue::from_str(&auth_value).map_err(|_| ClientError::Auth {
                    message: "Invalid token format".to_string(),
                })?;
            headers.insert(AUTHORIZATION, header_value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.base_url
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.collection)
    }

    // NOTE: ARNs carry ':' and '/', so the id is always percent-encoded
    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), urlencoding::encode(id))
    }

    async fn parse_resource(response: reqwest::Response) -> Result<RemoteResource, ClientError> {
        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| ClientError::InvalidResponse {
                    message: format!("Failed to parse response: {}", e),
                })?;

        let resource: RemoteResource =
            serde_json::from_value(body).map_err(|e| ClientError::InvalidResponse {
                message: format!("Failed to parse resource: {}", e),
            })?;

        if resource.id.is_empty() {
            return Err(ClientError::InvalidResponse {
                message: "empty resource id".to_string(),
            });
        }

        Ok(resource)
    }

    async fn error_from(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(|m| m.as_str())
                    .map(|m| m.to_string())
            })
            .unwrap_or_else(|| "Unknown error".to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Auth { message },
            _ => ClientError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn create(&self, body: &serde_json::Value) -> Result<RemoteResource, ClientError> {
        let response = self
            .client
            .post(self.collection_url())
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Self::parse_resource(response).await
    }

    async fn read(&self, id: &str) -> Result<Option<RemoteResource>, ClientError> {
        let response = self.client.get(self.item_url(id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Self::parse_resource(response).await.map(Some)
    }

    async fn update(
        &self,
        id: &str,
        body: &serde_json::Value,
    ) -> Result<RemoteResource, ClientError> {
        let response = self
            .client
            .patch(self.item_url(id))
            .json(body)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound { id: id.to_string() });
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Self::parse_resource(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let response = self.client.delete(self.item_url(id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound { id: id.to_string() });
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(())
    }

    async fn invoke(
        &self,
        id: Option<&str>,
        action: &str,
        body: &serde_json::Value,
    ) -> Result<(), ClientError> {
        let url = match id {
            Some(id) => format!("{}/{}", self.item_url(id), action),
            None => format!("{}/{}", self.collection_url(), action),
        };
        let response = self.client.post(url).json(body).send().await?;

        match id {
            Some(id) if response.status() == StatusCode::NOT_FOUND => {
                Err(ClientError::NotFound { id: id.to_string() })
            }
            _ if !response.status().is_success() => Err(Self::error_from(response).await),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for HttpResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResourceClient")
            .field("base_url", &self.base_url)
            .field("collection", &self.collection)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpResourceClient::new("http://localhost:8080", "layers", Some("token"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_creation_without_token() {
        let client = HttpResourceClient::new("http://localhost:8080", "layers", None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let result = HttpResourceClient::new("http://localhost", "layers", Some("bad\ntoken"));
        assert!(matches!(result, Err(ClientError::Auth { .. })));
    }

    #[test]
    fn test_debug_does_not_expose_token() {
        let client = HttpResourceClient::new(
            "http://localhost",
            "integrations",
            Some("super_secret_token_12345"),
        )
        .unwrap();
        let debug_output = format!("{:?}", client);

        assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
        assert!(
            !debug_output.contains("super_secret_token_12345"),
            "Debug output must NOT contain the actual token"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = HttpResourceClient::new("http://localhost:8080/", "layers", None).unwrap();
        assert_eq!(client.api_base(), "http://localhost:8080");
        assert_eq!(client.collection(), "layers");
    }

    #[test]
    fn test_item_url_percent_encodes_arn() {
        let client = HttpResourceClient::new("http://localhost", "integrations", None).unwrap();
        assert_eq!(
            client.item_url("arn:aws:redshift:us-east-1:123456789012:integration:abc/def"),
            "http://localhost/integrations/arn%3Aaws%3Aredshift%3Aus-east-1%3A123456789012%3Aintegration%3Aabc%2Fdef"
        );
    }
}
