mod error;
#[cfg(test)]
pub(crate) mod fake;
mod http;

pub use error::ClientError;
pub use http::HttpResourceClient;

use async_trait::async_trait;

use crate::resource::RemoteResource;
use crate::waiter::Refresh;

/// CRUD surface of a remote service. Request bodies are already mapped to the
/// vendor's field names by the service adapters.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn create(&self, body: &serde_json::Value) -> Result<RemoteResource, ClientError>;

    /// `Ok(None)` when the remote reports no resource for `id`.
    async fn read(&self, id: &str) -> Result<Option<RemoteResource>, ClientError>;

    async fn update(&self, id: &str, body: &serde_json::Value)
    -> Result<RemoteResource, ClientError>;

    /// Absence is reported as [`ClientError::NotFound`].
    async fn delete(&self, id: &str) -> Result<(), ClientError>;

    /// Fire a named side action that is not plain CRUD, such as attaching a
    /// load balancer. `None` targets the collection rather than one item.
    async fn invoke(
        &self,
        id: Option<&str>,
        action: &str,
        body: &serde_json::Value,
    ) -> Result<(), ClientError>;
}

/// Plugs a [`ResourceClient`] into the poller: every refresh is a `read`.
pub struct StatusRefresh<'a, C: ?Sized> {
    client: &'a C,
    id: &'a str,
}

impl<'a, C: ?Sized> StatusRefresh<'a, C> {
    pub fn new(client: &'a C, id: &'a str) -> Self {
        Self { client, id }
    }
}

#[async_trait]
impl<'a, C> Refresh for StatusRefresh<'a, C>
where
    C: ResourceClient + ?Sized,
{
    async fn refresh(&self) -> Result<Option<RemoteResource>, ClientError> {
        self.client.read(self.id).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::fake::FakeClient;
    use super::*;
    use crate::waiter::{PollSpec, poll};

    #[tokio::test(start_paused = true)]
    async fn test_status_refresh_reads_by_id() {
        let client = FakeClient::new();
        client.push_read(Some(RemoteResource::new("int-1", "creating")));
        client.push_read(Some(RemoteResource::new("int-1", "active")));

        let spec = PollSpec::builder()
            .pending(["creating"])
            .target(["active"])
            .interval(Duration::from_secs(1))
            .build();
        let outcome = poll(&spec, &StatusRefresh::new(&client, "int-1")).await;

        assert!(outcome.is_success());
        assert_eq!(client.reads(), vec!["int-1", "int-1"]);
    }

    #[tokio::test]
    async fn test_status_refresh_passes_absence_through() {
        let client = FakeClient::new();
        client.push_read(None);

        let refresh = StatusRefresh::new(&client, "gone");
        assert_eq!(refresh.refresh().await.unwrap(), None);
    }
}
