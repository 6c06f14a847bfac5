//! Hook registration with the RTWire API.

use rtwire::{Error, RtwireClient};

/// Outcome of [`register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The hook was created by this call.
    Created,
    /// The service already knew the URL.
    AlreadyRegistered,
}

/// Registers `url` as a hook, treating an existing registration as success.
///
/// # Errors
///
/// Returns any error other than [`Error::HookExists`].
pub async fn register<C: RtwireClient>(client: &C, url: &str) -> Result<Registration, Error> {
    match client.create_hook(url).await {
        Ok(()) => {
            tracing::info!(%url, "registered hook");
            Ok(Registration::Created)
        }
        Err(Error::HookExists) => {
            tracing::info!(%url, "hook already registered");
            Ok(Registration::AlreadyRegistered)
        }
        Err(err) => Err(err),
    }
}

/// Removes the hook for `url`.
///
/// # Errors
///
/// Returns the API error if the hook could not be deleted.
pub async fn unregister<C: RtwireClient>(client: &C, url: &str) -> Result<(), Error> {
    client.delete_hook(url).await?;
    tracing::info!(%url, "unregistered hook");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rtwire::Network;
    use rtwire_http::{ClientConfig, HttpClient};
    use rtwire_mock::{Credentials, MockService, mock_router};

    use super::*;

    async fn client() -> HttpClient {
        let service = Arc::new(MockService::new(
            Network::Mainnet,
            Credentials::new("user", "pass"),
        ));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, mock_router(service)).await.unwrap();
        });
        HttpClient::new(ClientConfig::new(
            format!("http://{addr}/v1/mainnet"),
            "user",
            "pass",
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let client = client().await;
        let url = "https://example.com/hook";
        assert_eq!(register(&client, url).await.unwrap(), Registration::Created);
        assert_eq!(
            register(&client, url).await.unwrap(),
            Registration::AlreadyRegistered
        );
        assert_eq!(client.hooks().await.unwrap().len(), 1);

        unregister(&client, url).await.unwrap();
        assert!(client.hooks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unregister_twice_succeeds() {
        let client = client().await;
        let url = "https://example.com/hook";
        register(&client, url).await.unwrap();
        unregister(&client, url).await.unwrap();
        unregister(&client, url).await.unwrap();
        unregister(&client, "https://nowhere").await.unwrap();
        assert!(client.hooks().await.unwrap().is_empty());
    }
}
