// Site directory
//
// The list of testbed sites is public and effectively static. It is
// fetched without credentials at most once per API base URL and
// `SiteDirectory`; build one at startup and hand it by reference to
// whatever needs site data.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, trace};
use url::Url;

use crate::client::Api;
use crate::error::Error;
use crate::request::{ApiRequest, Verb};
use crate::response;
use crate::transport::{HttpRequest, Transport};

/// Memoizes the unauthenticated site directory for the process lifetime.
///
/// The lock is held across the fetch, so concurrent first callers wait for
/// one request instead of racing. Entries are keyed by base URL and never
/// invalidated.
#[derive(Debug, Default)]
pub struct SiteDirectory {
    entries: Mutex<HashMap<String, Value>>,
}

impl SiteDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// `GET experiments?sites`, unauthenticated, cached after the first
    /// success. Failures are not cached.
    pub async fn sites<T: Transport>(&self, transport: &T, base_url: &Url) -> Result<Value, Error> {
        let mut entries = self.entries.lock().await;
        if let Some(cached) = entries.get(base_url.as_str()) {
            trace!(%base_url, "site directory cache hit");
            return Ok(cached.clone());
        }

        let url = ApiRequest::get("experiments").flag("sites").url(base_url)?;
        debug!(%url, "fetching site directory");
        let raw = transport
            .execute(HttpRequest {
                url,
                verb: Verb::Get,
                credentials: None,
            })
            .await?;
        let sites = response::interpret_json(raw)?;

        entries.insert(base_url.to_string(), sites.clone());
        Ok(sites)
    }

    /// Site names from `items[].site`, in service order.
    pub async fn site_names<T: Transport>(
        &self,
        transport: &T,
        base_url: &Url,
    ) -> Result<Vec<String>, Error> {
        let sites = self.sites(transport, base_url).await?;
        Ok(site_names(&sites))
    }

    /// Whether the directory for `base_url` has been fetched already.
    pub async fn is_cached(&self, base_url: &Url) -> bool {
        self.entries.lock().await.contains_key(base_url.as_str())
    }
}

/// Extract `items[].site` from a site directory document.
pub fn site_names(sites: &Value) -> Vec<String> {
    sites
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("site").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

impl<T: Transport> Api<T> {
    /// Site directory through `directory`, using this client's transport
    /// and base URL but not its credentials.
    pub async fn sites(&self, directory: &SiteDirectory) -> Result<Value, Error> {
        directory.sites(self.transport(), self.base_url()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::testing::{MockTransport, api};
    use crate::transport::RawResponse;

    const SITES: &str = r#"{"items": [{"site": "grenoble"}, {"site": "strasbourg"}]}"#;

    #[tokio::test]
    async fn second_lookup_is_a_cache_hit() {
        let api = api(MockTransport::ok(SITES));
        let directory = SiteDirectory::new();
        assert!(!directory.is_cached(api.base_url()).await);

        let first = api.sites(&directory).await.unwrap();
        let second = api.sites(&directory).await.unwrap();

        assert_eq!(first, second);
        assert!(directory.is_cached(api.base_url()).await);
        let calls = api.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://www.iot-lab.info/rest/experiments?sites");
        assert_eq!(calls[0].username, None, "site directory must be fetched anonymously");
    }

    #[tokio::test]
    async fn cache_is_shared_across_clients() {
        let directory = SiteDirectory::new();
        let first = api(MockTransport::ok(SITES));
        let second = api(MockTransport::default());

        let names = directory
            .site_names(first.transport(), first.base_url())
            .await
            .unwrap();
        let again = second.sites(&directory).await.unwrap();

        assert_eq!(names, ["grenoble", "strasbourg"]);
        assert_eq!(site_names(&again), names);
        assert!(second.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let api = api(MockTransport::new([
            RawResponse::new(500, "boom"),
            RawResponse::new(200, SITES),
        ]));
        let directory = SiteDirectory::new();

        assert!(matches!(
            api.sites(&directory).await,
            Err(Error::Http { status: 500, .. })
        ));
        assert!(!directory.is_cached(api.base_url()).await);
        assert!(api.sites(&directory).await.is_ok());
        assert_eq!(api.transport().calls().len(), 2);
    }

    #[tokio::test]
    async fn each_base_url_has_its_own_entry() {
        let directory = SiteDirectory::new();
        let transport = MockTransport::new([
            RawResponse::new(200, SITES),
            RawResponse::new(200, r#"{"items": [{"site": "saclay"}]}"#),
        ]);
        let prod = Url::parse("https://www.iot-lab.info/rest/").unwrap();
        let dev = Url::parse("https://devwww.iot-lab.info/rest/").unwrap();

        let prod_names = directory.site_names(&transport, &prod).await.unwrap();
        let dev_names = directory.site_names(&transport, &dev).await.unwrap();

        assert_eq!(prod_names, ["grenoble", "strasbourg"]);
        assert_eq!(dev_names, ["saclay"]);
        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].url, "https://devwww.iot-lab.info/rest/experiments?sites");
    }

    /// Counts round trips and answers slowly enough for callers to overlap.
    #[derive(Debug, Default)]
    struct SlowTransport {
        fetches: AtomicUsize,
    }

    impl Transport for SlowTransport {
        async fn execute(&self, _request: HttpRequest<'_>) -> Result<RawResponse, Error> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(RawResponse::new(200, SITES))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_lookups_fetch_once() {
        let directory = SiteDirectory::new();
        let transport = SlowTransport::default();
        let base = Url::parse("https://www.iot-lab.info/rest/").unwrap();

        let (a, b, c) = tokio::join!(
            directory.sites(&transport, &base),
            directory.sites(&transport, &base),
            directory.sites(&transport, &base),
        );

        assert_eq!(transport.fetches.load(Ordering::SeqCst), 1);
        let a = a.unwrap();
        assert_eq!(b.unwrap(), a);
        assert_eq!(c.unwrap(), a);
    }

    #[test]
    fn site_names_tolerates_unexpected_shapes() {
        assert!(site_names(&json!({})).is_empty());
        assert_eq!(site_names(&json!({"items": [{"site": "lille"}, {"x": 1}]})), ["lille"]);
    }
}
