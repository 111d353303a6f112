//! Raster overlay provisioning.
//!
//! A [`RasterOverlay`] holds the inputs for one TMS imagery source (base
//! URL, headers, overrides) and provisions itself exactly once: it fetches
//! `tilemapresource.xml`, resolves it through
//! [`crate::capabilities::resolve_capabilities`], and on success hands out a
//! [`TileProvider`]. Any resolution failure yields no provider at all;
//! there is no partial state.
//!
//! Provisioning walks a one-shot state machine:
//!
//! ```text
//! Idle ──► MetadataRequested ──► ProviderReady
//!                            └─► ProvisioningFailed
//! ```
//!
//! Terminal states are final; re-provisioning requires a new overlay.

mod provider;
mod tile;

pub use provider::TileProvider;
pub use tile::{LoadState, RasterOverlayTile, TileError};

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::capabilities::{resolve_capabilities, CapabilitiesError, TileMapServiceOptions};
use crate::fetch::{AssetFetcher, FetchError};

/// Fixed relative path of the TMS capabilities document.
const CAPABILITIES_PATH: &str = "tilemapresource.xml";

/// Errors that leave an overlay without a tile provider.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// The base URL (or a URL derived from it) is not valid.
    #[error("invalid overlay URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// The capabilities document fetch failed in transport.
    #[error("failed to fetch capabilities document: {0}")]
    Fetch(#[from] FetchError),

    /// The capabilities document could not be resolved.
    #[error("failed to resolve capabilities document: {0}")]
    Metadata(#[from] CapabilitiesError),

    /// This overlay instance already ran its one provisioning pass.
    #[error("overlay has already been provisioned")]
    AlreadyProvisioned,
}

/// Provisioning lifecycle of an overlay instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    /// No metadata request has been issued yet.
    Idle,
    /// The one-shot metadata fetch is in flight.
    MetadataRequested,
    /// A tile provider was produced.
    ProviderReady,
    /// Resolution failed; no provider exists.
    ProvisioningFailed,
}

/// Long-lived configuration holder for one TMS imagery source.
///
/// Owns the resolution inputs for its whole lifetime. Provisioning is
/// single-shot per instance; callers must serialize calls to
/// [`RasterOverlay::create_tile_provider`].
pub struct RasterOverlay {
    base_url: Url,
    headers: Vec<(String, String)>,
    options: TileMapServiceOptions,
    state: Mutex<ProvisioningState>,
}

impl RasterOverlay {
    /// Creates an overlay for the TMS endpoint at `url`.
    ///
    /// The URL is normalized to end in a slash so relative tile paths
    /// resolve underneath it, matching common tile-server conventions.
    /// `headers` are sent with the metadata fetch and every tile fetch.
    pub fn new(
        url: &str,
        headers: Vec<(String, String)>,
        options: TileMapServiceOptions,
    ) -> Result<Self, OverlayError> {
        let mut base_url = Url::parse(url).map_err(|e| OverlayError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            headers,
            options,
            state: Mutex::new(ProvisioningState::Idle),
        })
    }

    /// The normalized base URL tile paths resolve against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current provisioning state.
    pub fn state(&self) -> ProvisioningState {
        *self.state.lock()
    }

    /// Runs the single provisioning pass and builds the tile provider.
    ///
    /// Issues exactly one fetch of `tilemapresource.xml` against the base
    /// URL, resolves it, and returns the provider. Every failure is
    /// terminal for this instance: the overlay moves to
    /// `ProvisioningFailed` and stays there. Calling this on an overlay
    /// that already left `Idle` returns
    /// [`OverlayError::AlreadyProvisioned`].
    pub async fn create_tile_provider(
        &self,
        fetcher: Arc<dyn AssetFetcher>,
    ) -> Result<TileProvider, OverlayError> {
        {
            let mut state = self.state.lock();
            if *state != ProvisioningState::Idle {
                return Err(OverlayError::AlreadyProvisioned);
            }
            *state = ProvisioningState::MetadataRequested;
        }

        let result = self.provision(fetcher).await;

        match &result {
            Ok(_) => {
                info!(url = %self.base_url, "raster overlay provisioned");
                *self.state.lock() = ProvisioningState::ProviderReady;
            }
            Err(error) => {
                warn!(url = %self.base_url, %error, "raster overlay provisioning failed");
                *self.state.lock() = ProvisioningState::ProvisioningFailed;
            }
        }

        result
    }

    async fn provision(
        &self,
        fetcher: Arc<dyn AssetFetcher>,
    ) -> Result<TileProvider, OverlayError> {
        let metadata_url =
            self.base_url
                .join(CAPABILITIES_PATH)
                .map_err(|e| OverlayError::InvalidUrl {
                    url: self.base_url.to_string(),
                    message: e.to_string(),
                })?;

        let document = fetcher.fetch(metadata_url, &self.headers).await?;

        let config =
            resolve_capabilities(&document, &self.base_url, &self.headers, &self.options)?;

        Ok(TileProvider::new(Arc::new(config), fetcher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::MockFetcher;

    const DOCUMENT: &str = r#"<?xml version="1.0"?>
<TileMap version="1.0.0">
  <TileFormat width="256" height="256" extension="png"/>
  <TileSets profile="global-mercator">
    <TileSet href="0" order="0"/>
    <TileSet href="3" order="3"/>
  </TileSets>
</TileMap>
"#;

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let overlay =
            RasterOverlay::new("http://host/tiles", Vec::new(), Default::default()).unwrap();
        assert_eq!(overlay.base_url().as_str(), "http://host/tiles/");
    }

    #[test]
    fn test_base_url_with_trailing_slash_unchanged() {
        let overlay =
            RasterOverlay::new("http://host/tiles/", Vec::new(), Default::default()).unwrap();
        assert_eq!(overlay.base_url().as_str(), "http://host/tiles/");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = RasterOverlay::new("not a url", Vec::new(), Default::default());
        assert!(matches!(result, Err(OverlayError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_provisioning_fetches_capabilities_document() {
        let fetcher = Arc::new(MockFetcher::ok(DOCUMENT.as_bytes()));
        let overlay =
            RasterOverlay::new("http://host/tiles", Vec::new(), Default::default()).unwrap();

        let provider = overlay
            .create_tile_provider(Arc::clone(&fetcher) as Arc<dyn AssetFetcher>)
            .await
            .unwrap();

        assert_eq!(
            fetcher.requested_urls.lock().as_slice(),
            &["http://host/tiles/tilemapresource.xml".to_string()]
        );
        assert_eq!(provider.maximum_level(), 3);
        assert_eq!(overlay.state(), ProvisioningState::ProviderReady);
    }

    #[tokio::test]
    async fn test_malformed_document_fails_provisioning() {
        let fetcher = Arc::new(MockFetcher::ok(b"<html>not a capabilities doc"));
        let overlay =
            RasterOverlay::new("http://host/tiles", Vec::new(), Default::default()).unwrap();

        let result = overlay
            .create_tile_provider(Arc::clone(&fetcher) as Arc<dyn AssetFetcher>)
            .await;

        assert!(matches!(result, Err(OverlayError::Metadata(_))));
        assert_eq!(overlay.state(), ProvisioningState::ProvisioningFailed);
        // Only the metadata fetch was ever issued.
        assert_eq!(fetcher.requested_urls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_fails_provisioning() {
        let fetcher = Arc::new(MockFetcher::failing(FetchError::Transport {
            url: "http://host/tiles/tilemapresource.xml".to_string(),
            message: "connection refused".to_string(),
        }));
        let overlay =
            RasterOverlay::new("http://host/tiles", Vec::new(), Default::default()).unwrap();

        let result = overlay
            .create_tile_provider(fetcher as Arc<dyn AssetFetcher>)
            .await;

        assert!(matches!(result, Err(OverlayError::Fetch(_))));
        assert_eq!(overlay.state(), ProvisioningState::ProvisioningFailed);
    }

    #[tokio::test]
    async fn test_provisioning_is_single_shot() {
        let fetcher = Arc::new(MockFetcher::ok(DOCUMENT.as_bytes()));
        let overlay =
            RasterOverlay::new("http://host/tiles", Vec::new(), Default::default()).unwrap();

        overlay
            .create_tile_provider(Arc::clone(&fetcher) as Arc<dyn AssetFetcher>)
            .await
            .unwrap();

        let second = overlay
            .create_tile_provider(Arc::clone(&fetcher) as Arc<dyn AssetFetcher>)
            .await;
        assert!(matches!(second, Err(OverlayError::AlreadyProvisioned)));
        // No second metadata fetch was issued.
        assert_eq!(fetcher.requested_urls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_overlay_stays_failed() {
        let fetcher = Arc::new(MockFetcher::ok(b"garbage"));
        let overlay =
            RasterOverlay::new("http://host/tiles", Vec::new(), Default::default()).unwrap();

        let first = overlay
            .create_tile_provider(Arc::clone(&fetcher) as Arc<dyn AssetFetcher>)
            .await;
        assert!(first.is_err());

        let second = overlay
            .create_tile_provider(Arc::clone(&fetcher) as Arc<dyn AssetFetcher>)
            .await;
        assert!(matches!(second, Err(OverlayError::AlreadyProvisioned)));
    }

    #[tokio::test]
    async fn test_headers_sent_with_metadata_fetch() {
        // MockFetcher ignores headers, so assert through the resolved
        // configuration which must carry them for tile fetches.
        let fetcher = Arc::new(MockFetcher::ok(DOCUMENT.as_bytes()));
        let headers = vec![("Authorization".to_string(), "Bearer t".to_string())];
        let overlay =
            RasterOverlay::new("http://host/tiles", headers.clone(), Default::default()).unwrap();

        let provider = overlay
            .create_tile_provider(fetcher as Arc<dyn AssetFetcher>)
            .await
            .unwrap();
        assert_eq!(provider.configuration().headers, headers);
    }
}
