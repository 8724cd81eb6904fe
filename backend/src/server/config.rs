//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use url::Url;

/// Default origin allowed to call the API cross-origin (the portal frontend).
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";
/// Default path of the shared org file.
pub const DEFAULT_ORG_FILE: &str = "catalog/org.yaml";
/// Default public URL under which the org file is served.
pub const DEFAULT_ORG_FILE_URL: &str = "http://localhost:7007/api/user-entity/org.yaml";

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) frontend_origin: String,
    pub(crate) org_file: PathBuf,
    pub(crate) org_file_url: String,
    pub(crate) catalog_base: Option<Url>,
}

impl ServerConfig {
    /// Construct a configuration with defaults for everything but the bind
    /// address.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            frontend_origin: DEFAULT_FRONTEND_ORIGIN.to_owned(),
            org_file: PathBuf::from(DEFAULT_ORG_FILE),
            org_file_url: DEFAULT_ORG_FILE_URL.to_owned(),
            catalog_base: None,
        }
    }

    /// Override the frontend origin allowed by CORS.
    #[must_use]
    pub fn with_frontend_origin(mut self, origin: impl Into<String>) -> Self {
        self.frontend_origin = origin.into();
        self
    }

    /// Override the org file path.
    #[must_use]
    pub fn with_org_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.org_file = path.into();
        self
    }

    /// Override the public URL registered with the catalog.
    #[must_use]
    pub fn with_org_file_url(mut self, url: impl Into<String>) -> Self {
        self.org_file_url = url.into();
        self
    }

    /// Attach a catalog base URL.
    ///
    /// Without one, registration calls run against a no-op fixture client.
    #[must_use]
    pub fn with_catalog_base(mut self, base: Url) -> Self {
        self.catalog_base = Some(base);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
