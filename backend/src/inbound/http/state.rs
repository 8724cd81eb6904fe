//! Shared HTTP adapter state.
//!
//! Handlers receive this state via `actix_web::web::Data` so they depend
//! only on domain ports and remain testable without real I/O.

use std::sync::Arc;

use crate::domain::ports::{CatalogClient, OrgFileStore, UserStore};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserStore>,
    pub org_file: Arc<dyn OrgFileStore>,
    pub catalog: Arc<dyn CatalogClient>,
    /// Public URL under which the org file is served; this is the location
    /// registered with the catalog.
    pub org_file_url: String,
}
