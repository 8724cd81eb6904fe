//! Outbound adapters implementing the domain ports.

pub mod catalog;
pub mod memory;
pub mod org_file;

pub use catalog::HttpCatalogClient;
pub use memory::InMemoryUserStore;
pub use org_file::FlatFileOrgStore;
