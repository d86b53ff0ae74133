//! Client for the hosted PostgREST-style tabular endpoint

pub mod envelope;
pub mod filter;
pub mod table;
pub mod transport;

#[cfg(test)]
pub(crate) mod memory;

use std::sync::Arc;

use crate::{config::RemoteConfig, error::StoreResult};

pub use envelope::Envelope;
pub use filter::FilterOperator;
pub use table::TableHandle;
pub use transport::{CountMode, HttpTransport, Transport};

/// Entry point handing out table handles over a shared transport
#[derive(Clone)]
pub struct RemoteStore {
    transport: Arc<dyn Transport>,
}

impl RemoteStore {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Build a store talking HTTP to the configured endpoint
    pub fn from_config(config: &RemoteConfig) -> StoreResult<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// Fresh handle on `name` with no predicates and `select=*`
    pub fn table(&self, name: &str) -> TableHandle {
        TableHandle::new(self.transport.clone(), name)
    }
}
