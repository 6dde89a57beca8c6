//! Billcheck: provider catalog, bill acquisition contract, and check orchestration.

pub mod acquisition;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod mock;
pub mod orchestrator;
pub mod storage;
pub mod types;

pub use acquisition::{AcquisitionAdapter, AdapterRegistry};
pub use catalog::ProviderCatalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CatalogError, CheckError, FieldError, StoreError, ValidationError};
pub use orchestrator::{BillCheckOrchestrator, CheckRequest, CheckResponse};
pub use storage::{MemoryStore, RecordStore};
pub use types::*;
