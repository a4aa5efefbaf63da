//! IONOS Cloud reconciliation core
//!
//! Shared machinery behind every IONOS product crate: issue a mutating REST
//! call, then poll until the resource converges.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    ionos CLI                     │
//! └─────────────────┬───────────────────────────────┘
//!                   │ ManagedResource
//! ┌─────────────────▼───────────────────────────────┐
//! │  ionos-cloud-monitoring / -objectstorage         │
//! │  (per-product API + readiness checks)            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                  ionos-cloud                     │
//! │  ┌────────────┐ ┌──────────┐ ┌───────────────┐  │
//! │  │ poll_until │ │ Backoff  │ │ OperationCtx  │  │
//! │  └────────────┘ └──────────┘ └───────────────┘  │
//! │  ┌────────────┐ ┌──────────┐ ┌───────────────┐  │
//! │  │ select_one │ │ Endpoint │ │   ApiClient   │  │
//! │  └────────────┘ └──────────┘ └───────────────┘  │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod backoff;
pub mod client;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod lookup;
pub mod poll;
pub mod resource;
pub mod state;

// Re-exports
pub use backoff::{Backoff, BackoffPolicy, DEFAULT_MAX_ELAPSED};
pub use client::{ApiClient, Credentials};
pub use context::{Interrupted, OperationContext};
pub use endpoint::{Endpoint, EndpointTable, GlobalEndpoint, RegionalEndpoints};
pub use error::{CloudError, Result};
pub use lookup::select_one;
pub use poll::{Observed, Progress, gone, poll_until, ready, wait_gone, wait_ready};
pub use resource::{
    DEFAULT_TIMEOUT, ManagedResource, Operation, ResourceRef, ResourceStatus, Timeouts,
};
pub use state::{StateLock, StateManager, TrackedResource, TrackedState};
