//! Asset cache manager
//!
//! The service-worker side of the dashboard: installs a versioned copy of the
//! static assets, removes older generations on activation, and decides per
//! request class whether a fetch is answered network-first, filled into the
//! cache in the background, or left alone.

pub mod manager;
pub mod policy;

pub use manager::{
    ActivateReport, AssetCacheManager, AssetFailure, Dispatched, FetchOutcome, InstallReport,
    WorkerState,
};
pub use policy::RequestClass;
