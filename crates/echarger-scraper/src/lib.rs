pub mod client;
pub mod error;
pub mod import;
pub mod normalize;
pub(crate) mod rate_limit;
pub mod sweep;
pub mod types;

pub use client::OcmClient;
pub use error::ScraperError;
pub use import::{plan_segment_import, SegmentImport};
pub use normalize::{connector_types, max_power_kw, normalize_poi};
pub use sweep::{sweep_segments, SegmentOutcome, SweepReport, SweepSettings};
pub use types::{OcmAddressInfo, OcmConnection, OcmOperatorInfo, OcmPoi};
