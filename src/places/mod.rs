//! Nearby-search diagnostics for the places API used by issue geotagging.

pub mod client;
pub mod report;

pub use client::{
    Location, NearbyResponse, NearbySearch, Place, PlacesClient, PlacesError, SearchOutcome,
};
pub use report::{failure_report, key_preview, summary, ApiStatus, Line, Stream, Verdict};
