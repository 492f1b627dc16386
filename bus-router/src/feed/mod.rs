//! Remote trip dataset.
//!
//! The trip dataset is too large to ship with the app, so it is published
//! as chunks: one JSON file per trip-id prefix. This module provides the
//! `TripSource` abstraction over where chunks come from, an HTTP client for
//! the real endpoint, and a mock for development and tests.

mod client;
mod convert;
mod error;
mod mock;
mod types;

use std::future::Future;

pub use client::{FeedClient, FeedConfig};
pub use convert::{
    ConversionError, StopTripIndex, TripChunk, convert_chunk, convert_stop_index, convert_trip,
};
pub use error::FetchError;
pub use mock::MockTripSource;
pub use types::{RawChunk, RawScalar, RawStopIndex, RawStopTime, RawTrip};

/// Source of trip chunks.
///
/// This abstraction allows the cache and resolver to be tested with mock data.
pub trait TripSource: Send + Sync + 'static {
    /// Fetch the chunk holding every trip whose id starts with `prefix`.
    fn fetch_chunk(
        &self,
        prefix: &str,
    ) -> impl Future<Output = Result<TripChunk, FetchError>> + Send;

    /// Fetch the precomputed stop → trips index published with the dataset.
    fn fetch_stop_index(&self) -> impl Future<Output = Result<StopTripIndex, FetchError>> + Send;
}
