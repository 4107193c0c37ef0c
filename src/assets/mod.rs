//! Frame acquisition: fetch/decode plumbing and the progressive sequence loader.

/// Fetcher contract plus the HTTP/filesystem and in-memory implementations.
pub mod fetch;
/// Progressive, staleness-guarded loader for an ordered frame sequence.
pub mod sequence;
