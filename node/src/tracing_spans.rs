//! Pre-built [`tracing::Span`] constructors for the arbitration path.

use tracing::{info_span, Span};

use crate::chain_update::UpdateSource;

/// Span covering arbitration of one drained batch.
pub fn batch_span(size: usize) -> Span {
    info_span!("update_batch", size = size)
}

/// Span covering the commit sequence of the winning candidate.
pub fn commit_span(height: u64, source: UpdateSource) -> Span {
    info_span!("commit", height = height, source = %source)
}
