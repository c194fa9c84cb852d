//! Local reorder engine.
//!
//! Pure functions from a track list to a new track list of the same length and
//! the same multiset of tracks. Sorting is stable in both directions: tracks with
//! equal keys keep their original relative order, so sorting an already sorted
//! list is a no-op.

use rand::{Rng, seq::SliceRandom};

use crate::{
    policy::{Policy, SortOrder},
    types::Track,
};

/// Reorders `tracks` according to `policy`, using the thread RNG for shuffling.
pub fn reorder(tracks: Vec<Track>, policy: Policy, order: SortOrder) -> Vec<Track> {
    reorder_with_rng(tracks, policy, order, &mut rand::rng())
}

/// Same as [`reorder`] with an explicit randomness source for [`Policy::Shuffle`].
pub fn reorder_with_rng<R: Rng + ?Sized>(
    mut tracks: Vec<Track>,
    policy: Policy,
    order: SortOrder,
    rng: &mut R,
) -> Vec<Track> {
    match policy {
        Policy::Nop => {}
        Policy::Shuffle => tracks.shuffle(rng),
        _ => {
            // `sort_by` is stable; flipping the comparison instead of reversing
            // the result keeps ties in input order for descending sorts too.
            tracks.sort_by(|a, b| {
                let ordering = policy
                    .compare(a, b)
                    .unwrap_or(std::cmp::Ordering::Equal);
                if order.is_ascending() {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
    }
    tracks
}
