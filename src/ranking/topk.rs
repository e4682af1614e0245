//! Partial ranking of scored items.
//!
//! Keeps a bounded min-heap of the best `k` candidates seen so far, so
//! selection is O(N log K). Equal scores keep first-encountered order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

struct Candidate<T> {
    score: f64,
    seq: usize,
    item: T,
}

impl<T> Candidate<T> {
    // Higher score ranks first; on a tie the earlier item ranks first.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialEq for Candidate<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rank_cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Candidate<T> {}

impl<T> PartialOrd for Candidate<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Candidate<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank_cmp(other)
    }
}

/// Return the `min(k, n)` highest-scoring items, best first.
///
/// Ties are broken by input order. `NaN` scores rank below every number.
pub fn top_k<T, I>(items: I, k: usize) -> Vec<(T, f64)>
where
    I: IntoIterator<Item = (T, f64)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Candidate<T>>> = BinaryHeap::new();
    for (seq, (item, score)) in items.into_iter().enumerate() {
        // NaN would otherwise sort above +inf under total_cmp.
        let score = if score.is_nan() { f64::NEG_INFINITY } else { score };
        let candidate = Candidate { score, seq, item };

        if heap.len() < k {
            heap.push(Reverse(candidate));
            continue;
        }
        let beats_worst = heap
            .peek()
            .is_some_and(|Reverse(worst)| candidate > *worst);
        if beats_worst {
            heap.pop();
            heap.push(Reverse(candidate));
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(candidate)| (candidate.item, candidate.score))
        .collect()
}

/// Like [`top_k`] but scores each item with `score_fn`.
pub fn top_k_by<T, I, F>(items: I, k: usize, mut score_fn: F) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> f64,
{
    top_k(
        items.into_iter().map(|item| {
            let score = score_fn(&item);
            (item, score)
        }),
        k,
    )
    .into_iter()
    .map(|(item, _)| item)
    .collect()
}
