//! Label assignment, cluster id remapping, and the empty-exemplar fallback.

use tracing::warn;

use crate::matrix::SquareMatrix;

/// Final item-to-cluster mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Members per cluster id, each list ascending.
    pub clusters: Vec<Vec<usize>>,
    /// Exemplar item index per cluster id.
    pub exemplars: Vec<usize>,
    /// Cluster id per item.
    pub labels: Vec<usize>,
    /// True when no exemplar emerged and every item was put in one cluster.
    pub fallback: bool,
}

/// Assign every item of `s` to an exemplar.
///
/// Every item, exemplars included, goes to the exemplar `e` maximising
/// `S[i][e]`, the smallest index winning ties. An exemplar whose own
/// preference is below its similarity to another exemplar therefore joins
/// that exemplar. Exemplars chosen by at least one item are renumbered `0..k`
/// in ascending index order; the rest are dropped, so `k` may be smaller than
/// the number of raw exemplars. An empty `exemplars` slice yields
/// [`fallback`] for `s.n()` items.
pub fn assign(s: &SquareMatrix, exemplars: &[usize]) -> Assignment {
    let n = s.n();
    if exemplars.is_empty() {
        return fallback(n);
    }

    let mut sorted = exemplars.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let chosen: Vec<usize> = (0..n)
        .map(|i| {
            let mut best = sorted[0];
            for &e in &sorted[1..] {
                if s[(i, e)] > s[(i, best)] {
                    best = e;
                }
            }
            best
        })
        .collect();

    // Drop exemplars nobody chose.
    let mut used = sorted;
    used.retain(|e| chosen.contains(e));

    let mut clusters = vec![Vec::new(); used.len()];
    let mut labels = Vec::with_capacity(n);
    for (i, e) in chosen.iter().enumerate() {
        // `used` is sorted and contains every chosen exemplar.
        let id = used.binary_search(e).unwrap_or_default();
        clusters[id].push(i);
        labels.push(id);
    }

    Assignment {
        clusters,
        exemplars: used,
        labels,
        fallback: false,
    }
}

/// Degenerate result: one cluster holding every item in input order.
///
/// Item 0 stands in as the exemplar. Zero items produce zero clusters.
pub fn fallback(n: usize) -> Assignment {
    if n == 0 {
        return Assignment {
            clusters: Vec::new(),
            exemplars: Vec::new(),
            labels: Vec::new(),
            fallback: false,
        };
    }
    warn!(items = n, "No exemplar emerged; collapsing all items into one cluster");
    Assignment {
        clusters: vec![(0..n).collect()],
        exemplars: vec![0],
        labels: vec![0; n],
        fallback: true,
    }
}
