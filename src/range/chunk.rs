use std::collections::BTreeSet;

use log::warn;

/// A contiguous, inclusive sub-range of the input handled by one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// First value of the chunk.
    pub start: u64,
    /// Last value of the chunk (inclusive).
    pub end: u64,
}

impl Chunk {
    /// Iterates over every value in the chunk.
    pub fn values(self) -> impl Iterator<Item = u64> {
        self.start..=self.end
    }

    /// Returns `true` if `value` falls inside the chunk.
    pub fn contains(&self, value: u64) -> bool {
        self.start <= value && value <= self.end
    }
}

/// Splits `[1, max]` into at most `count` contiguous, non-empty chunks in
/// ascending order. Chunk lengths differ by at most one.
pub fn partition(max: u64, count: usize) -> Vec<Chunk> {
    if max == 0 || count == 0 {
        return Vec::new();
    }

    let count = (count as u64).min(max);
    let base = max / count;
    let extra = max % count;

    let mut start = 1;
    (0..count)
        .map(|i| {
            let len = base + u64::from(i < extra);
            let chunk = Chunk {
                start,
                end: start + len - 1,
            };
            start += len;
            chunk
        })
        .collect()
}

/// Concatenates per-chunk matches in chunk order.
///
/// Each partial is ascending and chunks are disjoint and ordered, so the
/// concatenation is already sorted. A missing partial means the job for that
/// chunk failed; it contributes nothing.
pub(crate) fn merge(chunks: &[Chunk], partials: Vec<Option<Vec<u64>>>) -> BTreeSet<u64> {
    let mut merged = Vec::with_capacity(partials.iter().flatten().map(Vec::len).sum());
    for (chunk, partial) in chunks.iter().zip(partials) {
        match partial {
            Some(found) => merged.extend(found),
            None => warn!(
                "No result for chunk {}..={}, treating it as empty",
                chunk.start, chunk.end
            ),
        }
    }

    debug_assert!(merged.windows(2).all(|pair| pair[0] < pair[1]));
    merged.into_iter().collect()
}
