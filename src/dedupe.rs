//! First-seen-wins deduplication of stored records

use std::collections::HashSet;
use std::hash::Hash;

/// Collapses records sharing a key, keeping the earliest occurrence
///
/// Order of kept records is preserved. Records whose key is `None` cannot
/// take part in identity and are dropped; callers that need to know how
/// many were dropped compare input and output lengths.
pub fn dedupe<R, K, F>(records: impl IntoIterator<Item = R>, mut key_of: F) -> Vec<R>
where
    K: Eq + Hash,
    F: FnMut(&R) -> Option<K>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| match key_of(record) {
            Some(key) => seen.insert(key),
            None => false,
        })
        .collect()
}
