use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User-set column widths or row heights, keyed by index.
///
/// Indices are kept attached to the same column/row across structural edits:
/// removing index `k` drops its entry and shifts every later entry down,
/// inserting at `k` shifts entries at `k` and later up.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeOverrides(BTreeMap<u32, f64>);

impl SizeOverrides {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, index: u32) -> Option<f64> {
        self.0.get(&index).copied()
    }

    pub fn set(&mut self, index: u32, size: f64) {
        self.0.insert(index, size);
    }

    pub fn clear(&mut self, index: u32) -> Option<f64> {
        self.0.remove(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }

    /// Overrides after index `removed` is deleted.
    pub fn without_index(&self, removed: u32) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(&k, _)| k != removed)
                .map(|(&k, &v)| if k > removed { (k - 1, v) } else { (k, v) })
                .collect(),
        )
    }

    /// Overrides after a new index is inserted at `inserted`.
    pub fn with_inserted_index(&self, inserted: u32) -> Self {
        Self(
            self.0
                .iter()
                .map(|(&k, &v)| {
                    if k >= inserted {
                        (k.saturating_add(1), v)
                    } else {
                        (k, v)
                    }
                })
                .collect(),
        )
    }

    /// Every entry passed through `clamp`, warning about the ones it changed.
    pub fn clamped(&self, what: &str, clamp: impl Fn(f64) -> f64) -> Self {
        self.iter()
            .map(|(idx, size)| {
                let fixed = clamp(size);
                if fixed.to_bits() != size.to_bits() {
                    tracing::warn!("{what} override {idx} = {size} is out of range, using {fixed}");
                }
                (idx, fixed)
            })
            .collect()
    }

    /// Entries whose index is at or beyond `count`.
    pub fn out_of_range(&self, count: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.range(count..).map(|(&k, &v)| (k, v))
    }
}

impl FromIterator<(u32, f64)> for SizeOverrides {
    fn from_iter<T: IntoIterator<Item = (u32, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_middle_index_shifts_later_entries() {
        let overrides: SizeOverrides = [(0, 100.0), (2, 150.0)].into_iter().collect();
        let shifted = overrides.without_index(1);
        assert_eq!(shifted, [(0, 100.0), (1, 150.0)].into_iter().collect());
    }

    #[test]
    fn test_remove_overridden_index_drops_it() {
        let overrides: SizeOverrides = [(0, 80.0), (1, 90.0), (3, 70.0)].into_iter().collect();
        let shifted = overrides.without_index(1);
        assert_eq!(shifted.get(0), Some(80.0));
        assert_eq!(shifted.get(1), None);
        assert_eq!(shifted.get(2), Some(70.0));
        assert_eq!(shifted.len(), 2);
    }

    #[test]
    fn test_insert_shifts_at_and_after() {
        let overrides: SizeOverrides = [(0, 10.0), (1, 20.0), (4, 40.0)].into_iter().collect();
        let shifted = overrides.with_inserted_index(1);
        assert_eq!(
            shifted,
            [(0, 10.0), (2, 20.0), (5, 40.0)].into_iter().collect()
        );
    }

    #[test]
    fn test_clamped_raises_small_and_non_finite_sizes() {
        let overrides: SizeOverrides = [(0, -100.0), (1, 0.0), (2, f64::NAN), (3, 90.0)]
            .into_iter()
            .collect();
        let fixed = overrides.clamped("row", |h| if h.is_finite() { h.max(30.0) } else { 30.0 });
        assert_eq!(
            fixed,
            [(0, 30.0), (1, 30.0), (2, 30.0), (3, 90.0)].into_iter().collect()
        );
    }

    #[test]
    fn test_out_of_range() {
        let overrides: SizeOverrides = [(0, 10.0), (3, 20.0), (7, 40.0)].into_iter().collect();
        let stale: Vec<_> = overrides.out_of_range(3).collect();
        assert_eq!(stale, vec![(3, 20.0), (7, 40.0)]);
    }

    #[test]
    fn test_json_uses_object_keys() {
        let overrides: SizeOverrides = [(2, 150.0)].into_iter().collect();
        let json = serde_json::to_string(&overrides).unwrap();
        assert_eq!(json, r#"{"2":150.0}"#);
        let back: SizeOverrides = serde_json::from_str(&json).unwrap();
        assert_eq!(back, overrides);
    }
}
