//! Weighted choice tables and the cyclic reel strips built from them

use crate::common::traits::RandomSource;
use crate::errors::{ConfigurationError, RandomSourceError};
use serde::{Deserialize, Serialize};

/// One value and its relative weight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedEntry<T> {
    pub value: T,
    pub weight: u32,
}

/// Ordered, non-empty list of strictly positive weights
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedTable<T> {
    entries: Vec<WeightedEntry<T>>,
    total: u64,
}

impl<T> WeightedTable<T> {
    /// Validate and build a table; entry order is preserved
    pub fn build(entries: impl IntoIterator<Item = (T, u32)>) -> Result<Self, ConfigurationError> {
        let entries: Vec<WeightedEntry<T>> = entries
            .into_iter()
            .map(|(value, weight)| WeightedEntry { value, weight })
            .collect();

        if entries.is_empty() {
            return Err(ConfigurationError::ValidationFailed(
                "weighted table must contain at least one entry".to_string(),
            ));
        }
        if let Some(position) = entries.iter().position(|e| e.weight == 0) {
            return Err(ConfigurationError::invalid(
                format!("weights[{}]", position),
                0,
                "weights must be positive",
            ));
        }

        let total = entries.iter().map(|e| e.weight as u64).sum();
        Ok(Self { entries, total })
    }

    pub fn entries(&self) -> &[WeightedEntry<T>] {
        &self.entries
    }

    pub fn total_weight(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Long-run frequency of entry `index`
    pub fn probability(&self, index: usize) -> f64 {
        self.entries
            .get(index)
            .map(|e| e.weight as f64 / self.total as f64)
            .unwrap_or(0.0)
    }

    /// Index of the cumulative bucket containing `u * total`
    pub fn index_at(&self, u: f64) -> usize {
        let target = u * self.total as f64;
        let mut cumulative = 0u64;
        for (index, entry) in self.entries.iter().enumerate() {
            cumulative += entry.weight as u64;
            if target < cumulative as f64 {
                return index;
            }
        }
        // u rounds up to the very top of the last bucket
        self.entries.len() - 1
    }

    pub fn value_at(&self, u: f64) -> &T {
        &self.entries[self.index_at(u)].value
    }

    pub fn draw<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<&T, RandomSourceError> {
        Ok(self.value_at(rng.next_f64()?))
    }
}

/// Cyclic strip in which every value occupies `weight` consecutive stops
///
/// Picking one uniform stop is a weighted draw of the symbol under it, and
/// the rows that follow on the same reel come from the neighbouring stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReelStrip<T> {
    stops: Vec<T>,
}

impl<T: Clone> ReelStrip<T> {
    pub fn from_table(table: &WeightedTable<T>) -> Self {
        let stops = table
            .entries()
            .iter()
            .flat_map(|e| std::iter::repeat(e.value.clone()).take(e.weight as usize))
            .collect();
        Self { stops }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stops(&self) -> &[T] {
        &self.stops
    }

    /// `rows` consecutive stops starting at `offset`, wrapping around
    pub fn window(&self, offset: usize, rows: usize) -> Vec<T> {
        (0..rows)
            .map(|row| self.stops[(offset + row) % self.stops.len()].clone())
            .collect()
    }

    /// One random stop, then its visible window
    pub fn spin<R: RandomSource + ?Sized>(&self, rng: &mut R, rows: usize) -> Result<Vec<T>, RandomSourceError> {
        let offset = rng.next_index(self.stops.len())?;
        Ok(self.window(offset, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::random::SeededSource;

    #[test]
    fn test_build_rejects_empty_and_zero_weights() {
        assert!(WeightedTable::<char>::build(vec![]).is_err());
        assert!(WeightedTable::build(vec![('a', 3), ('b', 0)]).is_err());
    }

    #[test]
    fn test_value_at_walks_cumulative_buckets() {
        let table = WeightedTable::build(vec![('a', 1), ('b', 2), ('c', 1)]).unwrap();
        assert_eq!(*table.value_at(0.0), 'a');
        assert_eq!(*table.value_at(0.24), 'a');
        assert_eq!(*table.value_at(0.25), 'b');
        assert_eq!(*table.value_at(0.74), 'b');
        assert_eq!(*table.value_at(0.75), 'c');
        assert_eq!(*table.value_at(0.999_999), 'c');
    }

    #[test]
    fn test_building_twice_is_identical() {
        let entries = vec![("x", 5), ("y", 7)];
        let first = WeightedTable::build(entries.clone()).unwrap();
        let second = WeightedTable::build(entries).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_draw_frequencies_pass_chi_squared() {
        let weights = [50u32, 40, 25, 15, 5, 1, 2];
        let table = WeightedTable::build(weights.iter().copied().enumerate()).unwrap();
        let mut rng = SeededSource::from_seed(2024);
        let draws = 200_000;

        let mut counts = [0u64; 7];
        for _ in 0..draws {
            counts[*table.draw(&mut rng).unwrap()] += 1;
        }

        let chi_squared: f64 = counts
            .iter()
            .enumerate()
            .map(|(i, &observed)| {
                let expected = table.probability(i) * draws as f64;
                (observed as f64 - expected).powi(2) / expected
            })
            .sum();

        // 6 degrees of freedom, p = 0.001 critical value
        assert!(chi_squared < 22.46, "chi-squared {} too large", chi_squared);
    }

    #[test]
    fn test_reel_strip_expands_weights() {
        let table = WeightedTable::build(vec![('a', 2), ('b', 1)]).unwrap();
        let strip = ReelStrip::from_table(&table);
        assert_eq!(strip.stops(), &['a', 'a', 'b']);
        assert_eq!(strip.window(2, 3), vec!['b', 'a', 'a']);
    }
}
