use std::collections::BTreeMap;

/// Key reported when a distribution carries no positive weight
pub const NO_CATEGORY: &str = "N/A";

/// Weighted frequency distribution over string categories
///
/// Categories are kept in a `BTreeMap` so iteration (and therefore the
/// top-category tie-break) is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedDistribution {
    weights: BTreeMap<String, f64>,
}

impl WeightedDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (category, weight) pairs, summing weights per category
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut dist = Self::new();
        for (category, weight) in pairs {
            dist.add(category, weight);
        }
        dist
    }

    pub fn add(&mut self, category: &str, weight: f64) {
        *self.weights.entry(category.to_string()).or_insert(0.0) += weight;
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weight(&self, category: &str) -> f64 {
        self.weights.get(category).copied().unwrap_or(0.0)
    }

    /// Number of categories with positive weight
    pub fn support(&self) -> usize {
        self.weights.values().filter(|w| **w > 0.0).count()
    }

    /// Share of total weight per category (empty if total is not positive)
    pub fn shares(&self) -> Vec<(&str, f64)> {
        let total = self.total();
        if total <= 0.0 {
            return Vec::new();
        }
        self.weights
            .iter()
            .map(|(k, w)| (k.as_str(), w / total))
            .collect()
    }

    /// Shannon entropy in bits
    ///
    /// H = -sum(p * log2(p)) over categories with p > 0.
    /// Returns 0.0 when the total weight is not positive.
    pub fn entropy(&self) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }

        let mut h = 0.0;
        for w in self.weights.values() {
            let p = w / total;
            if p > 0.0 {
                h -= p * p.log2();
            }
        }
        h
    }

    /// Category holding the largest weight and its share of the total
    ///
    /// Ties go to the lexicographically smallest key. A distribution with
    /// no positive weight yields `("N/A", 0.0)`.
    pub fn top_share(&self) -> (&str, f64) {
        let mut top_key = NO_CATEGORY;
        let mut top_weight = 0.0;

        // Ascending key order: only a strictly larger weight replaces the leader
        for (k, w) in &self.weights {
            if *w > top_weight {
                top_weight = *w;
                top_key = k.as_str();
            }
        }

        let total = self.total();
        if total <= 0.0 {
            return (top_key, 0.0);
        }
        (top_key, top_weight / total)
    }
}

/// Linear-index percentile
///
/// Sorts ascending and picks `floor(p / 100 * (n - 1))`; no interpolation.
/// Returns 0.0 for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let fraction = (p / 100.0).clamp(0.0, 1.0);
    let idx = (fraction * (sorted.len() - 1) as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
