//! Ranking statistics aggregation.
//!
//! Stats are derived on read: every aggregate is recomputed from the raw
//! ranking rows of the affected dish, never maintained incrementally.
//! Read cost therefore scales with the per-dish ranking count.

use std::collections::BTreeMap;

use bellyfed_db::entities::ranking::TasteStatus;
use bellyfed_db::repositories::StatsRow;
use serde::Serialize;

/// How many countries the global distribution names before collapsing
/// the long tail into `other`.
pub const REPORTED_COUNTRY_LIMIT: usize = 10;

/// Bucket name for the country long tail and for owners with no country.
const OTHER_BUCKET: &str = "other";

/// Aggregate statistics over a set of rankings for one dish.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingStats {
    /// Total number of rankings in the population.
    pub total_rankings: u64,

    /// Arithmetic mean over numeric ranks only; `None` when the
    /// population has no numeric ranks. Taste-status rows are excluded
    /// from the mean, not treated as zero.
    pub average_rank: Option<f64>,

    /// Histogram of numeric ranks keyed 1..5; missing keys are
    /// implicitly zero.
    pub ranks: BTreeMap<u8, u64>,

    /// Histogram over the three taste status values; missing keys are
    /// implicitly zero.
    pub taste_statuses: BTreeMap<TasteStatus, u64>,

    /// Country buckets (global view only), summing to `total_rankings`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_distribution: Option<BTreeMap<String, u64>>,
}

impl RankingStats {
    /// Aggregate a (possibly country-filtered) population without a
    /// country breakdown.
    #[must_use]
    pub fn from_rows(rows: &[StatsRow]) -> Self {
        let mut ranks: BTreeMap<u8, u64> = BTreeMap::new();
        let mut taste_statuses: BTreeMap<TasteStatus, u64> = BTreeMap::new();
        let mut rank_sum: u64 = 0;
        let mut rank_count: u64 = 0;

        for row in rows {
            match (row.rank, row.taste_status) {
                (Some(rank), _) if (1..=5).contains(&rank) => {
                    *ranks.entry(rank as u8).or_insert(0) += 1;
                    rank_sum += rank as u64;
                    rank_count += 1;
                }
                (_, Some(status)) => {
                    *taste_statuses.entry(status).or_insert(0) += 1;
                }
                _ => {}
            }
        }

        let average_rank = if rank_count == 0 {
            None
        } else {
            Some(rank_sum as f64 / rank_count as f64)
        };

        Self {
            total_rankings: rows.len() as u64,
            average_rank,
            ranks,
            taste_statuses,
            country_distribution: None,
        }
    }

    /// Aggregate the global population, including the country breakdown.
    #[must_use]
    pub fn from_rows_global(rows: &[StatsRow]) -> Self {
        let mut stats = Self::from_rows(rows);
        stats.country_distribution = Some(country_distribution(rows));
        stats
    }
}

/// Bucket rows by owner country, keeping the top
/// [`REPORTED_COUNTRY_LIMIT`] countries and collapsing the rest -
/// along with owners that have no country - into `other`.
fn country_distribution(rows: &[StatsRow]) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut other: u64 = 0;

    for row in rows {
        match row.country.as_deref() {
            Some(country) if !country.is_empty() => {
                *counts.entry(country.to_string()).or_insert(0) += 1;
            }
            _ => other += 1,
        }
    }

    // Order countries by count descending, then name, and cut the tail
    let mut ordered: Vec<(String, u64)> = counts.into_iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut distribution: BTreeMap<String, u64> = BTreeMap::new();
    for (i, (country, count)) in ordered.into_iter().enumerate() {
        if i < REPORTED_COUNTRY_LIMIT {
            distribution.insert(country, count);
        } else {
            other += count;
        }
    }

    if other > 0 {
        distribution.insert(OTHER_BUCKET.to_string(), other);
    }

    distribution
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(rank: Option<i16>, taste_status: Option<TasteStatus>, country: Option<&str>) -> StatsRow {
        StatsRow {
            rank,
            taste_status,
            country: country.map(ToString::to_string),
        }
    }

    #[test]
    fn test_empty_population() {
        let stats = RankingStats::from_rows(&[]);
        assert_eq!(stats.total_rankings, 0);
        assert_eq!(stats.average_rank, None);
        assert!(stats.ranks.is_empty());
        assert!(stats.taste_statuses.is_empty());
        assert!(stats.country_distribution.is_none());
    }

    #[test]
    fn test_average_excludes_taste_status_rows() {
        // [rank=1, rank=3, tasteStatus=ACCEPTABLE] -> average 2.0, not 4/3
        let rows = vec![
            row(Some(1), None, Some("JP")),
            row(Some(3), None, Some("JP")),
            row(None, Some(TasteStatus::Acceptable), Some("US")),
        ];

        let stats = RankingStats::from_rows(&rows);
        assert_eq!(stats.total_rankings, 3);
        assert_eq!(stats.average_rank, Some(2.0));
        assert_eq!(stats.ranks.get(&1), Some(&1));
        assert_eq!(stats.ranks.get(&3), Some(&1));
        assert_eq!(stats.ranks.get(&2), None);
        assert_eq!(stats.taste_statuses.get(&TasteStatus::Acceptable), Some(&1));
    }

    #[test]
    fn test_all_taste_status_means_no_average() {
        let rows = vec![
            row(None, Some(TasteStatus::Dissatisfied), None),
            row(None, Some(TasteStatus::SecondChance), None),
        ];

        let stats = RankingStats::from_rows(&rows);
        assert_eq!(stats.total_rankings, 2);
        assert_eq!(stats.average_rank, None);
    }

    #[test]
    fn test_country_distribution_sums_to_total() {
        let rows = vec![
            row(Some(1), None, Some("JP")),
            row(Some(2), None, Some("JP")),
            row(Some(3), None, Some("US")),
            row(None, Some(TasteStatus::Acceptable), None),
        ];

        let stats = RankingStats::from_rows_global(&rows);
        let dist = stats.country_distribution.unwrap();

        assert_eq!(dist.get("JP"), Some(&2));
        assert_eq!(dist.get("US"), Some(&1));
        // No-country owners land in `other`
        assert_eq!(dist.get("other"), Some(&1));
        assert_eq!(dist.values().sum::<u64>(), stats.total_rankings);
    }

    #[test]
    fn test_country_long_tail_collapses_into_other() {
        // 12 distinct countries, one row each; 2 should collapse
        let countries = [
            "AR", "BR", "CA", "DE", "ES", "FR", "GB", "IT", "JP", "KR", "MX", "US",
        ];
        let rows: Vec<StatsRow> = countries
            .iter()
            .map(|c| row(Some(3), None, Some(c)))
            .collect();

        let stats = RankingStats::from_rows_global(&rows);
        let dist = stats.country_distribution.unwrap();

        let named: u64 = dist
            .iter()
            .filter(|(k, _)| k.as_str() != "other")
            .map(|(_, v)| *v)
            .sum();
        assert_eq!(dist.iter().filter(|(k, _)| k.as_str() != "other").count(), 10);
        assert_eq!(named, 10);
        assert_eq!(dist.get("other"), Some(&2));
        assert_eq!(dist.values().sum::<u64>(), 12);
    }

    #[test]
    fn test_serializes_camel_case() {
        let stats = RankingStats::from_rows(&[row(Some(5), None, None)]);
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["totalRankings"], 1);
        assert_eq!(json["averageRank"], 5.0);
        assert_eq!(json["ranks"]["5"], 1);
        // Local stats carry no country breakdown at all
        assert!(json.get("countryDistribution").is_none());
    }
}
