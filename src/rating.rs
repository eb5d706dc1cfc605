//! Ratings and their per-subject summaries.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::StoreError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A submitted rating. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub id: String,
    pub value: u8,
    pub subject: String,
    pub author: String,
    pub timestamp: NaiveDateTime,
    pub comment: Option<String>,
}

impl Rating {
    pub fn new(
        id: impl Into<String>,
        value: i64,
        subject: impl Into<String>,
        author: impl Into<String>,
        timestamp: NaiveDateTime,
        comment: Option<String>,
    ) -> Result<Self, StoreError> {
        if !(MIN_RATING as i64..=MAX_RATING as i64).contains(&value) {
            return Err(StoreError::InvalidRating(value));
        }
        Ok(Self {
            id: id.into(),
            value: value as u8,
            subject: subject.into(),
            author: author.into(),
            timestamp,
            comment,
        })
    }
}

/// Accepts `2024-01-15` as well as `2024-01-15 10:30:00` / `2024-01-15T10:30:00`.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, StoreError> {
    let s = s.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| StoreError::InvalidDate(s.to_string()))
}

/// Count per bucket 1..=5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingDistribution([usize; MAX_RATING as usize]);

impl RatingDistribution {
    pub fn get(&self, bucket: u8) -> usize {
        if (MIN_RATING..=MAX_RATING).contains(&bucket) {
            self.0[(bucket - 1) as usize]
        } else {
            0
        }
    }

    fn add(&mut self, bucket: u8) {
        self.0[(bucket - 1) as usize] += 1;
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Buckets from 5 down to 1, the order the dashboards list them in.
    pub fn iter_desc(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        (MIN_RATING..=MAX_RATING).rev().map(|b| (b, self.get(b)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingSummary {
    /// Exact mean; 0 when there are no ratings.
    pub average: f64,
    pub distribution: RatingDistribution,
    pub total: usize,
}

impl RatingSummary {
    pub fn percentage(&self, bucket: u8) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.distribution.get(bucket) as f64 * 100.0 / self.total as f64
    }

    pub fn display_average(&self) -> String {
        format!("{:.1}", self.average)
    }
}

/// Reduce raw values; anything outside 1..=5 is skipped.
pub fn aggregate_values<I>(values: I) -> RatingSummary
where
    I: IntoIterator<Item = u8>,
{
    let mut distribution = RatingDistribution::default();
    let mut sum: u64 = 0;
    for value in values {
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            debug!("Skipping out of range rating value {value}");
            continue;
        }
        distribution.add(value);
        sum += value as u64;
    }
    let total = distribution.total();
    let average = if total > 0 {
        sum as f64 / total as f64
    } else {
        0.0
    };
    RatingSummary {
        average,
        distribution,
        total,
    }
}

pub fn aggregate<'a, I>(ratings: I) -> RatingSummary
where
    I: IntoIterator<Item = &'a Rating>,
{
    aggregate_values(ratings.into_iter().map(|r| r.value))
}

pub fn aggregate_by_subject<'a, I>(ratings: I) -> BTreeMap<String, RatingSummary>
where
    I: IntoIterator<Item = &'a Rating>,
{
    let mut grouped: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    for rating in ratings {
        grouped
            .entry(rating.subject.clone())
            .or_default()
            .push(rating.value);
    }
    grouped
        .into_iter()
        .map(|(subject, values)| (subject, aggregate_values(values)))
        .collect()
}

/// Newest first; equal timestamps keep their input order.
pub fn recent<'a>(ratings: &'a [Rating], n: usize) -> Vec<&'a Rating> {
    let mut sorted: Vec<&Rating> = ratings.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(n);
    sorted
}

pub fn recent_summary(shown: usize, total: usize) -> Option<String> {
    (total > shown).then(|| format!("Showing {shown} of {total} reviews"))
}

/// Read only star strip: star i is filled when i <= value.
pub fn stars(value: f64) -> String {
    (MIN_RATING..=MAX_RATING)
        .map(|i| if i as f64 <= value { '★' } else { '☆' })
        .collect()
}

/// Up to two uppercase initials, e.g. "Sarah Michelle Johnson" -> "SM".
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlatformStats {
    pub total_users: usize,
    pub total_stores: usize,
    pub total_ratings: usize,
    pub average: f64,
}

impl PlatformStats {
    pub fn compute(total_users: usize, total_stores: usize, ratings: &[Rating]) -> Self {
        let summary = aggregate(ratings);
        Self {
            total_users,
            total_stores,
            total_ratings: summary.total,
            average: summary.average,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(id: &str, value: i64, subject: &str, date: &str) -> Rating {
        Rating::new(id, value, subject, "someone", parse_timestamp(date).unwrap(), None).unwrap()
    }

    #[test]
    fn empty_aggregate_is_zero() {
        let summary = aggregate_values([]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average, 0.0);
        for b in 1..=5 {
            assert_eq!(summary.distribution.get(b), 0);
            assert_eq!(summary.percentage(b), 0.0);
        }
        assert_eq!(summary.display_average(), "0.0");
    }

    #[test]
    fn aggregate_counts_buckets_and_mean() {
        let summary = aggregate_values([5, 4, 5, 3, 5]);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.average, 4.4);
        assert_eq!(
            summary.distribution.iter_desc().collect::<Vec<_>>(),
            vec![(5, 3), (4, 1), (3, 1), (2, 0), (1, 0)]
        );
        assert_eq!(summary.percentage(5), 60.0);
        assert_eq!(summary.display_average(), "4.4");
    }

    #[test]
    fn out_of_range_values_are_ignored() {
        let summary = aggregate_values([0, 5, 9, 3]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.distribution.total(), summary.total);
        assert_eq!(summary.average, 4.0);
    }

    #[test]
    fn rating_rejects_out_of_range() {
        let ts = parse_timestamp("2024-01-15").unwrap();
        assert!(matches!(
            Rating::new("1", 6, "s", "a", ts, None),
            Err(StoreError::InvalidRating(6))
        ));
        assert!(Rating::new("1", 0, "s", "a", ts, None).is_err());
    }

    #[test]
    fn groups_by_subject() {
        let ratings = vec![
            rating("1", 5, "store-1", "2024-01-15"),
            rating("2", 4, "store-2", "2024-01-14"),
            rating("3", 3, "store-1", "2024-01-13"),
        ];
        let by_subject = aggregate_by_subject(&ratings);
        assert_eq!(by_subject.len(), 2);
        assert_eq!(by_subject["store-1"].total, 2);
        assert_eq!(by_subject["store-1"].average, 4.0);
        assert_eq!(by_subject["store-2"].distribution.get(4), 1);
    }

    #[test]
    fn recent_is_newest_first() {
        let ratings = vec![
            rating("1", 5, "s", "2024-01-13"),
            rating("2", 4, "s", "2024-01-15"),
            rating("3", 3, "s", "2024-01-14"),
            rating("4", 2, "s", "2024-01-15"),
        ];
        let ids: Vec<&str> = recent(&ratings, 3).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "3"]);
        assert_eq!(recent_summary(3, 4).as_deref(), Some("Showing 3 of 4 reviews"));
        assert_eq!(recent_summary(3, 3), None);
    }

    #[test]
    fn timestamps_accept_dates_and_datetimes() {
        assert!(parse_timestamp("2024-01-15").is_ok());
        assert!(parse_timestamp("2024-01-15T08:30:00").is_ok());
        assert!(matches!(parse_timestamp("yesterday"), Err(StoreError::InvalidDate(_))));
    }

    #[test]
    fn star_strip_and_initials() {
        assert_eq!(stars(4.3), "★★★★☆");
        assert_eq!(stars(0.0), "☆☆☆☆☆");
        assert_eq!(stars(5.0), "★★★★★");
        assert_eq!(initials("Sarah Michelle Johnson Brown"), "SM");
        assert_eq!(initials("madonna"), "M");
    }

    #[test]
    fn platform_stats() {
        let ratings = vec![rating("1", 5, "a", "2024-01-15"), rating("2", 3, "b", "2024-01-14")];
        let stats = PlatformStats::compute(3, 2, &ratings);
        assert_eq!(stats.total_ratings, 2);
        assert_eq!(stats.average, 4.0);
    }
}
