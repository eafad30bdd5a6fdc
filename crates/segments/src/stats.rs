//! Per-segment user statistics: member count, average annualized income,
//! dominant gender, and the Male/Female distribution with percentages.

use std::collections::BTreeMap;
use std::sync::Arc;

use audience_core::error::AudienceResult;
use audience_core::types::{Gender, GenderUserCount, SegmentGenderData, SegmentUsersMetaData, User};
use audience_store::SegmentStore;
use tracing::debug;
use uuid::Uuid;

/// Computes derived statistics for one segment at a time. Each call selects
/// the segment's members from the store and folds them locally; nothing is
/// shared or persisted between calls.
pub struct SegmentStatsAggregator {
    store: Arc<dyn SegmentStore>,
}

impl SegmentStatsAggregator {
    pub fn new(store: Arc<dyn SegmentStore>) -> Self {
        Self { store }
    }

    /// Member count, average annualized income, and dominant gender.
    /// A segment with no members reports `user_count == 0` and absent
    /// income/gender values, never zeroes.
    pub async fn compute_stats(&self, segment_id: Uuid) -> AudienceResult<SegmentUsersMetaData> {
        let users = self.store.users_in_segment(segment_id).await?;

        let user_count = users.len() as u64;
        let avg_income = if users.is_empty() {
            None
        } else {
            Some(users.iter().map(User::annualized_income).sum::<f64>() / users.len() as f64)
        };
        let top_gender = top_gender(&gender_counts(&users));

        debug!(%segment_id, user_count, "Computed segment stats");
        Ok(SegmentUsersMetaData {
            user_count,
            avg_income,
            top_gender,
        })
    }

    /// Male and Female member counts with their share of the combined
    /// Male+Female population. Other genders are excluded from both the
    /// rows and the percentage denominator. When the segment has no Male
    /// or Female members the result is empty — the percentage has no
    /// meaningful denominator in that case.
    pub async fn compute_gender_distribution(
        &self,
        segment_id: Uuid,
    ) -> AudienceResult<Vec<SegmentGenderData>> {
        let users = self.store.users_in_segment(segment_id).await?;
        Ok(gender_distribution(&gender_counts(&users)))
    }
}

/// Group members by gender. The BTreeMap keeps rows in gender order, which
/// makes every downstream derivation deterministic.
fn gender_counts(users: &[User]) -> BTreeMap<Gender, u64> {
    let mut counts = BTreeMap::new();
    for user in users {
        *counts.entry(user.gender).or_insert(0) += 1;
    }
    counts
}

/// The gender with the strictly largest count, over all genders present.
/// Ties resolve to the lexically smallest gender (the enum's declaration
/// order). `None` when there are no rows.
fn top_gender(counts: &BTreeMap<Gender, u64>) -> Option<Gender> {
    let mut top: Option<(Gender, u64)> = None;
    for (&gender, &count) in counts {
        match top {
            Some((_, best)) if count <= best => {}
            _ => top = Some((gender, count)),
        }
    }
    top.map(|(gender, _)| gender)
}

fn gender_distribution(counts: &BTreeMap<Gender, u64>) -> Vec<SegmentGenderData> {
    let rows: Vec<GenderUserCount> = counts
        .iter()
        .filter(|(gender, _)| matches!(gender, Gender::Male | Gender::Female))
        .map(|(&gender, &user_count)| GenderUserCount { gender, user_count })
        .collect();

    let total: u64 = rows.iter().map(|row| row.user_count).sum();
    if total == 0 {
        return Vec::new();
    }

    rows.into_iter()
        .map(|row| SegmentGenderData {
            gender: row.gender,
            user_count: row.user_count,
            user_percentage: (row.user_count as f64 / total as f64 * 1000.0).round() / 10.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use audience_core::types::IncomeType;
    use audience_store::MemoryStore;

    const SEGMENT: u128 = 1;

    fn user(n: u128, gender: Gender, income_level: f64, income_type: IncomeType) -> User {
        User {
            id: Uuid::from_u128(n),
            gender,
            income_level,
            income_type,
            segment_ids: vec![Uuid::from_u128(SEGMENT)],
        }
    }

    fn aggregator(users: Vec<User>) -> SegmentStatsAggregator {
        let store = MemoryStore::new();
        for u in users {
            store.insert_user(u);
        }
        SegmentStatsAggregator::new(Arc::new(store))
    }

    // compute_stats --------------------------------------------------------

    #[tokio::test]
    async fn test_empty_segment_has_absent_stats() {
        let stats = aggregator(vec![])
            .compute_stats(Uuid::from_u128(SEGMENT))
            .await
            .unwrap();
        assert_eq!(stats.user_count, 0);
        assert_eq!(stats.avg_income, None);
        assert_eq!(stats.top_gender, None);
    }

    #[tokio::test]
    async fn test_all_monthly_incomes_are_annualized() {
        let stats = aggregator(vec![
            user(1, Gender::Female, 1_000.0, IncomeType::Monthly),
            user(2, Gender::Male, 3_000.0, IncomeType::Monthly),
        ])
        .compute_stats(Uuid::from_u128(SEGMENT))
        .await
        .unwrap();
        // mean(1000, 3000) * 12
        assert_eq!(stats.user_count, 2);
        assert!((stats.avg_income.unwrap() - 24_000.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_mixed_income_types_annualize_per_user() {
        let stats = aggregator(vec![
            user(1, Gender::Female, 1_000.0, IncomeType::Monthly),
            user(2, Gender::Male, 20_000.0, IncomeType::Yearly),
        ])
        .compute_stats(Uuid::from_u128(SEGMENT))
        .await
        .unwrap();
        // (12_000 + 20_000) / 2, not mean(1000, 20000) * anything
        assert!((stats.avg_income.unwrap() - 16_000.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_top_gender_is_strict_majority() {
        let mut users: Vec<User> = (0..5)
            .map(|n| user(n, Gender::Male, 100.0, IncomeType::Yearly))
            .collect();
        users.extend((5..8).map(|n| user(n, Gender::Female, 100.0, IncomeType::Yearly)));

        let stats = aggregator(users)
            .compute_stats(Uuid::from_u128(SEGMENT))
            .await
            .unwrap();
        assert_eq!(stats.top_gender, Some(Gender::Male));
    }

    #[tokio::test]
    async fn test_top_gender_tie_resolves_to_lexically_smallest() {
        let agg = aggregator(vec![
            user(1, Gender::Male, 100.0, IncomeType::Yearly),
            user(2, Gender::Male, 100.0, IncomeType::Yearly),
            user(3, Gender::Female, 100.0, IncomeType::Yearly),
            user(4, Gender::Female, 100.0, IncomeType::Yearly),
        ]);
        // Deterministic across repeated calls, not first-come-first-served.
        for _ in 0..5 {
            let stats = agg.compute_stats(Uuid::from_u128(SEGMENT)).await.unwrap();
            assert_eq!(stats.top_gender, Some(Gender::Female));
        }
    }

    #[tokio::test]
    async fn test_top_gender_counts_all_genders() {
        let stats = aggregator(vec![
            user(1, Gender::Other, 100.0, IncomeType::Yearly),
            user(2, Gender::Other, 100.0, IncomeType::Yearly),
            user(3, Gender::Male, 100.0, IncomeType::Yearly),
        ])
        .compute_stats(Uuid::from_u128(SEGMENT))
        .await
        .unwrap();
        assert_eq!(stats.top_gender, Some(Gender::Other));
    }

    // compute_gender_distribution ------------------------------------------

    #[tokio::test]
    async fn test_distribution_percentages_ignore_other_genders() {
        let mut users: Vec<User> = (0..30)
            .map(|n| user(n, Gender::Male, 100.0, IncomeType::Yearly))
            .collect();
        users.extend((30..100).map(|n| user(n, Gender::Female, 100.0, IncomeType::Yearly)));
        users.extend((100..200).map(|n| user(n, Gender::Other, 100.0, IncomeType::Yearly)));

        let rows = aggregator(users)
            .compute_gender_distribution(Uuid::from_u128(SEGMENT))
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].gender, Gender::Female);
        assert!((rows[0].user_percentage - 70.0).abs() < 1e-9);
        assert_eq!(rows[1].gender, Gender::Male);
        assert!((rows[1].user_percentage - 30.0).abs() < 1e-9);

        let sum: f64 = rows.iter().map(|r| r.user_percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_distribution_rounds_to_one_decimal_place() {
        let rows = aggregator(vec![
            user(1, Gender::Male, 100.0, IncomeType::Yearly),
            user(2, Gender::Female, 100.0, IncomeType::Yearly),
            user(3, Gender::Female, 100.0, IncomeType::Yearly),
        ])
        .compute_gender_distribution(Uuid::from_u128(SEGMENT))
        .await
        .unwrap();

        assert!((rows[0].user_percentage - 66.7).abs() < 1e-9); // Female
        assert!((rows[1].user_percentage - 33.3).abs() < 1e-9); // Male
    }

    #[tokio::test]
    async fn test_distribution_without_male_or_female_members_is_empty() {
        let rows = aggregator(vec![
            user(1, Gender::Other, 100.0, IncomeType::Yearly),
            user(2, Gender::Other, 100.0, IncomeType::Yearly),
        ])
        .compute_gender_distribution(Uuid::from_u128(SEGMENT))
        .await
        .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_distribution_of_empty_segment_is_empty() {
        let rows = aggregator(vec![])
            .compute_gender_distribution(Uuid::from_u128(SEGMENT))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
