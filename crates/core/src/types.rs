//! Domain types for segments, users, and the derived per-segment statistics.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named grouping of users. Ids are assigned by the store as UUIDv7, so
/// they are time-ordered and id-descending approximates newest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: Uuid,
    pub name: String,
}

/// Gender values observed on user records. `Ord` follows declaration order,
/// which is also lexical order; the dominant-gender tie-break relies on it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeType {
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub gender: Gender,
    pub income_level: f64,
    pub income_type: IncomeType,
    /// Segments this user belongs to.
    #[serde(default)]
    pub segment_ids: Vec<Uuid>,
}

impl User {
    /// Income on a yearly basis: monthly income is multiplied by 12,
    /// yearly income is used as-is.
    pub fn annualized_income(&self) -> f64 {
        match self.income_type {
            IncomeType::Monthly => self.income_level * 12.0,
            IncomeType::Yearly => self.income_level,
        }
    }

    pub fn is_member_of(&self, segment_id: Uuid) -> bool {
        self.segment_ids.contains(&segment_id)
    }
}

/// Statistics derived from a segment's member users. Recomputed on every
/// read, never persisted. `avg_income` and `top_gender` are `None` iff the
/// segment has no members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentUsersMetaData {
    pub user_count: u64,
    /// Average yearly income of the member group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_income: Option<f64>,
    /// Dominant gender of the member group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_gender: Option<Gender>,
}

/// A segment together with its derived statistics, as returned by the
/// listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetaData {
    #[serde(flatten)]
    pub segment: Segment,
    #[serde(flatten)]
    pub meta: SegmentUsersMetaData,
}

/// One row per distinct gender value observed among a segment's members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenderUserCount {
    pub gender: Gender,
    pub user_count: u64,
}

/// A gender-count row with its share of the Male+Female population,
/// on a 0-100 scale rounded to one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentGenderData {
    pub gender: Gender,
    pub user_count: u64,
    pub user_percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annualized_income_monthly() {
        let user = User {
            id: Uuid::now_v7(),
            gender: Gender::Female,
            income_level: 2_500.0,
            income_type: IncomeType::Monthly,
            segment_ids: vec![],
        };
        assert!((user.annualized_income() - 30_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_annualized_income_yearly_unchanged() {
        let user = User {
            id: Uuid::now_v7(),
            gender: Gender::Male,
            income_level: 48_000.0,
            income_type: IncomeType::Yearly,
            segment_ids: vec![],
        };
        assert!((user.annualized_income() - 48_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gender_order_is_lexical() {
        assert!(Gender::Female < Gender::Male);
        assert!(Gender::Male < Gender::Other);
    }

    #[test]
    fn test_segment_metadata_serializes_flat_camel_case() {
        let meta = SegmentMetaData {
            segment: Segment {
                id: Uuid::now_v7(),
                name: "Early adopters".to_string(),
            },
            meta: SegmentUsersMetaData {
                user_count: 3,
                avg_income: Some(52_000.0),
                top_gender: Some(Gender::Female),
            },
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["name"], "Early adopters");
        assert_eq!(json["userCount"], 3);
        assert_eq!(json["avgIncome"], 52_000.0);
        assert_eq!(json["topGender"], "female");
    }

    #[test]
    fn test_absent_stats_are_omitted_from_json() {
        let meta = SegmentUsersMetaData {
            user_count: 0,
            avg_income: None,
            top_gender: None,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("avgIncome").is_none());
        assert!(json.get("topGender").is_none());
    }
}
