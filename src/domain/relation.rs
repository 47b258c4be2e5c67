//! User-declared relationships between markets.
//!
//! Relationships are supplied by the operator and persisted in a JSON
//! document with three arrays:
//!
//! - `equivalences` - Directions that describe the same real-world event
//! - `orderings` - Directions listed in ascending order of probability
//! - `arb_opportunities` - Directions whose probabilities sum to at most
//!   `maximum`
//!
//! # Examples
//!
//! ```
//! use dutchbook::domain::relation::RelationshipBook;
//!
//! let book: RelationshipBook = serde_json::from_str(r#"{
//!     "equivalences": [
//!         {"directions": [{"id": "a", "outcome": "YES"}, {"id": "b", "outcome": "YES"}]}
//!     ],
//!     "arb_opportunities": [
//!         {"maximum": 0.995, "markets": [{"id": "a", "outcome": "YES"}, {"id": "c", "outcome": "NO"}]}
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(book.len(), 2);
//! assert_eq!(book.equivalences[0].margin, 0.005);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::error::DomainError;

/// Default margin for equivalences.
pub const EQUIVALENCE_MARGIN: f64 = 0.005;

/// Default margin for orderings.
pub const ORDERING_MARGIN: f64 = 0.02;

/// Default share cap for general opportunities.
pub const DEFAULT_MAX_SHARES: f64 = 2000.0;

fn default_equivalence_margin() -> f64 {
    EQUIVALENCE_MARGIN
}

fn default_ordering_margin() -> f64 {
    ORDERING_MARGIN
}

fn default_max_shares() -> f64 {
    DEFAULT_MAX_SHARES
}

/// Directions that all describe the same event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceRelation {
    #[serde(alias = "markets")]
    pub directions: Vec<Direction>,
    /// Spread required before opening a new position.
    #[serde(default = "default_equivalence_margin")]
    pub margin: f64,
}

impl EquivalenceRelation {
    pub fn new(directions: Vec<Direction>) -> Self {
        Self {
            directions,
            margin: EQUIVALENCE_MARGIN,
        }
    }
}

/// Directions whose probabilities should be non-decreasing in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderingRelation {
    #[serde(alias = "markets")]
    pub directions: Vec<Direction>,
    #[serde(default = "default_ordering_margin")]
    pub margin: f64,
}

impl OrderingRelation {
    pub fn new(directions: Vec<Direction>) -> Self {
        Self {
            directions,
            margin: ORDERING_MARGIN,
        }
    }
}

/// Directions whose probabilities should sum to at most `maximum`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralRelation {
    #[serde(alias = "markets")]
    pub directions: Vec<Direction>,
    pub maximum: f64,
    #[serde(default = "default_max_shares")]
    pub max_shares: f64,
}

impl GeneralRelation {
    pub fn new(directions: Vec<Direction>, maximum: f64) -> Self {
        Self {
            directions,
            maximum,
            max_shares: DEFAULT_MAX_SHARES,
        }
    }
}

/// Any declared relationship.
#[derive(Debug, Clone, PartialEq)]
pub enum Relationship {
    Equivalence(EquivalenceRelation),
    Ordering(OrderingRelation),
    General(GeneralRelation),
}

impl Relationship {
    /// Short kind name used in logs and tables.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Equivalence(_) => "equivalence",
            Self::Ordering(_) => "ordering",
            Self::General(_) => "general",
        }
    }

    #[must_use]
    pub fn directions(&self) -> &[Direction] {
        match self {
            Self::Equivalence(r) => &r.directions,
            Self::Ordering(r) => &r.directions,
            Self::General(r) => &r.directions,
        }
    }

    /// Compact label listing the relationship's directions.
    #[must_use]
    pub fn label(&self) -> String {
        let directions: Vec<String> = self.directions().iter().map(ToString::to_string).collect();
        format!("{}[{}]", self.kind_name(), directions.join(", "))
    }

    /// Check the relationship is well formed and can be leased in one batch
    /// from a write bucket of `write_capacity`.
    pub fn validate(&self, write_capacity: usize) -> Result<(), DomainError> {
        let (required, margin) = match self {
            Self::Equivalence(r) => (2, Some(r.margin)),
            Self::Ordering(r) => (2, Some(r.margin)),
            Self::General(r) => {
                if !(r.maximum.is_finite() && r.maximum > 0.0) {
                    return Err(DomainError::InvalidMaximum { maximum: r.maximum });
                }
                if !(r.max_shares.is_finite() && r.max_shares > 0.0) {
                    return Err(DomainError::InvalidMaxShares {
                        max_shares: r.max_shares,
                    });
                }
                (1, None)
            }
        };

        let actual = self.directions().len();
        if actual < required {
            return Err(DomainError::TooFewDirections {
                kind: self.kind_name(),
                required,
                actual,
            });
        }
        if let Some(margin) = margin {
            if !(0.0..1.0).contains(&margin) {
                return Err(DomainError::InvalidMargin { margin });
            }
        }

        // Equivalence and ordering plans always have two legs.
        let legs = match self {
            Self::General(_) => actual,
            _ => 2,
        };
        if legs > write_capacity {
            return Err(DomainError::TooManyLegs {
                legs,
                capacity: write_capacity,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// The persisted relationship document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipBook {
    #[serde(default)]
    pub equivalences: Vec<EquivalenceRelation>,
    #[serde(default)]
    pub orderings: Vec<OrderingRelation>,
    #[serde(default)]
    pub arb_opportunities: Vec<GeneralRelation>,
}

impl RelationshipBook {
    /// All relationships, equivalences first, then orderings, then general.
    #[must_use]
    pub fn relationships(&self) -> Vec<Relationship> {
        self.equivalences
            .iter()
            .cloned()
            .map(Relationship::Equivalence)
            .chain(self.orderings.iter().cloned().map(Relationship::Ordering))
            .chain(self.arb_opportunities.iter().cloned().map(Relationship::General))
            .collect()
    }

    /// Append a relationship to the matching array.
    pub fn push(&mut self, relationship: Relationship) {
        match relationship {
            Relationship::Equivalence(r) => self.equivalences.push(r),
            Relationship::Ordering(r) => self.orderings.push(r),
            Relationship::General(r) => self.arb_opportunities.push(r),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.equivalences.len() + self.orderings.len() + self.arb_opportunities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate every relationship, reporting the first failure with its
    /// position in [`relationships`](Self::relationships) order.
    pub fn validate(&self, write_capacity: usize) -> Result<(), (usize, DomainError)> {
        self.relationships()
            .iter()
            .enumerate()
            .try_for_each(|(index, r)| r.validate(write_capacity).map_err(|e| (index, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> Vec<Direction> {
        vec![Direction::yes("a"), Direction::no("b")]
    }

    #[test]
    fn defaults_apply_when_missing() {
        let book: RelationshipBook = serde_json::from_str(
            r#"{
                "equivalences": [{"directions": [{"id": "a", "outcome": "YES"}, {"id": "b", "outcome": "NO"}]}],
                "orderings": [{"markets": [{"id": "a", "outcome": "YES"}, {"id": "b", "outcome": "YES"}]}],
                "arb_opportunities": [{"maximum": 1.0, "directions": [{"id": "c", "outcome": "YES"}]}]
            }"#,
        )
        .unwrap();

        assert_eq!(book.equivalences[0].margin, EQUIVALENCE_MARGIN);
        assert_eq!(book.orderings[0].margin, ORDERING_MARGIN);
        assert_eq!(book.arb_opportunities[0].max_shares, DEFAULT_MAX_SHARES);
    }

    #[test]
    fn missing_arrays_default_to_empty() {
        let book: RelationshipBook = serde_json::from_str("{}").unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn relationships_are_ordered_by_kind() {
        let mut book = RelationshipBook::default();
        book.push(Relationship::General(GeneralRelation::new(pair(), 1.0)));
        book.push(Relationship::Ordering(OrderingRelation::new(pair())));
        book.push(Relationship::Equivalence(EquivalenceRelation::new(pair())));

        let kinds: Vec<_> = book.relationships().iter().map(Relationship::kind_name).collect();
        assert_eq!(kinds, ["equivalence", "ordering", "general"]);
    }

    #[test]
    fn serializes_with_canonical_keys() {
        let mut book = RelationshipBook::default();
        book.push(Relationship::Ordering(OrderingRelation::new(pair())));
        let json = serde_json::to_value(&book).unwrap();

        assert!(json["orderings"][0]["directions"].is_array());
        assert_eq!(json["orderings"][0]["directions"][1]["outcome"], "NO");
    }

    #[test]
    fn validate_rejects_single_leg_equivalence() {
        let r = Relationship::Equivalence(EquivalenceRelation::new(vec![Direction::yes("a")]));
        assert!(matches!(
            r.validate(10),
            Err(DomainError::TooFewDirections { required: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_margin() {
        let mut relation = OrderingRelation::new(pair());
        relation.margin = 1.0;
        assert!(matches!(
            Relationship::Ordering(relation).validate(10),
            Err(DomainError::InvalidMargin { .. })
        ));
    }

    #[test]
    fn validate_rejects_non_positive_maximum() {
        let r = Relationship::General(GeneralRelation::new(pair(), 0.0));
        assert!(matches!(r.validate(10), Err(DomainError::InvalidMaximum { .. })));
    }

    #[test]
    fn validate_rejects_more_legs_than_write_capacity() {
        let directions = (0..4).map(|i| Direction::yes(format!("m{i}"))).collect();
        let r = Relationship::General(GeneralRelation::new(directions, 1.0));

        assert!(r.validate(4).is_ok());
        assert!(matches!(
            r.validate(3),
            Err(DomainError::TooManyLegs { legs: 4, capacity: 3 })
        ));
    }

    #[test]
    fn equivalence_plans_need_two_write_slots() {
        let directions = (0..5).map(|i| Direction::yes(format!("m{i}"))).collect();
        let r = Relationship::Equivalence(EquivalenceRelation::new(directions));

        assert!(r.validate(2).is_ok());
        assert!(r.validate(1).is_err());
    }

    #[test]
    fn book_validate_reports_index() {
        let mut book = RelationshipBook::default();
        book.push(Relationship::Equivalence(EquivalenceRelation::new(pair())));
        book.push(Relationship::General(GeneralRelation::new(vec![], 1.0)));

        let (index, _) = book.validate(10).unwrap_err();
        assert_eq!(index, 1);
    }

    #[test]
    fn label_lists_directions() {
        let r = Relationship::Equivalence(EquivalenceRelation::new(pair()));
        assert_eq!(r.label(), "equivalence[YES a, NO b]");
    }
}
