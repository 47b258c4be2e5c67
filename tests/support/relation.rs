//! Relationship document fixtures.

use std::path::Path;

use dutchbook::app::RelationshipStore;
use dutchbook::domain::relation::{EquivalenceRelation, GeneralRelation, OrderingRelation};
use dutchbook::domain::{Direction, Relationship, RelationshipBook};

pub fn equivalence(ids: &[&str]) -> Relationship {
    Relationship::Equivalence(EquivalenceRelation::new(
        ids.iter().map(|id| Direction::yes(*id)).collect(),
    ))
}

pub fn ordering(ids: &[&str]) -> Relationship {
    Relationship::Ordering(OrderingRelation::new(
        ids.iter().map(|id| Direction::yes(*id)).collect(),
    ))
}

pub fn general(directions: Vec<Direction>, maximum: f64) -> Relationship {
    Relationship::General(GeneralRelation::new(directions, maximum))
}

pub fn book(relationships: Vec<Relationship>) -> RelationshipBook {
    let mut book = RelationshipBook::default();
    for relationship in relationships {
        book.push(relationship);
    }
    book
}

/// Write `book` to `relations.json` under `dir` and return its store.
pub fn store_in(dir: &Path, book: &RelationshipBook) -> RelationshipStore {
    let store = RelationshipStore::new(dir.join("relations.json"));
    store.save(book).expect("write relationship document");
    store
}
