//! Many-to-many relationships seen as plain lists of the related entity.
//!
//! The owner keeps the join rows (`Vec<J>`); [`JoinList`] and [`JoinListFacade`]
//! borrow that vector and translate reads and writes into join-row
//! lookups, inserts and removals. They hold no rows of their own, so whatever
//! is saved from the owner's vector is exactly what the facade showed.

use std::marker::PhantomData;

use crate::entity::{Entity, same_identity};

/// A join row that links an owner of type `O` to a related entity of type `R`.
///
/// One row type usually implements this twice, once per direction.
pub trait JoinedEntity<O, R> {
    /// Build the row pairing `owner_id` with `related`.
    fn join(owner_id: i64, related: R) -> Self;
    /// Key of the related side.
    fn related_id(&self) -> i64;
    /// The related entity, when it was loaded alongside the row.
    fn related(&self) -> Option<&R>;
}

/// Read-only projection of join rows onto the related entities.
pub struct JoinList<'a, O, R, J> {
    rows: &'a [J],
    _marker: PhantomData<fn() -> (O, R)>,
}

impl<'a, O, R, J> JoinList<'a, O, R, J>
where
    R: Entity + 'a,
    J: JoinedEntity<O, R>,
{
    pub fn new(rows: &'a [J]) -> Self {
        Self {
            rows,
            _marker: PhantomData,
        }
    }

    /// Related entities in join-row order. Rows whose related side was not loaded are skipped.
    pub fn iter(&self) -> impl Iterator<Item = &'a R> {
        self.rows.iter().filter_map(|row| row.related())
    }

    /// Keys of the related side of every join row, loaded or not, in join-row order.
    pub fn ids(&self) -> Vec<i64> {
        self.rows.iter().map(|row| row.related_id()).collect()
    }

    /// Number of entities [`iter`](Self::iter) yields.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn contains(&self, related: &R) -> bool {
        self.position(related).is_some()
    }

    fn position(&self, related: &R) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| same_identity(row.related_id(), related.id()))
    }
}

/// Mutable projection: adding or removing a related entity adds or removes its join row.
pub struct JoinListFacade<'a, O, R, J> {
    owner_id: i64,
    rows: &'a mut Vec<J>,
    _marker: PhantomData<fn() -> (O, R)>,
}

impl<'a, O, R, J> JoinListFacade<'a, O, R, J>
where
    R: Entity,
    J: JoinedEntity<O, R>,
{
    pub fn new(owner_id: i64, rows: &'a mut Vec<J>) -> Self {
        Self {
            owner_id,
            rows,
            _marker: PhantomData,
        }
    }

    pub fn view(&self) -> JoinList<'_, O, R, J> {
        JoinList::new(self.rows.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.iter().filter_map(|row| row.related())
    }

    pub fn len(&self) -> usize {
        self.view().len()
    }

    pub fn is_empty(&self) -> bool {
        self.view().is_empty()
    }

    pub fn contains(&self, related: &R) -> bool {
        self.view().contains(related)
    }

    /// Append a join row for `related` unless one already exists.
    /// Returns whether a row was added.
    pub fn add(&mut self, related: R) -> bool {
        if self.contains(&related) {
            return false;
        }
        self.rows.push(J::join(self.owner_id, related));
        true
    }

    /// Drop the join row for `related`. Returns whether a row was removed.
    pub fn remove(&mut self, related: &R) -> bool {
        let position = self.view().position(related);
        match position {
            Some(index) => {
                self.rows.remove(index);
                true
            }
            None => false,
        }
    }
}
