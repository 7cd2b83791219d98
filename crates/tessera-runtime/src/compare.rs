//! Structural equality over the scope forest.
//!
//! Two nodes are equal when they have the same concrete type and equal
//! attribute lists: same names in the same order, with equal datums.
//! Table elements compare the child subtrees they own. Pointer elements
//! compare their targets, except that a node's pointer to itself matches
//! the other node's pointer to itself. Pairs already under comparison
//! are assumed equal, so pointer cycles terminate.

use std::any::Any;

use tessera_core::{DatumType, NodeRef, ScopeError, ScopeId};

use crate::arena::ScopeArena;
use crate::datum::Datum;

impl ScopeArena {
    /// Whether `a` and `b` have the same parent and equal contents.
    pub fn scopes_equal(&self, a: ScopeId, b: ScopeId) -> Result<bool, ScopeError> {
        if self.parent(a)? != self.parent(b)? {
            return Ok(false);
        }
        Ok(Comparison::new(self).nodes(a, b))
    }

    /// Whether `a` and `b` are equal, comparing table and pointer elements
    /// by the contents of the nodes they reference.
    pub fn datums_equal(&self, a: &Datum, b: &Datum) -> bool {
        Comparison::new(self).datums(a, b, None)
    }
}

struct Comparison<'a> {
    arena: &'a ScopeArena,
    in_progress: Vec<(ScopeId, ScopeId)>,
}

impl<'a> Comparison<'a> {
    fn new(arena: &'a ScopeArena) -> Self {
        Self {
            arena,
            in_progress: Vec::new(),
        }
    }

    fn nodes(&mut self, a: ScopeId, b: ScopeId) -> bool {
        if a == b || self.in_progress.contains(&(a, b)) {
            return true;
        }
        let arena = self.arena;
        let (Ok(na), Ok(nb)) = (arena.node(a), arena.node(b)) else {
            return false;
        };
        if (na as &dyn Any).type_id() != (nb as &dyn Any).type_id() {
            return false;
        }
        let (sa, sb) = (na.scope(), nb.scope());
        if sa.len() != sb.len() {
            return false;
        }

        self.in_progress.push((a, b));
        let equal = sa
            .iter()
            .zip(sb.iter())
            .all(|((ka, da), (kb, db))| ka == kb && self.datums(da, db, Some((a, b))));
        self.in_progress.pop();
        equal
    }

    fn datums(&mut self, a: &Datum, b: &Datum, owners: Option<(ScopeId, ScopeId)>) -> bool {
        if a.datum_type() != b.datum_type() || a.len() != b.len() {
            return false;
        }
        match a.datum_type() {
            DatumType::Table => a
                .children()
                .iter()
                .zip(b.children())
                .all(|(x, y)| self.nodes(*x, *y)),
            DatumType::Pointer => match (a.to_vec::<NodeRef>(), b.to_vec::<NodeRef>()) {
                (Ok(xs), Ok(ys)) => xs
                    .into_iter()
                    .zip(ys)
                    .all(|(x, y)| self.pointers(x, y, owners)),
                _ => false,
            },
            _ => a == b,
        }
    }

    fn pointers(&mut self, x: NodeRef, y: NodeRef, owners: Option<(ScopeId, ScopeId)>) -> bool {
        match (x.get(), y.get()) {
            (None, None) => true,
            (Some(x), Some(y)) if owners == Some((x, y)) => true,
            (Some(x), Some(y)) => {
                let self_ref = owners.is_some_and(|(a, b)| x == a || y == b);
                !self_ref && self.nodes(x, y)
            }
            _ => false,
        }
    }
}
