//! Ordered collections of constraints enabled and disabled together.
//!
//! A [`Group`] is built explicitly ([`Group::push`], `FromIterator`) or
//! by recording every constraint created through a [`GroupScope`]
//! inside [`Solver::group`].

use log::{debug, warn};

use weft_constraint::{BuildError, ConstraintBuilder, ConstraintDef};
use weft_core::{ConstraintId, Strength};

use crate::error::SolveError;
use crate::solver::Solver;

/// One entry of a [`Group`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupMember {
    /// A single constraint.
    Constraint(ConstraintId),
    /// A nested group.
    Group(Group),
}

/// Constraints and nested groups in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    members: Vec<GroupMember>,
}

impl Group {
    /// An empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a constraint.
    pub fn push(&mut self, c: ConstraintId) -> &mut Self {
        self.members.push(GroupMember::Constraint(c));
        self
    }

    /// Append a nested group.
    pub fn push_group(&mut self, group: Group) -> &mut Self {
        self.members.push(GroupMember::Group(group));
        self
    }

    /// Direct members.
    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    /// Number of direct members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Every constraint, nested groups expanded in place.
    pub fn constraints(&self) -> Vec<ConstraintId> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect(&self, out: &mut Vec<ConstraintId>) {
        for member in &self.members {
            match member {
                GroupMember::Constraint(c) => out.push(*c),
                GroupMember::Group(g) => g.collect(out),
            }
        }
    }
}

impl FromIterator<ConstraintId> for Group {
    fn from_iter<I: IntoIterator<Item = ConstraintId>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().map(GroupMember::Constraint).collect(),
        }
    }
}

impl Extend<ConstraintId> for Group {
    fn extend<I: IntoIterator<Item = ConstraintId>>(&mut self, iter: I) {
        self.members
            .extend(iter.into_iter().map(GroupMember::Constraint));
    }
}

/// Records the constraints created while building a group.
///
/// Constraints created through the scope are disabled; enable them
/// together with [`Solver::enable_group`]. The underlying solver stays
/// reachable through [`solver`](Self::solver) for creating variables.
pub struct GroupScope<'a, T> {
    solver: &'a mut Solver<T>,
    group: Group,
}

impl<T: Clone + 'static> GroupScope<'_, T> {
    /// The solver being built into.
    pub fn solver(&mut self) -> &mut Solver<T> {
        self.solver
    }

    /// Insert a disabled constraint and record it.
    pub fn insert(&mut self, def: ConstraintDef<T>) -> Result<ConstraintId, SolveError> {
        let c = self.solver.insert(def)?;
        self.group.push(c);
        Ok(c)
    }

    /// Declare a disabled constraint and record it.
    pub fn constraint<F>(&mut self, strength: Strength, f: F) -> Result<ConstraintId, SolveError>
    where
        F: FnOnce(&mut ConstraintBuilder<T>) -> Result<(), BuildError>,
    {
        let c = self.solver.build_constraint(strength, f)?;
        self.group.push(c);
        Ok(c)
    }

    /// Record an existing constraint.
    pub fn add(&mut self, c: ConstraintId) -> Result<(), SolveError> {
        self.solver.cons(c)?;
        self.group.push(c);
        Ok(())
    }

    /// Build a nested group and record it as one member.
    pub fn group<F>(&mut self, f: F) -> Result<(), SolveError>
    where
        F: FnOnce(&mut GroupScope<'_, T>) -> Result<(), SolveError>,
    {
        let nested = self.solver.group(f)?;
        self.group.push_group(nested);
        Ok(())
    }
}

impl<T: Clone + 'static> Solver<T> {
    /// Collect the constraints created inside `f` into a group.
    ///
    /// On error the constraints created so far stay in the solver,
    /// disabled.
    pub fn group<F>(&mut self, f: F) -> Result<Group, SolveError>
    where
        F: FnOnce(&mut GroupScope<'_, T>) -> Result<(), SolveError>,
    {
        let mut scope = GroupScope {
            solver: self,
            group: Group::new(),
        };
        f(&mut scope)?;
        Ok(scope.group)
    }

    /// Enable every constraint of `group` in declaration order.
    ///
    /// If one fails, the constraints this call enabled are disabled
    /// again in reverse order before the error is returned.
    pub fn enable_group(&mut self, group: &Group) -> Result<(), SolveError> {
        let members = group.constraints();
        debug!("enabling group of {} constraint(s)", members.len());
        let mut enabled = Vec::with_capacity(members.len());
        for c in members {
            if self.is_enabled(c)? {
                continue;
            }
            if let Err(err) = self.enable(c) {
                if self.is_enabled(c).unwrap_or(false) {
                    enabled.push(c);
                }
                warn!("enabling group member {c} failed: {err}; rolling back");
                for done in enabled.into_iter().rev() {
                    if let Err(undo) = self.disable(done) {
                        warn!("disabling {done} during rollback: {undo}");
                    }
                }
                return Err(err);
            }
            enabled.push(c);
        }
        Ok(())
    }

    /// Disable every constraint of `group` in reverse declaration order.
    ///
    /// Every member is attempted; the first error is returned.
    pub fn disable_group(&mut self, group: &Group) -> Result<(), SolveError> {
        let members = group.constraints();
        debug!("disabling group of {} constraint(s)", members.len());
        let mut first_err = None;
        for c in members.into_iter().rev() {
            if let Err(err) = self.disable(c) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(i: u32) -> ConstraintId {
        ConstraintId::new(i, 0)
    }

    #[test]
    fn nested_groups_flatten_in_order() {
        let inner: Group = [c(1), c(2)].into_iter().collect();
        let mut outer = Group::new();
        outer.push(c(0)).push_group(inner).push(c(3));
        assert_eq!(outer.len(), 3);
        assert_eq!(outer.constraints(), vec![c(0), c(1), c(2), c(3)]);
    }

    #[test]
    fn extend_appends_constraints() {
        let mut g = Group::new();
        assert!(g.is_empty());
        g.extend([c(4), c(5)]);
        assert_eq!(
            g.members(),
            &[GroupMember::Constraint(c(4)), GroupMember::Constraint(c(5))]
        );
    }

    #[test]
    fn scope_records_created_constraints() {
        let mut s = Solver::<i32>::new();
        let mut created = Vec::new();
        let group = s
            .group(|scope| {
                let v = scope.solver().variable(1)?;
                created.push(scope.constraint(Strength::Medium, |b| {
                    b.stay(v)?;
                    Ok(())
                })?);
                scope.group(|inner| {
                    let w = inner.solver().variable(2)?;
                    created.push(inner.constraint(Strength::Weak, |b| {
                        b.stay(w)?;
                        Ok(())
                    })?);
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group.constraints(), created);
        assert!(created.iter().all(|&c| !s.is_enabled(c).unwrap()));
    }

    #[test]
    fn disable_group_runs_in_reverse() {
        let mut s = Solver::<i32>::new();
        let v = s.variable(0).unwrap();
        let weak = s
            .build_constraint(Strength::Weak, |b| {
                b.constant(v, 1)?;
                Ok(())
            })
            .unwrap();
        let strong = s
            .build_constraint(Strength::Strong, |b| {
                b.constant(v, 2)?;
                Ok(())
            })
            .unwrap();
        let group: Group = [weak, strong].into_iter().collect();
        s.enable_group(&group).unwrap();
        assert_eq!(s.value(v).unwrap(), 2);

        s.disable_group(&group).unwrap();
        assert!(!s.is_enabled(weak).unwrap());
        assert!(!s.is_enabled(strong).unwrap());
        assert_eq!(s.value(v).unwrap(), 1);
    }
}
