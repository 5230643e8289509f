use std::collections::BTreeMap;

use godep_core::{Unit, VisibilityPolicy};

/// Everything reached from the roots, keyed by package name.
///
/// Adjacency lives on each unit as its ordered dependency list; the map keeps
/// iteration sorted by name.
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    roots: Vec<String>,
    units: BTreeMap<String, Unit>,
    policy: VisibilityPolicy,
}

impl DepGraph {
    pub(crate) fn new(roots: Vec<String>, policy: VisibilityPolicy) -> Self {
        Self {
            roots,
            units: BTreeMap::new(),
            policy,
        }
    }

    /// Insert a unit. A name is only ever inserted once.
    pub(crate) fn insert(&mut self, unit: Unit) {
        debug_assert!(!self.units.contains_key(unit.name()), "unit resolved twice");
        self.units.insert(unit.name().to_string(), unit);
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn policy(&self) -> &VisibilityPolicy {
        &self.policy
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }

    /// All units, sorted by name.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn is_visible(&self, unit: &Unit) -> bool {
        !self.policy.is_filtered(unit)
    }

    /// Rendered units, sorted by name.
    pub fn visible_units(&self) -> impl Iterator<Item = &Unit> {
        self.units().filter(|u| self.is_visible(u))
    }

    /// Rendered dependencies of `unit`, in discovery order.
    pub fn visible_deps<'a>(&'a self, unit: &'a Unit) -> impl Iterator<Item = &'a Unit> + 'a {
        unit.deps()
            .iter()
            .filter_map(|dep| self.units.get(dep))
            .filter(|dep| self.is_visible(dep))
    }

    /// Units whose resolution failed.
    pub fn failed_units(&self) -> impl Iterator<Item = &Unit> {
        self.units().filter(|u| u.is_failed())
    }
}
