//! Batch planner - partitions a resolved module set into ordered batches
//!
//! The host keeps a single process-wide command table with a fixed
//! capacity. Installing a large module family in one go can exhaust it, so
//! modules are split into four batches with a fixed order:
//!
//! 1. `core` - everything outside the bulk family and the service set
//! 2. `bulk-essential` - allow-listed foundations of the bulk family
//! 3. `bulk-remainder` - the rest of the family, in groups of
//!    `capacity.bulk_group_size` (one at a time by default)
//! 4. `service` - service-specific connectors

use crate::types::{BatchKind, PlannedModule};
use manifest::{Capacity, ClassificationRules, ResolvedModuleSet};
use serde::Serialize;

/// An ordered group of modules
///
/// `groups` are installed one after another; every group but those of
/// `bulk-remainder` holds the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    pub kind: BatchKind,
    pub groups: Vec<Vec<PlannedModule>>,
}

impl Batch {
    fn new(kind: BatchKind) -> Self {
        Self {
            kind,
            groups: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Every module in the batch, in install order
    pub fn members(&self) -> impl Iterator<Item = &PlannedModule> {
        self.groups.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The full ordered set of batches for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub batches: Vec<Batch>,
}

impl Plan {
    /// Every module in the plan, in install order
    pub fn members(&self) -> impl Iterator<Item = &PlannedModule> {
        self.batches.iter().flat_map(Batch::members)
    }

    /// Total number of modules in the plan
    pub fn total_modules(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.total_modules() == 0
    }

    /// Batches that contain at least one module
    pub fn non_empty(&self) -> impl Iterator<Item = &Batch> {
        self.batches.iter().filter(|b| !b.is_empty())
    }

    /// Find a batch by kind
    pub fn batch(&self, kind: BatchKind) -> Option<&Batch> {
        self.batches.iter().find(|b| b.kind == kind)
    }
}

/// Assign a module to its batch.
///
/// The explicit service set wins over the bulk prefix.
pub fn classify(rules: &ClassificationRules, module: &str) -> BatchKind {
    if rules.is_service_specific(module) {
        BatchKind::Service
    } else if rules.is_bulk(module) {
        if rules.is_essential(module) {
            BatchKind::BulkEssential
        } else {
            BatchKind::BulkRemainder
        }
    } else {
        BatchKind::Core
    }
}

/// Build a plan from a resolved module set.
///
/// Always returns the four batches in fixed order, some possibly empty.
pub fn plan(
    modules: &ResolvedModuleSet,
    rules: &ClassificationRules,
    capacity: &Capacity,
) -> Plan {
    let mut buckets: Vec<(BatchKind, Vec<PlannedModule>)> =
        BatchKind::ORDER.iter().map(|k| (*k, Vec::new())).collect();

    for (name, version) in modules.iter() {
        let kind = classify(rules, name);
        log::trace!("{name} -> {kind}");
        if let Some((_, bucket)) = buckets.iter_mut().find(|(k, _)| *k == kind) {
            bucket.push(PlannedModule {
                name: name.clone(),
                version: version.clone(),
            });
        }
    }

    let group_size = capacity.bulk_group_size.max(1);
    let batches = buckets
        .into_iter()
        .map(|(kind, members)| {
            let mut batch = Batch::new(kind);
            if members.is_empty() {
                return batch;
            }
            batch.groups = match kind {
                BatchKind::BulkRemainder => members
                    .chunks(group_size)
                    .map(<[PlannedModule]>::to_vec)
                    .collect(),
                _ => vec![members],
            };
            batch
        })
        .collect();

    Plan { batches }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifest::VersionConstraint;
    use std::collections::HashSet;

    fn rules() -> ClassificationRules {
        ClassificationRules {
            bulk_prefixes: vec!["Graph.".into()],
            essential: vec!["Graph.Auth".into()],
            service_specific: vec!["Teams".into(), "Graph.Teams".into()],
        }
    }

    fn set(names: &[&str]) -> ResolvedModuleSet {
        names
            .iter()
            .map(|n| (n.to_string(), VersionConstraint::Latest))
            .collect()
    }

    #[test]
    fn test_classify() {
        let rules = rules();
        assert_eq!(classify(&rules, "Az.Accounts"), BatchKind::Core);
        assert_eq!(classify(&rules, "Graph.Auth"), BatchKind::BulkEssential);
        assert_eq!(classify(&rules, "Graph.Users"), BatchKind::BulkRemainder);
        assert_eq!(classify(&rules, "Teams"), BatchKind::Service);
        assert_eq!(classify(&rules, "Graph.Teams"), BatchKind::Service);
    }

    #[test]
    fn test_plan_scenario_bulk_remainder_individual() {
        let modules = set(&["Graph.Users", "Core.A", "Graph.Auth", "Graph.Mail", "Core.B"]);
        let plan = plan(&modules, &rules(), &Capacity::default());

        let kinds: Vec<BatchKind> = plan.batches.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, BatchKind::ORDER.to_vec());

        let core = plan.batch(BatchKind::Core).unwrap();
        assert_eq!(core.groups.len(), 1);
        assert_eq!(core.len(), 2);

        let essential = plan.batch(BatchKind::BulkEssential).unwrap();
        assert_eq!(essential.groups, vec![vec![PlannedModule {
            name: "Graph.Auth".into(),
            version: VersionConstraint::Latest,
        }]]);

        let remainder = plan.batch(BatchKind::BulkRemainder).unwrap();
        assert_eq!(remainder.groups.len(), 2);
        assert!(remainder.groups.iter().all(|g| g.len() == 1));
        assert_eq!(remainder.groups[0][0].name, "Graph.Users");
        assert_eq!(remainder.groups[1][0].name, "Graph.Mail");

        assert!(plan.batch(BatchKind::Service).unwrap().is_empty());
        assert_eq!(plan.non_empty().count(), 3);
    }

    #[test]
    fn test_plan_is_complete() {
        let modules = set(&[
            "Core.A", "Graph.Auth", "Graph.B", "Graph.C", "Graph.D", "Teams", "Core.Z",
        ]);
        let plan = plan(&modules, &rules(), &Capacity { bulk_group_size: 2 });

        let planned: Vec<&str> = plan.members().map(|m| m.name.as_str()).collect();
        let unique: HashSet<&str> = planned.iter().copied().collect();
        let expected: HashSet<&str> = modules.names().map(String::as_str).collect();

        assert_eq!(planned.len(), modules.len());
        assert_eq!(unique, expected);
        assert_eq!(plan.total_modules(), 7);
    }

    #[test]
    fn test_capacity_chunks_bulk_remainder() {
        let modules = set(&["Graph.B", "Graph.C", "Graph.D"]);
        let plan = plan(&modules, &rules(), &Capacity { bulk_group_size: 2 });
        let sizes: Vec<usize> = plan
            .batch(BatchKind::BulkRemainder)
            .unwrap()
            .groups
            .iter()
            .map(Vec::len)
            .collect();
        assert_eq!(sizes, vec![2, 1]);
    }

    #[test]
    fn test_zero_capacity_treated_as_one() {
        let modules = set(&["Graph.B", "Graph.C"]);
        let plan = plan(&modules, &rules(), &Capacity { bulk_group_size: 0 });
        assert_eq!(plan.batch(BatchKind::BulkRemainder).unwrap().groups.len(), 2);
    }

    #[test]
    fn test_empty_rules_put_everything_in_core() {
        let modules = set(&["Graph.Users", "Teams"]);
        let plan = plan(&modules, &ClassificationRules::default(), &Capacity::default());
        assert_eq!(plan.batch(BatchKind::Core).unwrap().len(), 2);
        assert_eq!(plan.non_empty().count(), 1);
    }

    #[test]
    fn test_empty_set() {
        let plan = plan(&ResolvedModuleSet::new(), &rules(), &Capacity::default());
        assert!(plan.is_empty());
        assert_eq!(plan.batches.len(), 4);
    }
}
