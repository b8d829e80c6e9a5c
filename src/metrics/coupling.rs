//! Package-level coupling metrics after Robert C. Martin.
//!
//! For each package: afferent coupling Ca (distinct external types that
//! depend on the package), efferent coupling Ce (distinct external types the
//! package depends on), instability I = Ce/(Ca+Ce), abstractness A, and the
//! distance from the main sequence D = |A + I - 1|. Intra-package edges are
//! excluded from both Ca and Ce.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::{StructuralModel, TypeId};

use super::{Metric, MetricThreshold};

pub const DISTANCE_METRIC: &str = "architecture.coupling.distance";
pub const INSTABILITY_METRIC: &str = "architecture.coupling.instability";

const DISTANCE_THRESHOLD: f64 = 0.3;
/// High instability exceeds the threshold; this direction is intentional.
const INSTABILITY_THRESHOLD: f64 = 0.8;

/// Distance below this is treated as exactly on the main sequence.
const IDEAL_EPSILON: f64 = 1e-9;

/// Main-sequence zone classification for one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Exactly on the main sequence (D = 0).
    Ideal,
    /// Within the acceptable band around the main sequence (D <= 0.3).
    MainSequence,
    /// Stable and concrete (D > 0.3, I < 0.5): painful to change.
    ZoneOfPain,
    /// Unstable and abstract (D > 0.3, I >= 0.5): abstraction nobody leans on.
    ZoneOfUselessness,
}

/// Coupling numbers for one package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageCoupling {
    pub package: String,
    /// Distinct external types depending on this package.
    pub afferent: usize,
    /// Distinct external types this package depends on.
    pub efferent: usize,
    /// Fraction of abstract types (interfaces plus `Abstract…`/`…Base`).
    pub abstractness: f64,
}

impl PackageCoupling {
    /// I = Ce/(Ca+Ce); a package with no coupling at all is maximally
    /// stable by convention (I = 0).
    pub fn instability(&self) -> f64 {
        let total = self.afferent + self.efferent;
        if total == 0 {
            0.0
        } else {
            self.efferent as f64 / total as f64
        }
    }

    /// D = |A + I - 1|.
    pub fn distance(&self) -> f64 {
        (self.abstractness + self.instability() - 1.0).abs()
    }

    pub fn zone(&self) -> Zone {
        let d = self.distance();
        if d < IDEAL_EPSILON {
            Zone::Ideal
        } else if d <= DISTANCE_THRESHOLD {
            Zone::MainSequence
        } else if self.instability() < 0.5 {
            Zone::ZoneOfPain
        } else {
            Zone::ZoneOfUselessness
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.zone(), Zone::Ideal | Zone::MainSequence)
    }
}

/// Computes coupling numbers for every package in the model.
pub fn compute_package_coupling(model: &StructuralModel) -> BTreeMap<String, PackageCoupling> {
    let by_package = model.units_by_package();

    // Each package is independent; the final map is ordered regardless of
    // computation order.
    by_package
        .par_iter()
        .map(|(package, units)| {
            let members: BTreeSet<&TypeId> = units.iter().map(|u| &u.id).collect();

            let mut afferent: BTreeSet<&TypeId> = BTreeSet::new();
            let mut efferent: BTreeSet<&TypeId> = BTreeSet::new();
            for (from, to) in model.graph().edges() {
                if members.contains(to) && !members.contains(from) {
                    afferent.insert(from);
                }
                if members.contains(from) && !members.contains(to) {
                    efferent.insert(to);
                }
            }

            let abstract_count = units.iter().filter(|u| u.is_abstract()).count();
            let abstractness = if units.is_empty() {
                0.0
            } else {
                abstract_count as f64 / units.len() as f64
            };

            (
                package.to_string(),
                PackageCoupling {
                    package: package.to_string(),
                    afferent: afferent.len(),
                    efferent: efferent.len(),
                    abstractness,
                },
            )
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

/// Model-wide summary metrics: mean distance from the main sequence and the
/// worst (maximum) package instability.
pub fn compute_coupling_summary(model: &StructuralModel) -> Vec<Metric> {
    let packages = compute_package_coupling(model);

    if packages.is_empty() {
        return vec![
            Metric::new(
                DISTANCE_METRIC,
                0.0,
                "distance",
                "Mean distance from the main sequence (no packages found)",
            ),
            Metric::new(
                INSTABILITY_METRIC,
                0.0,
                "ratio",
                "Maximum package instability (no packages found)",
            ),
        ];
    }

    let mean_distance =
        packages.values().map(PackageCoupling::distance).sum::<f64>() / packages.len() as f64;
    let max_instability = packages
        .values()
        .map(PackageCoupling::instability)
        .fold(0.0_f64, f64::max);

    let unhealthy: Vec<&str> = packages
        .values()
        .filter(|p| !p.is_healthy())
        .map(|p| p.package.as_str())
        .collect();
    let distance_description = if unhealthy.is_empty() {
        format!("Mean distance from the main sequence across {} package(s)", packages.len())
    } else {
        format!(
            "Mean distance from the main sequence across {} package(s); off-sequence: {}",
            packages.len(),
            unhealthy.join(", ")
        )
    };

    vec![
        Metric::new(DISTANCE_METRIC, mean_distance, "distance", distance_description)
            .with_threshold(MetricThreshold::greater_than(DISTANCE_THRESHOLD)),
        Metric::new(
            INSTABILITY_METRIC,
            max_instability,
            "ratio",
            "Maximum package instability (Ce / (Ca + Ce)); high values mark volatile packages",
        )
        .with_threshold(MetricThreshold::greater_than(INSTABILITY_THRESHOLD)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Layer, Role, StructuralUnit, TypeKind};

    fn unit(id: &str, kind: TypeKind) -> StructuralUnit {
        StructuralUnit::new(id, kind, Layer::Unclassified, Role::Unclassified)
    }

    #[test]
    fn test_main_sequence_package_is_healthy() {
        // Ca=4, Ce=1, A=0.6 -> I=0.2, D=0.2 -> MainSequence.
        let coupling = PackageCoupling {
            package: "core".into(),
            afferent: 4,
            efferent: 1,
            abstractness: 0.6,
        };
        assert!((coupling.instability() - 0.2).abs() < 1e-9);
        assert!((coupling.distance() - 0.2).abs() < 1e-9);
        assert_eq!(coupling.zone(), Zone::MainSequence);
        assert!(coupling.is_healthy());
    }

    #[test]
    fn test_zone_of_uselessness() {
        // Ca=0, Ce=3, A=1.0 -> I=1.0, D=1.0 -> ZoneOfUselessness.
        let coupling = PackageCoupling {
            package: "abstractions".into(),
            afferent: 0,
            efferent: 3,
            abstractness: 1.0,
        };
        assert_eq!(coupling.instability(), 1.0);
        assert_eq!(coupling.distance(), 1.0);
        assert_eq!(coupling.zone(), Zone::ZoneOfUselessness);
        assert!(!coupling.is_healthy());
    }

    #[test]
    fn test_zone_of_pain() {
        let coupling = PackageCoupling {
            package: "legacy".into(),
            afferent: 9,
            efferent: 1,
            abstractness: 0.0,
        };
        assert!(coupling.instability() < 0.5);
        assert!(coupling.distance() > 0.3);
        assert_eq!(coupling.zone(), Zone::ZoneOfPain);
    }

    #[test]
    fn test_uncoupled_package_is_maximally_stable() {
        let coupling = PackageCoupling {
            package: "standalone".into(),
            afferent: 0,
            efferent: 0,
            abstractness: 1.0,
        };
        assert_eq!(coupling.instability(), 0.0);
        assert_eq!(coupling.zone(), Zone::Ideal);
    }

    #[test]
    fn test_intra_package_edges_excluded() {
        let mut model = StructuralModel::new();
        model.add_unit(unit("app.a.X", TypeKind::Class));
        model.add_unit(unit("app.a.Y", TypeKind::Class));
        model.add_unit(unit("app.b.Z", TypeKind::Class));
        model.add_dependency("app.a.X", "app.a.Y"); // intra: ignored
        model.add_dependency("app.a.X", "app.b.Z"); // efferent for a
        model.add_dependency("app.b.Z", "app.a.Y"); // afferent for a

        let packages = compute_package_coupling(&model);
        let a = &packages["app.a"];
        assert_eq!(a.afferent, 1);
        assert_eq!(a.efferent, 1);
    }

    #[test]
    fn test_distinct_counting() {
        // One external type referencing two members still counts once.
        let mut model = StructuralModel::new();
        model.add_unit(unit("app.a.X", TypeKind::Class));
        model.add_unit(unit("app.a.Y", TypeKind::Class));
        model.add_unit(unit("app.b.Z", TypeKind::Class));
        model.add_dependency("app.b.Z", "app.a.X");
        model.add_dependency("app.b.Z", "app.a.Y");

        let packages = compute_package_coupling(&model);
        assert_eq!(packages["app.a"].afferent, 1);
    }

    #[test]
    fn test_summary_on_empty_model() {
        let metrics = compute_coupling_summary(&StructuralModel::new());
        assert_eq!(metrics.len(), 2);
        assert!(metrics.iter().all(|m| m.value == 0.0 && !m.exceeds_threshold()));
    }

    #[test]
    fn test_high_instability_exceeds_threshold() {
        let mut model = StructuralModel::new();
        model.add_unit(unit("app.a.X", TypeKind::Class));
        model.add_unit(unit("app.b.Y", TypeKind::Class));
        model.add_dependency("app.a.X", "app.b.Y");

        let metrics = compute_coupling_summary(&model);
        let instability = metrics.iter().find(|m| m.name == INSTABILITY_METRIC).unwrap();
        // Package app.a has Ca=0, Ce=1 -> I=1.0 > 0.8.
        assert_eq!(instability.value, 1.0);
        assert!(instability.exceeds_threshold());
    }
}
