use crate::error::{EntityKind, FlowError};
use crate::model::Flow;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use std::fmt;

/// A single broken invariant found in a `Flow`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Violation {
    DuplicateId { kind: EntityKind, id: String },
    DanglingVariant { step_id: String, variant_id: String },
    DanglingEdgeSource { edge_id: String, variant_id: String },
    DanglingEdgeTarget { edge_id: String, step_id: String },
    SharedVariant { variant_id: String, step_ids: Vec<String> },
    RepeatedVariant { step_id: String, variant_id: String },
    DuplicateEdge { from_variant_id: String, to_step_id: String },
    MultipleWinners { step_id: String, variant_ids: Vec<String> },
    LaunchedWithoutWinner { variant_id: String },
    EmptyStepTitle { step_id: String },
    TrafficOutOfRange { variant_id: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DuplicateId { kind, id } => write!(f, "duplicate {} id '{}'", kind, id),
            Violation::DanglingVariant {
                step_id,
                variant_id,
            } => write!(
                f,
                "step '{}' lists unknown variant '{}'",
                step_id, variant_id
            ),
            Violation::DanglingEdgeSource {
                edge_id,
                variant_id,
            } => write!(
                f,
                "edge '{}' starts at unknown variant '{}'",
                edge_id, variant_id
            ),
            Violation::DanglingEdgeTarget { edge_id, step_id } => {
                write!(f, "edge '{}' ends at unknown step '{}'", edge_id, step_id)
            }
            Violation::SharedVariant {
                variant_id,
                step_ids,
            } => write!(
                f,
                "variant '{}' is owned by several steps: {}",
                variant_id,
                step_ids.join(", ")
            ),
            Violation::RepeatedVariant {
                step_id,
                variant_id,
            } => write!(
                f,
                "step '{}' lists variant '{}' more than once",
                step_id, variant_id
            ),
            Violation::DuplicateEdge {
                from_variant_id,
                to_step_id,
            } => write!(
                f,
                "more than one edge from '{}' to '{}'",
                from_variant_id, to_step_id
            ),
            Violation::MultipleWinners {
                step_id,
                variant_ids,
            } => write!(
                f,
                "step '{}' has several winners: {}",
                step_id,
                variant_ids.join(", ")
            ),
            Violation::LaunchedWithoutWinner { variant_id } => {
                write!(f, "variant '{}' is launched but not a winner", variant_id)
            }
            Violation::EmptyStepTitle { step_id } => {
                write!(f, "step '{}' has an empty title", step_id)
            }
            Violation::TrafficOutOfRange { variant_id } => {
                write!(f, "variant '{}' has traffic outside 0..=100", variant_id)
            }
        }
    }
}

/// Checks every structural invariant of a flow.
///
/// Returns all violations found rather than stopping at the first one.
pub fn validate(flow: &Flow) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    // 1. Unique ids per collection.
    for id in flow.steps.iter().map(|s| &s.id).duplicates() {
        violations.push(Violation::DuplicateId {
            kind: EntityKind::Step,
            id: id.clone(),
        });
    }
    for id in flow.variants.iter().map(|v| &v.id).duplicates() {
        violations.push(Violation::DuplicateId {
            kind: EntityKind::Variant,
            id: id.clone(),
        });
    }
    for id in flow.edges.iter().map(|e| &e.id).duplicates() {
        violations.push(Violation::DuplicateId {
            kind: EntityKind::Edge,
            id: id.clone(),
        });
    }

    let step_ids: AHashSet<&str> = flow.steps.iter().map(|s| s.id.as_str()).collect();
    let variant_ids: AHashSet<&str> = flow.variants.iter().map(|v| v.id.as_str()).collect();

    // 2. Step membership: no dangling or repeated ids, no variant owned twice.
    let mut owners: AHashMap<&str, Vec<String>> = AHashMap::new();
    for step in &flow.steps {
        if step.title.trim().is_empty() {
            violations.push(Violation::EmptyStepTitle {
                step_id: step.id.clone(),
            });
        }
        for variant_id in step.variant_ids.iter().duplicates() {
            violations.push(Violation::RepeatedVariant {
                step_id: step.id.clone(),
                variant_id: variant_id.clone(),
            });
        }
        for variant_id in step.variant_ids.iter().unique() {
            if !variant_ids.contains(variant_id.as_str()) {
                violations.push(Violation::DanglingVariant {
                    step_id: step.id.clone(),
                    variant_id: variant_id.clone(),
                });
            }
            owners
                .entry(variant_id.as_str())
                .or_default()
                .push(step.id.clone());
        }
    }
    for (variant_id, step_ids) in owners
        .into_iter()
        .filter(|(_, steps)| steps.len() > 1)
        .sorted_by(|a, b| a.0.cmp(b.0))
    {
        violations.push(Violation::SharedVariant {
            variant_id: variant_id.to_string(),
            step_ids,
        });
    }

    // 3. Edge endpoints exist and no pair is repeated.
    for edge in &flow.edges {
        if !variant_ids.contains(edge.from_variant_id.as_str()) {
            violations.push(Violation::DanglingEdgeSource {
                edge_id: edge.id.clone(),
                variant_id: edge.from_variant_id.clone(),
            });
        }
        if !step_ids.contains(edge.to_step_id.as_str()) {
            violations.push(Violation::DanglingEdgeTarget {
                edge_id: edge.id.clone(),
                step_id: edge.to_step_id.clone(),
            });
        }
    }
    for (from, to) in flow
        .edges
        .iter()
        .map(|e| (&e.from_variant_id, &e.to_step_id))
        .duplicates()
    {
        violations.push(Violation::DuplicateEdge {
            from_variant_id: from.clone(),
            to_step_id: to.clone(),
        });
    }

    // 4. Winner and launch rules.
    for step in &flow.steps {
        let winners: Vec<String> = flow
            .variants_of(step)
            .filter(|v| v.winner)
            .map(|v| v.id.clone())
            .unique()
            .collect();
        if winners.len() > 1 {
            violations.push(Violation::MultipleWinners {
                step_id: step.id.clone(),
                variant_ids: winners,
            });
        }
    }
    for variant in &flow.variants {
        if variant.launched && !variant.winner {
            violations.push(Violation::LaunchedWithoutWinner {
                variant_id: variant.id.clone(),
            });
        }
        if !(0.0..=100.0).contains(&variant.traffic_percent) {
            violations.push(Violation::TrafficOutOfRange {
                variant_id: variant.id.clone(),
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Post-condition check for a mutation: fails only on violations present in
/// `after` that were not already present in `before`.
pub(crate) fn ensure_no_new_violations(
    operation: &str,
    before: &Flow,
    after: Flow,
) -> Result<Flow, FlowError> {
    let Err(found) = validate(&after) else {
        return Ok(after);
    };
    let existing: AHashSet<Violation> = validate(before).err().unwrap_or_default().into_iter().collect();
    let introduced: Vec<String> = found
        .into_iter()
        .filter(|v| !existing.contains(v))
        .map(|v| v.to_string())
        .collect();

    if introduced.is_empty() {
        Ok(after)
    } else {
        tracing::error!(
            operation,
            violations = ?introduced,
            "mutation broke flow invariants"
        );
        Err(FlowError::InvariantViolation(introduced))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Status, Step, Variant};

    fn variant(id: &str) -> Variant {
        Variant::new(id.to_string(), id.to_string(), 50.0, Status::Running)
    }

    #[test]
    fn reports_dangling_and_shared_references() {
        let mut a = Step::new("a".into(), "A".into(), Status::Running);
        a.variant_ids = vec!["v1".into(), "ghost".into()];
        let mut b = Step::new("b".into(), "B".into(), Status::Running);
        b.variant_ids = vec!["v1".into()];
        let flow = Flow {
            steps: vec![a, b],
            variants: vec![variant("v1")],
            edges: vec![Edge {
                id: "e1".into(),
                from_variant_id: "v1".into(),
                to_step_id: "nowhere".into(),
                external_ref: None,
            }],
        };

        let violations = validate(&flow).unwrap_err();
        assert!(violations.contains(&Violation::DanglingVariant {
            step_id: "a".into(),
            variant_id: "ghost".into(),
        }));
        assert!(violations.contains(&Violation::SharedVariant {
            variant_id: "v1".into(),
            step_ids: vec!["a".into(), "b".into()],
        }));
        assert!(violations.contains(&Violation::DanglingEdgeTarget {
            edge_id: "e1".into(),
            step_id: "nowhere".into(),
        }));
    }

    #[test]
    fn reports_winner_and_launch_rules() {
        let mut step = Step::new("s".into(), "S".into(), Status::Running);
        step.variant_ids = vec!["v1".into(), "v2".into()];
        let mut v1 = variant("v1");
        v1.winner = true;
        let mut v2 = variant("v2");
        v2.winner = true;
        let mut v3 = variant("v3");
        v3.launched = true;
        let flow = Flow {
            steps: vec![step],
            variants: vec![v1, v2, v3],
            edges: vec![],
        };

        let violations = validate(&flow).unwrap_err();
        assert!(violations.contains(&Violation::MultipleWinners {
            step_id: "s".into(),
            variant_ids: vec!["v1".into(), "v2".into()],
        }));
        assert!(violations.contains(&Violation::LaunchedWithoutWinner {
            variant_id: "v3".into()
        }));
    }

    #[test]
    fn pre_existing_violations_are_not_blamed_on_the_operation() {
        let mut step = Step::new("s".into(), "S".into(), Status::Running);
        step.variant_ids = vec!["ghost".into()];
        let before = Flow {
            steps: vec![step],
            ..Flow::default()
        };
        let mut after = before.clone();
        after.steps[0].title = "Renamed".into();

        assert!(ensure_no_new_violations("rename", &before, after).is_ok());
    }

    #[test]
    fn introduced_violation_fails_the_operation() {
        let mut step = Step::new("s".into(), "S".into(), Status::Running);
        step.variant_ids = vec!["v1".into(), "v2".into()];
        let mut v1 = variant("v1");
        v1.winner = true;
        let before = Flow {
            steps: vec![step],
            variants: vec![v1, variant("v2")],
            edges: vec![],
        };
        let mut after = before.clone();
        after.variants[1].winner = true;

        match ensure_no_new_violations("mark_winner", &before, after) {
            Err(FlowError::InvariantViolation(msgs)) => {
                assert_eq!(msgs.len(), 1);
                assert!(msgs[0].contains("v2"));
            }
            other => panic!("expected invariant violation, got {:?}", other),
        }
    }
}
