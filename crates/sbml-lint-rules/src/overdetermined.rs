//! Structural over-determination (rule 10601).
//!
//! # Rationale
//!
//! A model is overdetermined when some equation has no variable left for it
//! to determine. Equations are the assignment, rate and algebraic rules;
//! variables are the non-constant compartments, species, parameters and
//! species references. Each equation is linked to the variables it could
//! determine and a maximum bipartite matching is computed. An equation left
//! unmatched means the system over-constrains some variable.

use crate::templates::is_constant;
use sbml_lint_core::{
    CheckContext, HasAttributes, HasChildren, HasId, HasMath, Node, ObjectKind, ObjectRef,
    Predicate,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Predicate over a model: every equation can be matched to a distinct variable.
#[derive(Debug, Clone, Copy)]
pub struct Overdetermined;

impl Predicate for Overdetermined {
    fn holds(&self, ctx: &CheckContext<'_>, obj: ObjectRef<'_>) -> bool {
        let graph = EquationGraph::build(ctx.level(), obj.node());
        let matched = graph.maximum_matching();
        if matched < graph.equations() {
            debug!(
                equations = graph.equations(),
                variables = graph.variables,
                matched,
                "model is overdetermined"
            );
        }
        matched == graph.equations()
    }
}

/// Equations on the left, variables on the right, as adjacency lists.
#[derive(Debug, Default)]
struct EquationGraph {
    edges: Vec<Vec<usize>>,
    variables: usize,
}

impl EquationGraph {
    fn build(level: u32, model: &Node) -> Self {
        let mut candidates: Vec<&Node> = Vec::new();
        for list in ["listOfCompartments", "listOfSpecies", "listOfParameters"] {
            candidates.extend(
                model
                    .children_in(list)
                    .iter()
                    .filter(|node| !is_constant(level, node)),
            );
        }
        for reaction in model.children_in("listOfReactions") {
            for list in ["listOfReactants", "listOfProducts"] {
                candidates.extend(
                    reaction
                        .children_in(list)
                        .iter()
                        .filter(|sr| sr.flag("constant") == Some(false)),
                );
            }
        }

        let mut variables: BTreeMap<&str, usize> = BTreeMap::new();
        for id in candidates.iter().copied().filter_map(|node| node.id()) {
            let next = variables.len();
            variables.entry(id).or_insert(next);
        }

        let edges = model
            .children_in("listOfRules")
            .iter()
            .map(|rule| {
                let mut targets: Vec<usize> = match rule.kind() {
                    ObjectKind::AlgebraicRule => rule
                        .math()
                        .map(|m| m.identifiers())
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(|id| variables.get(id).copied())
                        .collect(),
                    _ => rule
                        .attribute("variable")
                        .and_then(|id| variables.get(id).copied())
                        .into_iter()
                        .collect(),
                };
                targets.sort_unstable();
                targets.dedup();
                targets
            })
            .collect();

        Self {
            edges,
            variables: variables.len(),
        }
    }

    fn equations(&self) -> usize {
        self.edges.len()
    }

    /// Size of a maximum matching (augmenting paths, one pass per equation).
    fn maximum_matching(&self) -> usize {
        let mut owner: Vec<Option<usize>> = vec![None; self.variables];
        let mut matched = 0;
        for equation in 0..self.edges.len() {
            let mut seen = vec![false; self.variables];
            if self.augment(equation, &mut seen, &mut owner) {
                matched += 1;
            }
        }
        matched
    }

    fn augment(&self, equation: usize, seen: &mut [bool], owner: &mut [Option<usize>]) -> bool {
        for &variable in &self.edges[equation] {
            if seen[variable] {
                continue;
            }
            seen[variable] = true;
            let free = match owner[variable] {
                None => true,
                Some(other) => self.augment(other, seen, owner),
            };
            if free {
                owner[variable] = Some(equation);
                return true;
            }
        }
        false
    }
}
