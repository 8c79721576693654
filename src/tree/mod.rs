// Decision tree: a flat table of predicate nodes addressed by stable integer
// id, evaluated over one indicator snapshot. The table is data, not code, so
// a rule set can be serialized, versioned, and validated independently.

pub mod reference;

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SignalError;
use crate::indicators::IndicatorSnapshot;
use crate::signals::Signal;

pub type NodeId = u32;

/// Comparison over raw f64 indicator values. No epsilon, no rounding; the
/// thresholds were tuned against exact readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Op {
    fn apply(self, left: f64, right: f64) -> bool {
        match self {
            Op::Lt => left < right,
            Op::Le => left <= right,
            Op::Gt => left > right,
            Op::Ge => left >= right,
            Op::Eq => left == right,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Eq => "==",
        }
    }
}

/// Reference to one RSI reading in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRef {
    pub ticker: String,
    pub window: usize,
}

impl fmt::Display for IndicatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} RSI({})", self.ticker, self.window)
    }
}

/// A branch-node condition: indicator vs constant threshold, or indicator
/// vs indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Predicate {
    Threshold {
        indicator: IndicatorRef,
        op: Op,
        threshold: f64,
    },
    Pairwise {
        left: IndicatorRef,
        op: Op,
        right: IndicatorRef,
    },
}

impl Predicate {
    /// Evaluate against a snapshot. Returns the branch decision plus the
    /// observed value(s) for tracing: the left-hand reading, and the
    /// right-hand reading for pairwise comparisons. A missing reading fails
    /// with `IncompleteSnapshot`; there is no default branch.
    pub fn evaluate(
        &self,
        snapshot: &IndicatorSnapshot,
    ) -> Result<(bool, f64, Option<f64>), SignalError> {
        match self {
            Predicate::Threshold { indicator, op, threshold } => {
                let value = snapshot.get(&indicator.ticker, indicator.window)?;
                Ok((op.apply(value, *threshold), value, None))
            }
            Predicate::Pairwise { left, op, right } => {
                let lhs = snapshot.get(&left.ticker, left.window)?;
                let rhs = snapshot.get(&right.ticker, right.window)?;
                Ok((op.apply(lhs, rhs), lhs, Some(rhs)))
            }
        }
    }

    /// Indicator readings this predicate consumes.
    pub fn references(&self) -> Vec<&IndicatorRef> {
        match self {
            Predicate::Threshold { indicator, .. } => vec![indicator],
            Predicate::Pairwise { left, right, .. } => vec![left, right],
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Threshold { indicator, op, threshold } => {
                write!(f, "{} {} {}", indicator, op.symbol(), threshold)
            }
            Predicate::Pairwise { left, op, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
        }
    }
}

/// Terminal payload of a leaf node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// A fixed signal.
    Fixed { signal: Signal },
    /// Buy the two candidates with the lowest RSI(window). Equal readings
    /// keep candidate-list order, so the ranking is deterministic.
    BottomPair { candidates: Vec<String>, window: usize },
}

impl Outcome {
    fn resolve(&self, snapshot: &IndicatorSnapshot) -> Result<Signal, SignalError> {
        match self {
            Outcome::Fixed { signal } => Ok(signal.clone()),
            Outcome::BottomPair { candidates, window } => {
                let mut ranked: Vec<(&str, f64)> = Vec::with_capacity(candidates.len());
                for ticker in candidates {
                    ranked.push((ticker.as_str(), snapshot.get(ticker, *window)?));
                }
                // sort_by is stable: ties keep candidate order.
                ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
                match ranked.as_slice() {
                    [(first, _), (second, _), ..] => Ok(Signal::BuyPair {
                        first: first.to_string(),
                        second: second.to_string(),
                    }),
                    _ => Err(SignalError::MalformedTree {
                        reason: "bottom-pair terminal needs at least two candidates".to_string(),
                    }),
                }
            }
        }
    }
}

/// A validated node: exactly one of {children, payload}.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Branch {
        predicate: Predicate,
        on_true: NodeId,
        on_false: NodeId,
    },
    Leaf {
        outcome: Outcome,
    },
}

/// Unvalidated node as it appears in a tree file. `DecisionTree::from_raw`
/// enforces that exactly one of {predicate + children, outcome} is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Predicate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_true: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_false: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

/// Serialized form of a whole tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTree {
    pub root: NodeId,
    pub nodes: BTreeMap<NodeId, RawNode>,
}

/// One traversal step, recorded for reporting and logging.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    pub node: NodeId,
    pub predicate: Predicate,
    /// Left-hand (or only) observed reading.
    pub observed: f64,
    /// Right-hand observed reading, for pairwise predicates.
    pub observed_right: Option<f64>,
    pub result: bool,
}

/// A fixed, validated decision graph.
///
/// Structure is checked once at construction: every referenced id defined,
/// no cycles, every node reachable from the root. Leaves may be shared
/// between branches, so the graph is a rooted DAG rather than a literal
/// tree; traversal is still bounded by depth and total.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    root: NodeId,
    nodes: BTreeMap<NodeId, Node>,
}

impl DecisionTree {
    /// Validate and seal a node table.
    pub fn new(root: NodeId, nodes: BTreeMap<NodeId, Node>) -> Result<Self, SignalError> {
        let tree = Self { root, nodes };
        tree.validate()?;
        Ok(tree)
    }

    /// Convert an unvalidated table into a tree, rejecting nodes that carry
    /// both children and a payload, or neither.
    pub fn from_raw(raw: RawTree) -> Result<Self, SignalError> {
        let mut nodes = BTreeMap::new();
        for (id, raw_node) in raw.nodes {
            let node = match raw_node {
                RawNode {
                    predicate: Some(predicate),
                    on_true: Some(on_true),
                    on_false: Some(on_false),
                    outcome: None,
                } => Node::Branch { predicate, on_true, on_false },
                RawNode {
                    predicate: None,
                    on_true: None,
                    on_false: None,
                    outcome: Some(outcome),
                } => Node::Leaf { outcome },
                RawNode { outcome: Some(_), .. } => {
                    return Err(SignalError::MalformedTree {
                        reason: format!("node {id} has both branch fields and a payload"),
                    })
                }
                _ => {
                    return Err(SignalError::MalformedTree {
                        reason: format!("node {id} has neither a complete branch nor a payload"),
                    })
                }
            };
            nodes.insert(id, node);
        }
        Self::new(raw.root, nodes)
    }

    pub fn from_json(text: &str) -> Result<Self, SignalError> {
        let raw: RawTree =
            serde_json::from_str(text).map_err(|e| SignalError::MalformedTree {
                reason: e.to_string(),
            })?;
        Self::from_raw(raw)
    }

    /// Back to the serializable form, for versioning a rule set as data.
    pub fn to_raw(&self) -> RawTree {
        let nodes = self
            .nodes
            .iter()
            .map(|(&id, node)| {
                let raw = match node {
                    Node::Branch { predicate, on_true, on_false } => RawNode {
                        predicate: Some(predicate.clone()),
                        on_true: Some(*on_true),
                        on_false: Some(*on_false),
                        outcome: None,
                    },
                    Node::Leaf { outcome } => RawNode {
                        outcome: Some(outcome.clone()),
                        ..RawNode::default()
                    },
                };
                (id, raw)
            })
            .collect();
        RawTree { root: self.root, nodes }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Longest root-to-leaf path, in nodes.
    pub fn depth(&self) -> usize {
        self.depth_from(self.root)
    }

    fn depth_from(&self, id: NodeId) -> usize {
        match self.nodes.get(&id) {
            Some(Node::Branch { on_true, on_false, .. }) => {
                1 + self.depth_from(*on_true).max(self.depth_from(*on_false))
            }
            Some(Node::Leaf { .. }) => 1,
            None => 0,
        }
    }

    fn validate(&self) -> Result<(), SignalError> {
        let mut visiting = BTreeSet::new();
        let mut done = BTreeSet::new();
        self.check_from(self.root, &mut visiting, &mut done)?;

        if done.len() != self.nodes.len() {
            let orphans: Vec<String> = self
                .nodes
                .keys()
                .filter(|id| !done.contains(id))
                .map(|id| id.to_string())
                .collect();
            return Err(SignalError::MalformedTree {
                reason: format!("unreachable nodes: {}", orphans.join(", ")),
            });
        }
        Ok(())
    }

    fn check_from(
        &self,
        id: NodeId,
        visiting: &mut BTreeSet<NodeId>,
        done: &mut BTreeSet<NodeId>,
    ) -> Result<(), SignalError> {
        if done.contains(&id) {
            return Ok(());
        }
        if !visiting.insert(id) {
            return Err(SignalError::MalformedTree {
                reason: format!("cycle through node {id}"),
            });
        }

        let node = self.nodes.get(&id).ok_or_else(|| SignalError::MalformedTree {
            reason: format!("node {id} is referenced but not defined"),
        })?;

        match node {
            Node::Branch { on_true, on_false, .. } => {
                self.check_from(*on_true, visiting, done)?;
                self.check_from(*on_false, visiting, done)?;
            }
            Node::Leaf { outcome: Outcome::BottomPair { candidates, .. } } => {
                if candidates.len() < 2 {
                    return Err(SignalError::MalformedTree {
                        reason: format!("node {id}: bottom-pair terminal needs at least two candidates"),
                    });
                }
            }
            Node::Leaf { .. } => {}
        }

        visiting.remove(&id);
        done.insert(id);
        Ok(())
    }

    /// Walk from the root to a terminal node and resolve its signal.
    pub fn evaluate(&self, snapshot: &IndicatorSnapshot) -> Result<Signal, SignalError> {
        self.evaluate_traced(snapshot).map(|(signal, _)| signal)
    }

    /// Like [`evaluate`](Self::evaluate), also returning the decision path.
    ///
    /// Pure over its inputs: no I/O, no clock, no randomness. The same
    /// snapshot always walks the same path to the same terminal.
    pub fn evaluate_traced(
        &self,
        snapshot: &IndicatorSnapshot,
    ) -> Result<(Signal, Vec<TraceStep>), SignalError> {
        let mut path = Vec::new();
        let mut current = self.root;

        loop {
            // Validated trees define every referenced id.
            let node = self.nodes.get(&current).ok_or_else(|| SignalError::MalformedTree {
                reason: format!("node {current} is referenced but not defined"),
            })?;

            match node {
                Node::Branch { predicate, on_true, on_false } => {
                    let (result, observed, observed_right) = predicate.evaluate(snapshot)?;
                    tracing::debug!(node = current, %predicate, observed, observed_right, result, "branch");
                    path.push(TraceStep {
                        node: current,
                        predicate: predicate.clone(),
                        observed,
                        observed_right,
                        result,
                    });
                    current = if result { *on_true } else { *on_false };
                }
                Node::Leaf { outcome } => {
                    let signal = outcome.resolve(snapshot)?;
                    tracing::debug!(node = current, label = %signal.render(), "terminal");
                    return Ok((signal, path));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threshold(ticker: &str, window: usize, op: Op, value: f64) -> Predicate {
        Predicate::Threshold {
            indicator: IndicatorRef { ticker: ticker.to_string(), window },
            op,
            threshold: value,
        }
    }

    fn branch(predicate: Predicate, on_true: NodeId, on_false: NodeId) -> Node {
        Node::Branch { predicate, on_true, on_false }
    }

    fn leaf(signal: Signal) -> Node {
        Node::Leaf { outcome: Outcome::Fixed { signal } }
    }

    fn tiny_tree() -> DecisionTree {
        // 1: AAA RSI(9) > 70 ? leaf 2 : leaf 3
        let mut nodes = BTreeMap::new();
        nodes.insert(1, branch(threshold("AAA", 9, Op::Gt, 70.0), 2, 3));
        nodes.insert(2, leaf(Signal::VixGroup));
        nodes.insert(3, leaf(Signal::TreasuryBill));
        DecisionTree::new(1, nodes).unwrap()
    }

    fn snapshot_with(entries: &[(&str, usize, f64)]) -> IndicatorSnapshot {
        let mut snapshot = IndicatorSnapshot::new();
        for &(ticker, window, value) in entries {
            snapshot.insert(ticker, window, value);
        }
        snapshot
    }

    #[test]
    fn test_threshold_branching() {
        let tree = tiny_tree();

        let hot = snapshot_with(&[("AAA", 9, 75.0)]);
        assert_eq!(tree.evaluate(&hot).unwrap(), Signal::VixGroup);

        let cold = snapshot_with(&[("AAA", 9, 50.0)]);
        assert_eq!(tree.evaluate(&cold).unwrap(), Signal::TreasuryBill);

        // Strict comparison: the threshold itself takes the false edge.
        let edge = snapshot_with(&[("AAA", 9, 70.0)]);
        assert_eq!(tree.evaluate(&edge).unwrap(), Signal::TreasuryBill);
    }

    #[test]
    fn test_pairwise_predicate() {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            1,
            branch(
                Predicate::Pairwise {
                    left: IndicatorRef { ticker: "AAA".to_string(), window: 9 },
                    op: Op::Lt,
                    right: IndicatorRef { ticker: "BBB".to_string(), window: 50 },
                },
                2,
                3,
            ),
        );
        nodes.insert(2, leaf(Signal::SingleVix));
        nodes.insert(3, leaf(Signal::TreasuryBill));
        let tree = DecisionTree::new(1, nodes).unwrap();

        let snapshot = snapshot_with(&[("AAA", 9, 30.0), ("BBB", 50, 60.0)]);
        let (signal, path) = tree.evaluate_traced(&snapshot).unwrap();
        assert_eq!(signal, Signal::SingleVix);
        // Both sides of the comparison are recorded for reporting.
        assert_eq!(path[0].observed, 30.0);
        assert_eq!(path[0].observed_right, Some(60.0));
    }

    #[test]
    fn test_missing_indicator_fails_instead_of_defaulting() {
        let tree = tiny_tree();
        let err = tree.evaluate(&IndicatorSnapshot::new()).unwrap_err();
        assert_eq!(
            err,
            SignalError::IncompleteSnapshot {
                ticker: "AAA".to_string(),
                window: 9,
            }
        );
    }

    #[test]
    fn test_undefined_child_rejected_at_load() {
        let mut nodes = BTreeMap::new();
        nodes.insert(1, branch(threshold("AAA", 9, Op::Gt, 70.0), 2, 99));
        nodes.insert(2, leaf(Signal::VixGroup));
        let err = DecisionTree::new(1, nodes).unwrap_err();
        assert!(matches!(err, SignalError::MalformedTree { ref reason } if reason.contains("99")));
    }

    #[test]
    fn test_cycle_rejected_at_load() {
        let mut nodes = BTreeMap::new();
        nodes.insert(1, branch(threshold("AAA", 9, Op::Gt, 70.0), 2, 3));
        nodes.insert(2, branch(threshold("BBB", 9, Op::Lt, 30.0), 1, 3));
        nodes.insert(3, leaf(Signal::TreasuryBill));
        let err = DecisionTree::new(1, nodes).unwrap_err();
        assert!(matches!(err, SignalError::MalformedTree { ref reason } if reason.contains("cycle")));
    }

    #[test]
    fn test_shared_leaf_is_not_a_cycle() {
        // Both branches point at the same leaf; diamond sharing is fine.
        let mut nodes = BTreeMap::new();
        nodes.insert(1, branch(threshold("AAA", 9, Op::Gt, 70.0), 2, 3));
        nodes.insert(2, branch(threshold("BBB", 9, Op::Gt, 70.0), 4, 4));
        nodes.insert(3, branch(threshold("CCC", 9, Op::Gt, 70.0), 4, 4));
        nodes.insert(4, leaf(Signal::TreasuryBill));
        assert!(DecisionTree::new(1, nodes).is_ok());
    }

    #[test]
    fn test_orphan_rejected_at_load() {
        let mut nodes = BTreeMap::new();
        nodes.insert(1, branch(threshold("AAA", 9, Op::Gt, 70.0), 2, 3));
        nodes.insert(2, leaf(Signal::VixGroup));
        nodes.insert(3, leaf(Signal::TreasuryBill));
        nodes.insert(40, leaf(Signal::SingleVix));
        let err = DecisionTree::new(1, nodes).unwrap_err();
        assert!(matches!(err, SignalError::MalformedTree { ref reason } if reason.contains("40")));
    }

    #[test]
    fn test_raw_node_with_both_children_and_payload_rejected() {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            1,
            RawNode {
                predicate: Some(threshold("AAA", 9, Op::Gt, 70.0)),
                on_true: Some(2),
                on_false: Some(2),
                outcome: Some(Outcome::Fixed { signal: Signal::VixGroup }),
            },
        );
        nodes.insert(
            2,
            RawNode {
                outcome: Some(Outcome::Fixed { signal: Signal::TreasuryBill }),
                ..RawNode::default()
            },
        );
        let err = DecisionTree::from_raw(RawTree { root: 1, nodes }).unwrap_err();
        assert!(matches!(err, SignalError::MalformedTree { ref reason } if reason.contains("both")));
    }

    #[test]
    fn test_raw_node_with_neither_rejected() {
        let mut nodes = BTreeMap::new();
        nodes.insert(1, RawNode::default());
        let err = DecisionTree::from_raw(RawTree { root: 1, nodes }).unwrap_err();
        assert!(matches!(err, SignalError::MalformedTree { ref reason } if reason.contains("neither")));
    }

    #[test]
    fn test_bottom_pair_needs_two_candidates() {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            1,
            Node::Leaf {
                outcome: Outcome::BottomPair {
                    candidates: vec!["SOXL".to_string()],
                    window: 9,
                },
            },
        );
        let err = DecisionTree::new(1, nodes).unwrap_err();
        assert!(matches!(err, SignalError::MalformedTree { .. }));
    }

    #[test]
    fn test_bottom_pair_ranking_and_tie_break() {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            1,
            Node::Leaf {
                outcome: Outcome::BottomPair {
                    candidates: vec![
                        "SOXL".to_string(),
                        "TECL".to_string(),
                        "TQQQ".to_string(),
                        "FNGU".to_string(),
                    ],
                    window: 9,
                },
            },
        );
        let tree = DecisionTree::new(1, nodes).unwrap();

        let snapshot = snapshot_with(&[
            ("SOXL", 9, 40.0),
            ("TECL", 9, 20.0),
            ("TQQQ", 9, 20.0),
            ("FNGU", 9, 35.0),
        ]);
        // TECL and TQQQ tie at 20: candidate order breaks the tie.
        assert_eq!(
            tree.evaluate(&snapshot).unwrap(),
            Signal::BuyPair {
                first: "TECL".to_string(),
                second: "TQQQ".to_string(),
            }
        );

        // A missing candidate reading is an error, not a skipped candidate.
        let partial = snapshot_with(&[("SOXL", 9, 40.0), ("TECL", 9, 20.0), ("TQQQ", 9, 20.0)]);
        assert_eq!(
            tree.evaluate(&partial).unwrap_err(),
            SignalError::IncompleteSnapshot {
                ticker: "FNGU".to_string(),
                window: 9,
            }
        );
    }

    #[test]
    fn test_trace_records_each_hop() {
        let tree = tiny_tree();
        let snapshot = snapshot_with(&[("AAA", 9, 75.0)]);

        let (signal, path) = tree.evaluate_traced(&snapshot).unwrap();
        assert_eq!(signal, Signal::VixGroup);
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].node, 1);
        assert!(path[0].result);
        assert_eq!(path[0].observed, 75.0);
        assert_eq!(path[0].observed_right, None);
        assert_eq!(path[0].predicate.to_string(), "AAA RSI(9) > 70");
    }

    #[test]
    fn test_json_round_trip() {
        let tree = tiny_tree();
        let text = serde_json::to_string(&tree.to_raw()).unwrap();
        let reloaded = DecisionTree::from_json(&text).unwrap();
        assert_eq!(reloaded, tree);
    }

    #[test]
    fn test_depth() {
        let tree = tiny_tree();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.len(), 3);
    }
}
