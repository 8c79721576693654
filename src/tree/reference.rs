//! The production rule set: 37 nodes over 9/50/60-day SMA-RSI readings,
//! rotating between leveraged VIX exposure, a defensive VIX blend, single
//! VIX, leveraged single-name longs, a biotech short, and cash.
//!
//! Branch ids and thresholds are kept exactly as published; the ten distinct
//! terminals live on the ids the branch table skips, shared wherever several
//! branches end in the same outcome.

use std::collections::BTreeMap;

use super::{DecisionTree, IndicatorRef, Node, NodeId, Op, Outcome, Predicate};
use crate::signals::{Allocation, Signal};

/// Root node id of the reference tree.
pub const ROOT: NodeId = 1;

// Shared terminal ids.
const LEAF_VIX_GROUP: NodeId = 7;
const LEAF_VIX_BLEND: NodeId = 11;
const LEAF_SINGLE_VIX: NodeId = 14;
const LEAF_LABD: NodeId = 15;
const LEAF_SOXL: NodeId = 20;
const LEAF_FNGU: NodeId = 21;
const LEAF_BOTTOM_PAIR: NodeId = 26;
const LEAF_TECL: NodeId = 27;
const LEAF_UPRO: NodeId = 30;
const LEAF_BIL: NodeId = 31;

fn branch(
    ticker: &str,
    window: usize,
    op: Op,
    threshold: f64,
    on_true: NodeId,
    on_false: NodeId,
) -> Node {
    Node::Branch {
        predicate: Predicate::Threshold {
            indicator: IndicatorRef { ticker: ticker.to_string(), window },
            op,
            threshold,
        },
        on_true,
        on_false,
    }
}

fn leaf(signal: Signal) -> Node {
    Node::Leaf { outcome: Outcome::Fixed { signal } }
}

fn long(ticker: &str) -> Signal {
    Signal::Long { ticker: ticker.to_string() }
}

/// Build the reference decision tree.
pub fn reference_tree() -> DecisionTree {
    let mut nodes = BTreeMap::new();

    // Overbought ladder: broad indexes first, then sector funds. Each rung
    // checks a mild threshold, escalates to leveraged VIX past an extreme
    // one, and otherwise settles on blend/single VIX.
    nodes.insert(1, branch("QQQ", 9, Op::Gt, 79.0, 2, 3));
    nodes.insert(2, branch("VIXY", 50, Op::Gt, 40.0, LEAF_VIX_GROUP, 4));
    nodes.insert(3, branch("SPY", 9, Op::Gt, 79.0, 5, 8));
    nodes.insert(4, branch("SPY", 9, Op::Gt, 82.5, LEAF_VIX_GROUP, LEAF_VIX_BLEND));
    nodes.insert(5, branch("VIXY", 60, Op::Gt, 40.0, LEAF_VIX_GROUP, 6));
    nodes.insert(6, branch("QQQ", 9, Op::Gt, 82.5, LEAF_VIX_GROUP, LEAF_VIX_BLEND));
    nodes.insert(8, branch("IOO", 9, Op::Gt, 80.0, 9, 12));
    nodes.insert(9, branch("VIXY", 60, Op::Gt, 40.0, LEAF_VIX_GROUP, 10));
    nodes.insert(10, branch("IOO", 9, Op::Gt, 82.5, LEAF_VIX_GROUP, LEAF_SINGLE_VIX));
    nodes.insert(12, branch("XLP", 9, Op::Gt, 77.0, 13, 16));
    nodes.insert(13, branch("XLP", 9, Op::Gt, 82.5, LEAF_VIX_GROUP, LEAF_SINGLE_VIX));
    nodes.insert(16, branch("VTV", 9, Op::Gt, 79.0, 17, 18));
    nodes.insert(17, branch("VTV", 9, Op::Gt, 82.5, LEAF_VIX_GROUP, LEAF_SINGLE_VIX));
    nodes.insert(18, branch("XLF", 9, Op::Gt, 81.0, 19, 22));
    nodes.insert(19, branch("XLF", 9, Op::Gt, 85.0, LEAF_VIX_GROUP, LEAF_SINGLE_VIX));
    nodes.insert(22, branch("VOX", 9, Op::Gt, 79.0, 23, 24));
    nodes.insert(23, branch("VOX", 9, Op::Gt, 82.5, LEAF_VIX_GROUP, LEAF_SINGLE_VIX));
    nodes.insert(24, branch("CURE", 9, Op::Gt, 82.0, 25, 28));
    nodes.insert(25, branch("CURE", 9, Op::Gt, 85.0, LEAF_VIX_GROUP, LEAF_SINGLE_VIX));
    nodes.insert(28, branch("RETL", 9, Op::Gt, 82.0, 29, 32));
    nodes.insert(29, branch("RETL", 9, Op::Gt, 85.0, LEAF_VIX_GROUP, LEAF_SINGLE_VIX));

    // Nothing overbought: short frothy biotech, otherwise buy the deepest
    // oversold leveraged long, falling back to cash.
    nodes.insert(32, branch("LABU", 9, Op::Gt, 79.0, LEAF_LABD, 33));
    nodes.insert(33, branch("SOXL", 9, Op::Lt, 25.0, LEAF_SOXL, 34));
    nodes.insert(34, branch("FNGU", 9, Op::Lt, 25.0, LEAF_FNGU, 35));
    nodes.insert(35, branch("TQQQ", 9, Op::Lt, 28.0, LEAF_BOTTOM_PAIR, 36));
    nodes.insert(36, branch("TECL", 9, Op::Lt, 25.0, LEAF_TECL, 37));
    nodes.insert(37, branch("UPRO", 9, Op::Lt, 25.0, LEAF_UPRO, LEAF_BIL));

    // Shared terminals.
    nodes.insert(LEAF_VIX_GROUP, leaf(Signal::VixGroup));
    nodes.insert(
        LEAF_VIX_BLEND,
        leaf(Signal::VixBlend {
            allocations: vec![
                Allocation { ticker: "VXX".to_string(), weight: 0.45 },
                Allocation { ticker: "VIXM".to_string(), weight: 0.2 },
                Allocation { ticker: "UVIX".to_string(), weight: 0.35 },
            ],
        }),
    );
    nodes.insert(LEAF_SINGLE_VIX, leaf(Signal::SingleVix));
    nodes.insert(LEAF_LABD, leaf(Signal::Short { ticker: "LABD".to_string() }));
    nodes.insert(LEAF_SOXL, leaf(long("SOXL")));
    nodes.insert(LEAF_FNGU, leaf(long("FNGU")));
    nodes.insert(
        LEAF_BOTTOM_PAIR,
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
    nodes.insert(LEAF_TECL, leaf(long("TECL")));
    nodes.insert(LEAF_UPRO, leaf(long("UPRO")));
    nodes.insert(LEAF_BIL, leaf(Signal::TreasuryBill));

    DecisionTree::new(ROOT, nodes).expect("reference tree is structurally valid")
}
