use std::fmt::Write;

use crate::indicators::IndicatorSnapshot;
use crate::signals::Signal;
use crate::tree::{IndicatorRef, TraceStep};

/// Render a plain-text run report: the final signal, the decision path that
/// produced it, and the readings that path consumed. Delivery of the report
/// is the caller's concern; this is only the projection.
pub fn render_report(
    signal: &Signal,
    path: &[TraceStep],
    snapshot: &IndicatorSnapshot,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SIGNAL: {}", signal.render());

    if !path.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Decision path:");
        for (i, step) in path.iter().enumerate() {
            let verdict = if step.result { "yes" } else { "no" };
            let readings = match step.observed_right {
                Some(right) => format!("{:.1} vs {:.1}", step.observed, right),
                None => format!("{:.1}", step.observed),
            };
            let _ = writeln!(
                out,
                "  {:>2}. {} -> {} ({})",
                i + 1,
                step.predicate,
                verdict,
                readings
            );
        }
    }

    let mut consumed: Vec<&IndicatorRef> = Vec::new();
    for step in path {
        for reference in step.predicate.references() {
            if !consumed.contains(&reference) {
                consumed.push(reference);
            }
        }
    }
    if !consumed.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Key readings:");
        for reference in consumed {
            if let Ok(value) = snapshot.get(&reference.ticker, reference.window) {
                let _ = writeln!(out, "  {} = {:.1}", reference, value);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{IndicatorRef, Op, Predicate};

    #[test]
    fn test_report_lists_signal_path_and_readings() {
        let mut snapshot = IndicatorSnapshot::new();
        snapshot.insert("QQQ", 9, 81.25);

        let path = vec![TraceStep {
            node: 1,
            predicate: Predicate::Threshold {
                indicator: IndicatorRef { ticker: "QQQ".to_string(), window: 9 },
                op: Op::Gt,
                threshold: 79.0,
            },
            observed: 81.25,
            observed_right: None,
            result: true,
        }];

        let report = render_report(&Signal::VixGroup, &path, &snapshot);
        assert!(report.starts_with("SIGNAL: 1.5x VIX Group (VXX, UVIX)"));
        assert!(report.contains("QQQ RSI(9) > 79 -> yes (81.2)"));
        assert!(report.contains("QQQ RSI(9) = 81.2"));
    }

    #[test]
    fn test_report_shows_both_sides_of_a_pairwise_step() {
        let mut snapshot = IndicatorSnapshot::new();
        snapshot.insert("QQQ", 9, 30.0);
        snapshot.insert("SPY", 9, 60.5);

        let path = vec![TraceStep {
            node: 1,
            predicate: Predicate::Pairwise {
                left: IndicatorRef { ticker: "QQQ".to_string(), window: 9 },
                op: Op::Lt,
                right: IndicatorRef { ticker: "SPY".to_string(), window: 9 },
            },
            observed: 30.0,
            observed_right: Some(60.5),
            result: true,
        }];

        let report = render_report(&Signal::SingleVix, &path, &snapshot);
        assert!(report.contains("QQQ RSI(9) < SPY RSI(9) -> yes (30.0 vs 60.5)"));
        assert!(report.contains("QQQ RSI(9) = 30.0"));
        assert!(report.contains("SPY RSI(9) = 60.5"));
    }

    #[test]
    fn test_report_without_path_is_just_the_signal() {
        let report = render_report(&Signal::TreasuryBill, &[], &IndicatorSnapshot::new());
        assert_eq!(report, "SIGNAL: BIL (T-Bill ETF)\n");
    }
}
