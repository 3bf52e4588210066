//! Discrepancy records and pass/warn/fail classification.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{error, warn};

/// Prefix used when discrepancies are demoted to warnings.
pub const W_PARITY: &str = "(parity) ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    ComponentNotInSchematic,
    ComponentNotInPcb,
    FootprintMismatch,
    ValueMismatch,
    SchematicPropertyNotInPcb,
    PropertyMismatch,
    PcbPropertyNotInSchematic,
    NetCountMismatch,
    NetNotInSchematic,
    NetNotInPcb,
    ExtraPcbConnections,
    MissingPcbConnections,
}

impl DiscrepancyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscrepancyKind::ComponentNotInSchematic => "component_not_in_schematic",
            DiscrepancyKind::ComponentNotInPcb => "component_not_in_pcb",
            DiscrepancyKind::FootprintMismatch => "footprint_mismatch",
            DiscrepancyKind::ValueMismatch => "value_mismatch",
            DiscrepancyKind::SchematicPropertyNotInPcb => "schematic_property_not_in_pcb",
            DiscrepancyKind::PropertyMismatch => "property_mismatch",
            DiscrepancyKind::PcbPropertyNotInSchematic => "pcb_property_not_in_schematic",
            DiscrepancyKind::NetCountMismatch => "net_count_mismatch",
            DiscrepancyKind::NetNotInSchematic => "net_not_in_schematic",
            DiscrepancyKind::NetNotInPcb => "net_not_in_pcb",
            DiscrepancyKind::ExtraPcbConnections => "extra_pcb_connections",
            DiscrepancyKind::MissingPcbConnections => "missing_pcb_connections",
        }
    }
}

/// One difference between the schematic and the board.
///
/// `subject` is the component reference or net name the message is about
/// (empty for the net count check).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub kind: DiscrepancyKind,
    pub subject: String,
    pub message: String,
}

impl Discrepancy {
    pub fn new(kind: DiscrepancyKind, subject: impl Into<String>, message: String) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message,
        }
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// No discrepancies.
    Pass,
    /// Discrepancies found, reported as warnings; the run continues.
    Warn,
    /// Discrepancies found; the run must stop with the netlist diff code.
    Fail,
}

impl Outcome {
    pub fn from_discrepancies(errors: &[Discrepancy], warn_only: bool) -> Self {
        if errors.is_empty() {
            Outcome::Pass
        } else if warn_only {
            Outcome::Warn
        } else {
            Outcome::Fail
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Fail)
    }
}

/// Classify `errors` and surface every message on the logging sink, as
/// warnings when `warn_only` is set and as errors otherwise.
pub fn aggregate(errors: &[Discrepancy], warn_only: bool) -> Outcome {
    let outcome = Outcome::from_discrepancies(errors, warn_only);
    match outcome {
        Outcome::Pass => {}
        Outcome::Warn => {
            for e in errors {
                warn!("{}{}", W_PARITY, e);
            }
        }
        Outcome::Fail => {
            for e in errors {
                error!("{}", e);
            }
        }
    }
    outcome
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParityStats {
    pub schematic_components: usize,
    pub schematic_nets: usize,
    pub pcb_components: usize,
    pub pcb_nets: usize,
    /// Discrepancy count per kind, in first-seen order.
    pub by_kind: IndexMap<&'static str, usize>,
}

impl ParityStats {
    pub fn count_kinds(&mut self, discrepancies: &[Discrepancy]) {
        for d in discrepancies {
            *self.by_kind.entry(d.kind.as_str()).or_insert(0) += 1;
        }
    }
}

/// Result of a completed parity check.
#[derive(Debug, Clone, Serialize)]
pub struct ParityReport {
    pub outcome: Outcome,
    pub discrepancies: Vec<Discrepancy>,
    pub stats: ParityStats,
}

impl ParityReport {
    pub fn new(outcome: Outcome, discrepancies: Vec<Discrepancy>, mut stats: ParityStats) -> Self {
        stats.count_kinds(&discrepancies);
        Self {
            outcome,
            discrepancies,
            stats,
        }
    }

    pub fn total_discrepancies(&self) -> usize {
        self.discrepancies.len()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.discrepancies.iter().map(|d| d.message.as_str()).collect()
    }

    /// Pretty-printed JSON rendering of the whole report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Discrepancy> {
        vec![
            Discrepancy::new(
                DiscrepancyKind::ValueMismatch,
                "R1",
                "R1 value mismatch (PCB: `1k` vs schematic: `10k`)".to_string(),
            ),
            Discrepancy::new(
                DiscrepancyKind::NetNotInPcb,
                "VCC",
                "Net `VCC` not in PCB".to_string(),
            ),
            Discrepancy::new(
                DiscrepancyKind::NetNotInPcb,
                "VDD",
                "Net `VDD` not in PCB".to_string(),
            ),
        ]
    }

    #[test]
    fn test_empty_is_pass() {
        assert_eq!(aggregate(&[], false), Outcome::Pass);
        assert_eq!(aggregate(&[], true), Outcome::Pass);
    }

    #[test]
    fn test_warn_only_never_fails() {
        let outcome = aggregate(&sample(), true);
        assert_eq!(outcome, Outcome::Warn);
        assert!(!outcome.is_failure());
    }

    #[test]
    fn test_errors_fail() {
        let outcome = aggregate(&sample(), false);
        assert_eq!(outcome, Outcome::Fail);
        assert!(outcome.is_failure());
    }

    #[test]
    fn test_report_counts_kinds() {
        let report = ParityReport::new(Outcome::Fail, sample(), ParityStats::default());
        assert_eq!(report.total_discrepancies(), 3);
        assert_eq!(report.stats.by_kind["value_mismatch"], 1);
        assert_eq!(report.stats.by_kind["net_not_in_pcb"], 2);
        assert_eq!(report.messages()[1], "Net `VCC` not in PCB");
    }

    #[test]
    fn test_report_json_shape() {
        let report = ParityReport::new(Outcome::Warn, sample(), ParityStats::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "warn");
        assert_eq!(json["discrepancies"][0]["kind"], "value_mismatch");
        assert_eq!(json["discrepancies"][0]["subject"], "R1");
    }
}
