//! Net-level comparison: total count, names and endpoint sets.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::Net;
use crate::report::{Discrepancy, DiscrepancyKind};

/// Compare schematic nets against board connectivity.
///
/// `board_net_count` must already exclude the reserved net. A count mismatch
/// is reported and the per-net checks still run.
pub fn reconcile_nets(
    schematic: &IndexMap<String, Net>,
    board_net_count: usize,
    board_nets: &[Net],
) -> Vec<Discrepancy> {
    let mut errors = Vec::new();

    if board_net_count != schematic.len() {
        errors.push(Discrepancy::new(
            DiscrepancyKind::NetCountMismatch,
            "",
            format!(
                "Net count mismatch (PCB {} vs schematic {})",
                board_net_count,
                schematic.len()
            ),
        ));
    }

    let mut pcb_net_names: HashSet<&str> = HashSet::new();
    for pcb in board_nets {
        let name = pcb.name.as_str();
        let Some(sch) = schematic.get(name) else {
            errors.push(Discrepancy::new(
                DiscrepancyKind::NetNotInSchematic,
                name,
                format!("Net `{}` not in schematic", name),
            ));
            continue;
        };
        pcb_net_names.insert(name);

        let extra = difference(pcb, sch);
        if !extra.is_empty() {
            errors.push(Discrepancy::new(
                DiscrepancyKind::ExtraPcbConnections,
                name,
                format!("Net `{}` extra PCB connection/s: {}", name, extra.join(",")),
            ));
        }
        let missing = difference(sch, pcb);
        if !missing.is_empty() {
            errors.push(Discrepancy::new(
                DiscrepancyKind::MissingPcbConnections,
                name,
                format!("Net `{}` missing PCB connection/s: {}", name, missing.join(",")),
            ));
        }
    }

    for name in schematic.keys() {
        if !pcb_net_names.contains(name.as_str()) {
            errors.push(Discrepancy::new(
                DiscrepancyKind::NetNotInPcb,
                name.as_str(),
                format!("Net `{}` not in PCB", name),
            ));
        }
    }

    errors
}

/// Endpoints of `a` not in `b`, in `a`'s order.
fn difference<'a>(a: &'a Net, b: &'a Net) -> Vec<&'a str> {
    a.endpoints
        .difference(&b.endpoints)
        .map(String::as_str)
        .collect()
}
