//! Schematic vs. board reconciliation.
//!
//! Both reconcilers are pure functions over read-only snapshots: they never
//! fail, and they report every mismatch they find in a deterministic order.

pub mod components;
pub mod nets;

pub use components::reconcile_components;
pub use nets::reconcile_nets;

use crate::board::BoardSnapshot;
use crate::parser::export::SchematicExport;
use crate::report::Discrepancy;

/// Run the component and net reconcilers, components first.
pub fn reconcile(schematic: &SchematicExport, board: &dyn BoardSnapshot) -> Vec<Discrepancy> {
    let mut errors = reconcile_components(&schematic.components, &board.list_components());
    errors.extend(reconcile_nets(
        &schematic.nets,
        board.net_count(),
        &board.list_nets(),
    ));
    errors
}
