//! Component-level comparison: presence, footprint, value and properties.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::Component;
use crate::report::{Discrepancy, DiscrepancyKind};

/// Compare schematic components against board components.
///
/// Board components are walked in the order given, then schematic
/// references never seen on the board are reported in document order.
pub fn reconcile_components(
    schematic: &IndexMap<String, Component>,
    board: &[Component],
) -> Vec<Discrepancy> {
    let mut errors = Vec::new();
    let mut found_comps: HashSet<&str> = HashSet::new();

    for pcb in board {
        let reference = pcb.reference.as_str();
        found_comps.insert(reference);
        let Some(sch) = schematic.get(reference) else {
            errors.push(Discrepancy::new(
                DiscrepancyKind::ComponentNotInSchematic,
                reference,
                format!("{} found in PCB, but not in schematic", reference),
            ));
            continue;
        };
        check_fields(sch, pcb, &mut errors);
        check_properties(sch, pcb, &mut errors);
    }

    for reference in schematic.keys() {
        if !found_comps.contains(reference.as_str()) {
            errors.push(Discrepancy::new(
                DiscrepancyKind::ComponentNotInPcb,
                reference.as_str(),
                format!("{} found in schematic, but not in PCB", reference),
            ));
        }
    }

    errors
}

fn check_fields(sch: &Component, pcb: &Component, errors: &mut Vec<Discrepancy>) {
    let reference = &pcb.reference;
    if sch.footprint != pcb.footprint {
        errors.push(Discrepancy::new(
            DiscrepancyKind::FootprintMismatch,
            reference.as_str(),
            format!(
                "{} footprint mismatch (PCB: `{}` vs schematic: `{}`)",
                reference, pcb.footprint, sch.footprint
            ),
        ));
    }
    if sch.value != pcb.value {
        errors.push(Discrepancy::new(
            DiscrepancyKind::ValueMismatch,
            reference.as_str(),
            format!(
                "{} value mismatch (PCB: `{}` vs schematic: `{}`)",
                reference, pcb.value, sch.value
            ),
        ));
    }
}

fn check_properties(sch: &Component, pcb: &Component, errors: &mut Vec<Discrepancy>) {
    let reference = &pcb.reference;
    for (name, sch_value) in &sch.properties {
        match pcb.properties.get(name) {
            None => errors.push(Discrepancy::new(
                DiscrepancyKind::SchematicPropertyNotInPcb,
                reference.as_str(),
                format!("{} schematic property `{}` not in PCB", reference, name),
            )),
            Some(pcb_value) if pcb_value != sch_value => errors.push(Discrepancy::new(
                DiscrepancyKind::PropertyMismatch,
                reference.as_str(),
                format!(
                    "{} property `{}` mismatch (PCB: `{}` vs schematic: `{}`)",
                    reference, name, pcb_value, sch_value
                ),
            )),
            Some(_) => {}
        }
    }
    for name in pcb.properties.keys() {
        if !sch.properties.contains_key(name) {
            errors.push(Discrepancy::new(
                DiscrepancyKind::PcbPropertyNotInSchematic,
                reference.as_str(),
                format!("{} PCB property `{}` not in schematic", reference, name),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schematic(comps: Vec<Component>) -> IndexMap<String, Component> {
        comps.into_iter().map(|c| (c.reference.clone(), c)).collect()
    }

    fn r1() -> Component {
        Component::new("R1", "10k", "R_0603").with_property("MPN", "RC0603")
    }

    #[test]
    fn test_identical_components_are_clean() {
        let sch = schematic(vec![r1(), Component::new("C1", "100n", "C_0402")]);
        let board = vec![Component::new("C1", "100n", "C_0402"), r1()];
        assert!(reconcile_components(&sch, &board).is_empty());
    }

    #[test]
    fn test_value_mismatch() {
        let sch = schematic(vec![Component::new("R1", "10k", "R_0603")]);
        let board = vec![Component::new("R1", "1k", "R_0603")];
        let errors = reconcile_components(&sch, &board);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, DiscrepancyKind::ValueMismatch);
        assert_eq!(
            errors[0].message,
            "R1 value mismatch (PCB: `1k` vs schematic: `10k`)"
        );
    }

    #[test]
    fn test_footprint_mismatch_reported_before_value() {
        let sch = schematic(vec![Component::new("R1", "10k", "R_0603")]);
        let board = vec![Component::new("R1", "1k", "R_0805")];
        let kinds: Vec<_> = reconcile_components(&sch, &board)
            .into_iter()
            .map(|d| d.kind)
            .collect();
        assert_eq!(
            kinds,
            [DiscrepancyKind::FootprintMismatch, DiscrepancyKind::ValueMismatch]
        );
    }

    #[test]
    fn test_pcb_only_component_skips_field_checks() {
        let sch = schematic(vec![]);
        let board = vec![Component::new("R7", "1k", "R_0603").with_property("MPN", "x")];
        let errors = reconcile_components(&sch, &board);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "R7 found in PCB, but not in schematic");
    }

    #[test]
    fn test_schematic_only_component() {
        let sch = schematic(vec![r1(), Component::new("C1", "100n", "C_0402")]);
        let board = vec![r1()];
        let errors = reconcile_components(&sch, &board);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, DiscrepancyKind::ComponentNotInPcb);
        assert_eq!(errors[0].message, "C1 found in schematic, but not in PCB");
    }

    #[test]
    fn test_property_checks() {
        let sch = schematic(vec![Component::new("U1", "MCU", "QFN-32")
            .with_property("MPN", "STM32G0")
            .with_property("Supplier", "Acme")]);
        let board = vec![Component::new("U1", "MCU", "QFN-32")
            .with_property("LCSC", "C123")
            .with_property("MPN", "STM32F0")];
        let messages: Vec<_> = reconcile_components(&sch, &board)
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(
            messages,
            [
                "U1 property `MPN` mismatch (PCB: `STM32F0` vs schematic: `STM32G0`)",
                "U1 schematic property `Supplier` not in PCB",
                "U1 PCB property `LCSC` not in schematic",
            ]
        );
    }

    #[test]
    fn test_board_order_then_schematic_order() {
        let sch = schematic(vec![
            Component::new("A1", "x", "f"),
            Component::new("B1", "x", "f"),
            Component::new("Z1", "x", "f"),
        ]);
        let board = vec![Component::new("Q9", "x", "f"), Component::new("Q2", "x", "f")];
        let subjects: Vec<_> = reconcile_components(&sch, &board)
            .into_iter()
            .map(|d| d.subject)
            .collect();
        assert_eq!(subjects, ["Q9", "Q2", "A1", "B1", "Z1"]);
    }
}
