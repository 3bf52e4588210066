//! Integration tests for ParityGuard library

use parityguard::prelude::*;
use parityguard::{exit_codes, load_board, HostVersion, PreconditionError};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn check(board: &str, options: &ParityOptions) -> ParityReport {
    ParityGuardCore::check_files(&fixture_path("matching.xml"), &fixture_path(board), options)
        .expect("Check should run")
        .expect("Check should not be skipped")
}

const MISMATCH_MESSAGES: [&str; 6] = [
    "R1 value mismatch (PCB: `1k` vs schematic: `10k`)",
    "R9 found in PCB, but not in schematic",
    "Net count mismatch (PCB 4 vs schematic 3)",
    "Net `GND` missing PCB connection/s: C1 pin 2",
    "Net `/SIG` extra PCB connection/s: R9 pin 1",
    "Net `NC` not in schematic",
];

#[test]
fn test_matching_design_passes() {
    let report = check("matching.kicad_pcb", &ParityOptions::default());

    assert_eq!(report.outcome, Outcome::Pass);
    assert_eq!(report.total_discrepancies(), 0, "{:?}", report.messages());
    assert_eq!(report.stats.schematic_components, 3);
    assert_eq!(report.stats.pcb_components, 3);
    assert_eq!(report.stats.schematic_nets, 3);
    assert_eq!(report.stats.pcb_nets, 3);
}

#[test]
fn test_mismatched_design_fails() {
    let report = check("mismatch.kicad_pcb", &ParityOptions::default());

    assert_eq!(report.outcome, Outcome::Fail);
    assert!(report.outcome.is_failure());
    assert_eq!(report.messages(), MISMATCH_MESSAGES);
}

#[test]
fn test_mismatch_kinds() {
    let report = check("mismatch.kicad_pcb", &ParityOptions::default());

    let kinds: Vec<_> = report.discrepancies.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        [
            DiscrepancyKind::ValueMismatch,
            DiscrepancyKind::ComponentNotInSchematic,
            DiscrepancyKind::NetCountMismatch,
            DiscrepancyKind::MissingPcbConnections,
            DiscrepancyKind::ExtraPcbConnections,
            DiscrepancyKind::NetNotInSchematic,
        ]
    );
    assert_eq!(report.stats.by_kind.get("value_mismatch"), Some(&1));
    assert_eq!(report.stats.by_kind.len(), 6);
}

#[test]
fn test_as_warnings_keeps_messages() {
    let options = ParityOptions {
        as_warnings: true,
        ..Default::default()
    };
    let report = check("mismatch.kicad_pcb", &options);

    assert_eq!(report.outcome, Outcome::Warn);
    assert!(!report.outcome.is_failure());
    assert_eq!(report.messages(), MISMATCH_MESSAGES);
}

#[test]
fn test_check_is_repeatable() {
    let first = check("mismatch.kicad_pcb", &ParityOptions::default());
    let second = check("mismatch.kicad_pcb", &ParityOptions::default());
    assert_eq!(first.discrepancies, second.discrepancies);
}

#[test]
fn test_board_snapshot_is_not_mutated() {
    let board = load_board(&fixture_path("mismatch.kicad_pcb")).unwrap();
    let before = board.list_nets();

    let report = ParityGuardCore::check_parity(
        &fixture_path("matching.xml"),
        &board,
        &ParityOptions::default(),
    )
    .unwrap()
    .unwrap();

    assert_eq!(report.total_discrepancies(), MISMATCH_MESSAGES.len());
    assert_eq!(board.list_nets(), before);
}

#[test]
fn test_kicad5_board_rejected() {
    let err = ParityGuardCore::check_files(
        &fixture_path("matching.xml"),
        &fixture_path("kicad5.kicad_pcb"),
        &ParityOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ParityGuardError::Precondition(PreconditionError::LegacyHost(v)) if v == HostVersion::new(5, 1, 9)
    ));
    assert_eq!(err.exit_code(), exit_codes::MISSING_TOOL);
}

#[test]
fn test_broken_connectivity_version_rejected() {
    let options = ParityOptions {
        kicad_version: Some(HostVersion::new(7, 0, 0)),
        ..Default::default()
    };
    let err = ParityGuardCore::check_files(
        &fixture_path("matching.xml"),
        &fixture_path("matching.kicad_pcb"),
        &options,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ParityGuardError::Precondition(PreconditionError::BrokenConnectivityApi(_))
    ));
    assert!(err.to_string().contains("7.0.1 or newer"));
}

#[test]
fn test_malformed_export_is_fatal_even_as_warnings() {
    let options = ParityOptions {
        as_warnings: true,
        ..Default::default()
    };
    let err = ParityGuardCore::check_files(
        &fixture_path("not_export.xml"),
        &fixture_path("matching.kicad_pcb"),
        &options,
    )
    .unwrap_err();

    assert!(matches!(err, ParityGuardError::Format(_)));
    assert_eq!(err.exit_code(), exit_codes::MISSING_TOOL);
}

#[test]
fn test_disabled_check_skips_everything() {
    let options = ParityOptions {
        enabled: false,
        ..Default::default()
    };
    let result = ParityGuardCore::check_files(
        &fixture_path("truncated.xml"),
        &fixture_path("does_not_exist.kicad_pcb"),
        &options,
    )
    .unwrap();
    assert!(result.is_none());
}

#[test]
fn test_in_memory_board() {
    let export = std::fs::read_to_string(fixture_path("matching.xml")).unwrap();
    let mut board = load_board(&fixture_path("matching.kicad_pcb")).unwrap();
    board.components.retain(|c| c.reference != "C1");

    let report = ParityGuardCore::check_parity_str(&export, &board, &ParityOptions::default())
        .unwrap()
        .unwrap();

    assert_eq!(report.outcome, Outcome::Fail);
    assert_eq!(report.messages(), ["C1 found in schematic, but not in PCB"]);
}
