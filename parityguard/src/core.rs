//! Parity check orchestration shared by the CLI and embedding hosts.
//!
//! A check always runs to completion once it starts: format and precondition
//! problems abort before reconciliation, discrepancies never do.

use std::path::Path;

use tracing::{debug, info};

use crate::board::BoardSnapshot;
use crate::capability::{check_parity_support, PreconditionError};
use crate::config::{ConfigError, ParityOptions};
use crate::parser::export::{ExportParser, FormatError, SchematicExport};
use crate::parser::pcb::{PcbParseError, PcbParser};
use crate::reconcile::reconcile;
use crate::report::{aggregate, ParityReport, ParityStats};

/// Process exit codes for the distinguished failure classes.
pub mod exit_codes {
    /// Generic failure (bad command line).
    pub const GENERIC_ERROR: i32 = 1;
    /// The schematic and the PCB differ.
    pub const NETLIST_DIFF: i32 = 3;
    /// A prerequisite is not met: unsupported host tool, unreadable or
    /// malformed input, bad configuration.
    pub const MISSING_TOOL: i32 = 4;
}

#[derive(Debug, thiserror::Error)]
pub enum ParityGuardError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error("Error loading PCB: {0}")]
    Pcb(#[from] PcbParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ParityGuardError {
    /// Every fatal error maps to the "missing tool / bad config" class; it is
    /// never downgraded by `as_warnings`.
    pub fn exit_code(&self) -> i32 {
        exit_codes::MISSING_TOOL
    }
}

/// Core parity API used by both the CLI and library callers.
pub struct ParityGuardCore;

impl ParityGuardCore {
    /// Check an export file against a board snapshot.
    ///
    /// Returns `Ok(None)` when the options disable the check.
    pub fn check_parity(
        export_path: &Path,
        board: &dyn BoardSnapshot,
        options: &ParityOptions,
    ) -> Result<Option<ParityReport>, ParityGuardError> {
        if !Self::preflight(board, options)? {
            return Ok(None);
        }
        let schematic = ExportParser::parse_file(export_path)?;
        Ok(Some(Self::run(&schematic, board, options)))
    }

    /// Same as [`check_parity`](Self::check_parity) with the export already in memory.
    pub fn check_parity_str(
        export: &str,
        board: &dyn BoardSnapshot,
        options: &ParityOptions,
    ) -> Result<Option<ParityReport>, ParityGuardError> {
        if !Self::preflight(board, options)? {
            return Ok(None);
        }
        let schematic = SchematicExport::parse_str(export)?;
        Ok(Some(Self::run(&schematic, board, options)))
    }

    /// Check an export file against a saved `.kicad_pcb` file.
    pub fn check_files(
        export_path: &Path,
        board_path: &Path,
        options: &ParityOptions,
    ) -> Result<Option<ParityReport>, ParityGuardError> {
        if !options.should_check() {
            info!("PCB parity check disabled, skipping");
            return Ok(None);
        }
        let board = PcbParser::parse_board(board_path)?;
        Self::check_parity(export_path, &board, options)
    }

    /// Reconcile already-loaded data. Never fails.
    pub fn run(
        schematic: &SchematicExport,
        board: &dyn BoardSnapshot,
        options: &ParityOptions,
    ) -> ParityReport {
        let pcb_components = board.list_components();
        let pcb_nets = board.net_count();
        info!(
            "Checking parity: schematic {} components / {} nets, PCB {} components / {} nets",
            schematic.components.len(),
            schematic.nets.len(),
            pcb_components.len(),
            pcb_nets
        );

        let errors = reconcile(schematic, board);
        let outcome = aggregate(&errors, options.as_warnings);
        debug!("Parity outcome: {:?} ({} discrepancies)", outcome, errors.len());

        let stats = ParityStats {
            schematic_components: schematic.components.len(),
            schematic_nets: schematic.nets.len(),
            pcb_components: pcb_components.len(),
            pcb_nets,
            ..Default::default()
        };
        ParityReport::new(outcome, errors, stats)
    }

    /// `false` when the check is disabled; an error when the host can't run it.
    fn preflight(board: &dyn BoardSnapshot, options: &ParityOptions) -> Result<bool, ParityGuardError> {
        if !options.should_check() {
            info!("PCB parity check disabled, skipping");
            return Ok(false);
        }
        check_parity_support(options.kicad_version.or_else(|| board.host_version()))?;
        Ok(true)
    }
}
