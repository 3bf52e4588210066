//! ParityGuard - KiCad schematic vs. PCB parity checking library
//!
//! Compares the XML netlist export of a schematic against a board and
//! reports every difference in components (footprint, value, properties) and
//! connectivity (net count, names, pin endpoints).
//!
//! # Quick Start
//!
//! ```no_run
//! use parityguard::{ParityGuardCore, ParityOptions, Outcome};
//! use std::path::Path;
//!
//! let report = ParityGuardCore::check_files(
//!     Path::new("design.xml"),
//!     Path::new("design.kicad_pcb"),
//!     &ParityOptions::default(),
//! )
//! .unwrap();
//!
//! if let Some(report) = report {
//!     for d in &report.discrepancies {
//!         println!("{}", d);
//!     }
//!     assert_ne!(report.outcome, Outcome::Fail);
//! }
//! ```
//!
//! # Board data
//!
//! The reconcilers consume the [`BoardSnapshot`] trait. A host tool can
//! implement it over its live board model; [`PcbParser`] builds one from a
//! saved `.kicad_pcb` file.

pub mod board;
pub mod capability;
pub mod config;
pub mod core;
pub mod model;
pub mod parser;
pub mod reconcile;
pub mod report;

// Re-export main types
pub use crate::core::{exit_codes, ParityGuardCore, ParityGuardError};
pub use board::{BoardDesign, BoardSnapshot};
pub use capability::{check_parity_support, HostVersion, PreconditionError};
pub use config::{ConfigError, ParityOptions};
pub use model::{Component, Net};
pub use parser::export::{ExportParser, FormatError, SchematicExport};
pub use parser::pcb::{PcbParseError, PcbParser};
pub use reconcile::{reconcile_components, reconcile_nets};
pub use report::{aggregate, Discrepancy, DiscrepancyKind, Outcome, ParityReport, ParityStats};

/// Parse a schematic export file (convenience wrapper).
pub fn parse_export(path: &std::path::Path) -> Result<SchematicExport, ParityGuardError> {
    Ok(ExportParser::parse_file(path)?)
}

/// Load a `.kicad_pcb` board file (convenience wrapper).
pub fn load_board(path: &std::path::Path) -> Result<BoardDesign, ParityGuardError> {
    Ok(PcbParser::parse_board(path)?)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BoardDesign, BoardSnapshot, Discrepancy, DiscrepancyKind, Outcome, ParityGuardCore,
        ParityGuardError, ParityOptions, ParityReport,
    };
}
