pub mod export;
pub mod pcb;
pub mod sexp;

// Re-export for convenience
pub use export::{ExportParser, FormatError, SchematicExport};
pub use pcb::{PcbParseError, PcbParser};
pub use sexp::{ParseError, SExp, SExpParser};
