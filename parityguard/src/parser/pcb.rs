//! KiCAD PCB loader
//!
//! Builds a [`BoardDesign`] snapshot from a saved `.kicad_pcb` file so a
//! parity check can run without a live pcbnew process.
//!
//! Key format details:
//! - Components are `(footprint "Lib:Name" ...)` (`module` before KiCad 6)
//! - The reference and value are `fp_text` entries up to KiCad 7 and
//!   `property` entries from KiCad 8 on
//! - Nets are declared at the top level as `(net <code> "<name>")`; code 0
//!   with an empty name is the "no connection" net
//! - Pads carry `(net <code> "<name>")` when connected

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::board::BoardDesign;
use crate::capability::HostVersion;
use crate::model::{endpoint_token, Component, Net};
use crate::parser::sexp::{ParseError, SExp, SExpParser};

/// `property` names that mirror built-in footprint fields rather than user
/// properties.
const BUILTIN_FIELDS: [&str; 5] = ["Reference", "Value", "Footprint", "Datasheet", "Description"];

#[derive(Debug, Error)]
pub enum PcbParseError {
    #[error("S-expression parse error: {0}")]
    SExpParse(#[from] ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid PCB format: {0}")]
    InvalidFormat(String),
}

/// Parser for KiCAD PCB files (KiCad 5 S-expression format and newer).
pub struct PcbParser;

impl PcbParser {
    pub fn parse_board(path: &Path) -> Result<BoardDesign, PcbParseError> {
        debug!("Loading PCB: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        Self::parse_board_str(&content, filename)
    }

    pub fn parse_board_str(content: &str, filename: &str) -> Result<BoardDesign, PcbParseError> {
        let root = SExpParser::new(content).parse()?;

        match root.tag() {
            Some("kicad_pcb") => {}
            Some(other) => {
                return Err(PcbParseError::InvalidFormat(format!(
                    "Expected kicad_pcb, found {}",
                    other
                )))
            }
            None => {
                return Err(PcbParseError::InvalidFormat(
                    "Expected kicad_pcb root".to_string(),
                ))
            }
        }

        let mut board = BoardDesign::new(filename);
        board.host_version = Self::host_version(&root);

        for net in root.children("net") {
            if let Some((_, name)) = Self::net_ref(net) {
                board.add_net(Net::new(name));
            }
        }

        let footprints = root.children("footprint").chain(root.children("module"));
        for fp in footprints {
            let (component, connections) = Self::parse_footprint(fp);
            for (net_name, pad) in connections {
                let token = endpoint_token(&component.reference, &pad);
                match board.nets.get_mut(&net_name) {
                    Some(net) => {
                        net.endpoints.insert(token);
                    }
                    None => {
                        let mut net = Net::new(net_name);
                        net.endpoints.insert(token);
                        board.add_net(net);
                    }
                }
            }
            board.components.push(component);
        }

        info!(
            "Loaded {}: {} footprints, {} nets",
            board.filename,
            board.components.len(),
            board.nets.len()
        );
        Ok(board)
    }

    /// `generator_version` (KiCad 8+) or the legacy `host` entry.
    fn host_version(root: &SExp) -> Option<HostVersion> {
        if let Some(v) = root.value_of("generator_version") {
            return v.parse().ok();
        }
        root.child("host")
            .and_then(|h| h.atom_at(2))
            .and_then(|v| v.trim_start_matches('(').parse().ok())
    }

    /// `(net 3 "GND")` or `(net "GND")`. `None` for the reserved net.
    fn net_ref(net: &SExp) -> Option<(Option<u32>, String)> {
        let (code, name) = match (net.atom_at(1), net.atom_at(2)) {
            (Some(code), Some(name)) => (code.parse::<u32>().ok(), name),
            (Some(name), None) => (None, name),
            _ => return None,
        };
        if code == Some(0) || name.is_empty() {
            return None;
        }
        Some((code, name.to_string()))
    }

    /// A footprint and its `(net name, pad number)` connections.
    fn parse_footprint(fp: &SExp) -> (Component, Vec<(String, String)>) {
        let mut component = Component::new("", "", fp.atom_at(1).unwrap_or(""));

        for text in fp.children("fp_text") {
            match (text.atom_at(1), text.atom_at(2)) {
                (Some("reference"), Some(r)) => component.reference = r.to_string(),
                (Some("value"), Some(v)) => component.value = v.to_string(),
                _ => {}
            }
        }

        for prop in fp.children("property") {
            let (Some(key), Some(val)) = (prop.atom_at(1), prop.atom_at(2)) else {
                continue;
            };
            match key {
                "Reference" => component.reference = val.to_string(),
                "Value" => component.value = val.to_string(),
                _ if BUILTIN_FIELDS.contains(&key) => {}
                _ => {
                    component.properties.insert(key.to_string(), val.to_string());
                }
            }
        }

        let connections = fp
            .children("pad")
            .filter_map(|pad| {
                let number = pad.atom_at(1)?;
                let (_, net_name) = pad.child("net").and_then(Self::net_ref)?;
                Some((net_name, number.to_string()))
            })
            .collect();

        (component, connections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardSnapshot;

    const KICAD7_BOARD: &str = r#"(kicad_pcb (version 20221018) (generator pcbnew)
  (net 0 "")
  (net 1 "GND")
  (net 2 "/VIN")
  (net 3 "unused")
  (footprint "Resistor_SMD:R_0603_1608Metric" (layer "F.Cu")
    (property "Sheetfile" "demo.kicad_sch")
    (property "MPN" "RC0603")
    (fp_text reference "R1" (at 0 -1.43) (layer "F.SilkS"))
    (fp_text value "10k" (at 0 1.43) (layer "F.Fab"))
    (pad "1" smd roundrect (at -0.8 0) (size 0.8 0.95) (layers "F.Cu" "F.Paste" "F.Mask") (net 1 "GND"))
    (pad "2" smd roundrect (at 0.8 0) (size 0.8 0.95) (layers "F.Cu" "F.Paste" "F.Mask") (net 2 "/VIN"))
  )
  (footprint "MountingHole:MountingHole_3.2mm_M3" (layer "F.Cu")
    (fp_text reference "H1" (at 0 -4.2) (layer "F.SilkS"))
    (fp_text value "MountingHole" (at 0 4.2) (layer "F.Fab"))
    (pad "" np_thru_hole circle (at 0 0) (size 3.2 3.2) (drill 3.2) (layers "*.Cu" "*.Mask"))
  )
)"#;

    #[test]
    fn test_parse_kicad7_board() {
        let board = PcbParser::parse_board_str(KICAD7_BOARD, "demo.kicad_pcb").unwrap();
        assert_eq!(board.host_version, None);
        assert_eq!(board.components.len(), 2);

        let r1 = board.component("R1").unwrap();
        assert_eq!(r1.value, "10k");
        assert_eq!(r1.footprint, "Resistor_SMD:R_0603_1608Metric");
        assert_eq!(r1.properties.len(), 2);
        assert_eq!(r1.properties["MPN"], "RC0603");
    }

    #[test]
    fn test_reserved_net_excluded() {
        let board = PcbParser::parse_board_str(KICAD7_BOARD, "demo.kicad_pcb").unwrap();
        assert_eq!(board.net_count(), 3);
        let names: Vec<_> = board.list_nets().into_iter().map(|n| n.name).collect();
        assert_eq!(names, ["GND", "/VIN", "unused"]);
        assert!(board.nets["GND"].contains("R1 pin 1"));
        assert!(board.nets["unused"].endpoints.is_empty());
    }

    #[test]
    fn test_parse_kicad8_properties() {
        let content = r#"(kicad_pcb (version 20240108) (generator "pcbnew") (generator_version "8.0")
  (net 0 "")
  (net 1 "GND")
  (footprint "Capacitor_SMD:C_0402_1005Metric" (layer "F.Cu")
    (property "Reference" "C1" (at 0 -1.16 0) (layer "F.SilkS"))
    (property "Value" "100n" (at 0 1.16 0) (layer "F.Fab"))
    (property "Footprint" "Capacitor_SMD:C_0402_1005Metric" (at 0 0 0) (layer "F.Fab") hide)
    (property "Datasheet" "" (at 0 0 0) (layer "F.Fab") hide)
    (property "Description" "Unpolarized capacitor" (at 0 0 0) (layer "F.Fab") hide)
    (property "Voltage" "16V")
    (pad "1" smd roundrect (at -0.48 0) (size 0.56 0.62) (layers "F.Cu") (net 1 "GND"))
    (pad "2" smd roundrect (at 0.48 0) (size 0.56 0.62) (layers "F.Cu") (net 0 ""))
  )
)"#;
        let board = PcbParser::parse_board_str(content, "v8.kicad_pcb").unwrap();
        assert_eq!(board.host_version, Some(HostVersion::new(8, 0, 0)));

        let c1 = board.component("C1").unwrap();
        assert_eq!(c1.value, "100n");
        assert_eq!(c1.properties.len(), 1);
        assert_eq!(c1.properties["Voltage"], "16V");

        assert_eq!(board.net_count(), 1);
        assert_eq!(board.nets["GND"].endpoints.len(), 1);
    }

    #[test]
    fn test_legacy_host_version() {
        let content = r#"(kicad_pcb (version 20171130) (host pcbnew "(5.1.9)-1")
  (net 0 "")
  (module Resistor_SMD:R_0603 (layer F.Cu)
    (fp_text reference R1 (at 0 0) (layer F.SilkS))
    (fp_text value 1k (at 0 0) (layer F.Fab))
  )
)"#;
        let board = PcbParser::parse_board_str(content, "v5.kicad_pcb").unwrap();
        assert_eq!(board.host_version, Some(HostVersion::new(5, 1, 9)));
        assert_eq!(board.components[0].reference, "R1");
        assert_eq!(board.net_count(), 0);
    }

    #[test]
    fn test_pad_net_without_declaration() {
        let content = r#"(kicad_pcb (version 20250114)
  (footprint "R" (property "Reference" "R9") (pad "1" smd rect (net "SIG")))
)"#;
        let board = PcbParser::parse_board_str(content, "v10.kicad_pcb").unwrap();
        assert_eq!(board.net_count(), 1);
        assert!(board.nets["SIG"].contains("R9 pin 1"));
    }

    #[test]
    fn test_wrong_root() {
        let err = PcbParser::parse_board_str("(kicad_sch (version 1))", "x").unwrap_err();
        assert!(matches!(err, PcbParseError::InvalidFormat(_)));
    }
}
