//! KiCad XML netlist export parser
//!
//! Reads the `export` document produced from a schematic (the same file the
//! BoM plug-ins consume). Only the parts needed for a parity check are kept:
//!
//! ```text
//! <export version="E">
//!   <design><source>board.kicad_sch</source>...</design>
//!   <components>
//!     <comp ref="R1">
//!       <value>10k</value>
//!       <footprint>Resistor_SMD:R_0603_1608Metric</footprint>
//!       <property name="MPN" value="RC0603FR-0710KL"/>
//!     </comp>
//!   </components>
//!   <nets>
//!     <net code="1" name="GND">
//!       <node ref="R1" pin="1"/>
//!     </net>
//!   </nets>
//! </export>
//! ```
//!
//! The `code` attribute of a net is an arbitrary number and is ignored.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{Component, Net};

/// Root tag of a netlist export.
pub const EXPORT_ROOT_TAG: &str = "export";

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed export document: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("Not a valid netlist: root element is `{0}`, expected `export`")]
    UnexpectedRoot(String),
    #[error("`{element}` element without `{attribute}` attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
}

/// Schematic side of a parity check.
#[derive(Debug, Clone, Default)]
pub struct SchematicExport {
    /// Export format version, as written by the tool. Not validated.
    pub version: Option<String>,
    /// Schematic file the export was generated from.
    pub source: Option<String>,
    pub components: IndexMap<String, Component>,
    pub nets: IndexMap<String, Net>,
}

impl SchematicExport {
    /// Parse an export document from memory.
    pub fn parse_str(content: &str) -> Result<Self, FormatError> {
        let doc = Document::parse(content)?;
        let root = doc.root_element();

        if root.tag_name().name() != EXPORT_ROOT_TAG {
            return Err(FormatError::UnexpectedRoot(
                root.tag_name().name().to_string(),
            ));
        }

        let mut export = SchematicExport {
            version: root.attribute("version").map(str::to_string),
            source: child(root, "design")
                .and_then(|d| child(d, "source"))
                .and_then(|s| s.text())
                .map(str::to_string),
            ..Default::default()
        };

        if let Some(components) = child(root, "components") {
            for comp in components.descendants().filter(|n| n.has_tag_name("comp")) {
                let component = parse_comp(comp)?;
                debug!(
                    "- {}: {} {} {:?}",
                    component.reference, component.value, component.footprint, component.properties
                );
                if export.components.contains_key(&component.reference) {
                    warn!("Duplicated reference `{}` in export, keeping the last one", component.reference);
                }
                export.components.insert(component.reference.clone(), component);
            }
        }

        if let Some(nets) = child(root, "nets") {
            for net_el in nets.descendants().filter(|n| n.has_tag_name("net")) {
                let net = parse_net(net_el)?;
                if export.nets.contains_key(&net.name) {
                    warn!("Duplicated net `{}` in export, keeping the last one", net.name);
                }
                export.nets.insert(net.name.clone(), net);
            }
        }

        Ok(export)
    }
}

/// Reads export documents from disk.
pub struct ExportParser;

impl ExportParser {
    pub fn parse_file(path: &Path) -> Result<SchematicExport, FormatError> {
        debug!("Loading XML: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| FormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        SchematicExport::parse_str(&content)
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn child_text(node: Node<'_, '_>, tag: &str) -> String {
    child(node, tag)
        .and_then(|n| n.text())
        .unwrap_or("")
        .to_string()
}

fn required<'a>(
    node: Node<'a, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str, FormatError> {
    node.attribute(attribute)
        .ok_or(FormatError::MissingAttribute { element, attribute })
}

fn parse_comp(comp: Node<'_, '_>) -> Result<Component, FormatError> {
    let reference = required(comp, "comp", "ref")?;
    let mut component = Component::new(
        reference,
        child_text(comp, "value"),
        child_text(comp, "footprint"),
    );
    for prop in comp.descendants().filter(|n| n.has_tag_name("property")) {
        let Some(name) = prop.attribute("name") else {
            warn!("{}: `property` without `name`, ignored", reference);
            continue;
        };
        let value = prop.attribute("value").unwrap_or("");
        component.properties.insert(name.to_string(), value.to_string());
    }
    Ok(component)
}

fn parse_net(net_el: Node<'_, '_>) -> Result<Net, FormatError> {
    let mut net = Net::new(required(net_el, "net", "name")?);
    for node in net_el.descendants().filter(|n| n.has_tag_name("node")) {
        let reference = required(node, "node", "ref")?;
        let pin = required(node, "node", "pin")?;
        net.add_node(reference, pin);
    }
    Ok(net)
}
