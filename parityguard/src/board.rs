//! Board side of a parity check.
//!
//! The reconcilers never look at a board model directly. They consume the
//! [`BoardSnapshot`] contract, which a host design tool (or the bundled
//! `.kicad_pcb` loader) provides. Dropping the reserved "no connection" net is
//! the accessor's job: nothing downstream knows about netcodes.

use indexmap::IndexMap;

use crate::capability::HostVersion;
use crate::model::{Component, Net};

/// Read-only view of a board's components and connectivity.
pub trait BoardSnapshot {
    /// Every placed component, in a stable order.
    fn list_components(&self) -> Vec<Component>;

    /// Number of nets, excluding the reserved "no connection" net.
    fn net_count(&self) -> usize;

    /// Every net except the reserved one, endpoints as canonical tokens.
    fn list_nets(&self) -> Vec<Net>;

    /// Version of the tool hosting (or that wrote) the board, when known.
    fn host_version(&self) -> Option<HostVersion> {
        None
    }
}

/// In-memory board snapshot.
#[derive(Debug, Clone, Default)]
pub struct BoardDesign {
    pub filename: String,
    pub host_version: Option<HostVersion>,
    pub components: Vec<Component>,
    /// Nets in netcode order; the reserved net is never stored here.
    pub nets: IndexMap<String, Net>,
}

impl BoardDesign {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_net(mut self, net: Net) -> Self {
        self.add_net(net);
        self
    }

    pub fn with_host_version(mut self, version: HostVersion) -> Self {
        self.host_version = Some(version);
        self
    }

    /// Register a net. An empty name is the reserved "no connection" net and
    /// is dropped.
    pub fn add_net(&mut self, net: Net) {
        if net.name.is_empty() {
            return;
        }
        match self.nets.get_mut(&net.name) {
            Some(existing) => existing.endpoints.extend(net.endpoints),
            None => {
                self.nets.insert(net.name.clone(), net);
            }
        }
    }

    pub fn component(&self, reference: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.reference == reference)
    }
}

impl BoardSnapshot for BoardDesign {
    fn list_components(&self) -> Vec<Component> {
        self.components.clone()
    }

    fn net_count(&self) -> usize {
        self.nets.len()
    }

    fn list_nets(&self) -> Vec<Net> {
        self.nets.values().cloned().collect()
    }

    fn host_version(&self) -> Option<HostVersion> {
        self.host_version
    }
}
