//! Component and net records shared by the schematic and board sides.
//!
//! Both sides are reduced to the same two record types so the reconcilers can
//! compare them without knowing where the data came from. Maps and sets are
//! insertion ordered, which keeps every report reproducible for identical
//! inputs.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Build the canonical endpoint token for one pin of one component.
///
/// ```
/// assert_eq!(parityguard::model::endpoint_token("R1", "2"), "R1 pin 2");
/// ```
pub fn endpoint_token(reference: &str, pin: &str) -> String {
    format!("{} pin {}", reference, pin)
}

/// A placed or declared component, keyed by its reference designator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Component {
    pub reference: String,
    pub value: String,
    pub footprint: String,
    pub properties: IndexMap<String, String>,
}

impl Component {
    pub fn new(
        reference: impl Into<String>,
        value: impl Into<String>,
        footprint: impl Into<String>,
    ) -> Self {
        Self {
            reference: reference.into(),
            value: value.into(),
            footprint: footprint.into(),
            properties: IndexMap::new(),
        }
    }

    /// Add or replace a property. A repeated name keeps its first position
    /// but takes the latest value.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// A named electrical connection and the pin endpoints it groups.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Net {
    pub name: String,
    pub endpoints: IndexSet<String>,
}

impl Net {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoints: IndexSet::new(),
        }
    }

    /// Attach `"<reference> pin <pin>"` to this net.
    pub fn with_node(mut self, reference: &str, pin: &str) -> Self {
        self.add_node(reference, pin);
        self
    }

    pub fn add_node(&mut self, reference: &str, pin: &str) {
        self.endpoints.insert(endpoint_token(reference, pin));
    }

    pub fn contains(&self, token: &str) -> bool {
        self.endpoints.contains(token)
    }
}
