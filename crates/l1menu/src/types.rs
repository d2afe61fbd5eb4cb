// crates/l1menu/src/types.rs

//! Public data structures for a Level-1 trigger menu.
//!
//! Every entity is a plain value aggregate: build it once with a struct
//! literal (filling the rest from `Default`) and hand it to the writer.

use serde::{Deserialize, Serialize};

/// The all-zero UUID used when a menu carries no identifier.
pub const DEFAULT_UUID: &str = "00000000-0000-0000-0000-000000000000";

/// Comparison operator assumed by an `ObjectRequirement` built without one.
pub const DEFAULT_COMPARISON_OPERATOR: &str = ".ge.";

// --- Root Menu Structure ---

/// A complete trigger menu document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    /// `<name>`
    pub name: String,
    /// `<uuid_menu>`
    pub uuid_menu: String,
    /// `<uuid_firmware>`
    pub uuid_firmware: String,
    /// `<grammar_version>`
    pub grammar_version: String,
    /// `<n_modules>`
    pub n_modules: u32,
    /// `<comment>` (omitted on write when empty)
    pub comment: String,
    /// All `<algorithm>` elements, in document order.
    pub algorithms: Vec<Algorithm>,
    /// The `<scale_set>` block.
    pub scale_set: ScaleSet,
    /// The `<ext_signal_set>` block.
    pub ext_signal_set: ExtSignalSet,
}

impl Default for Menu {
    fn default() -> Self {
        Self {
            name: String::new(),
            uuid_menu: DEFAULT_UUID.into(),
            uuid_firmware: DEFAULT_UUID.into(),
            grammar_version: String::new(),
            n_modules: 0,
            comment: String::new(),
            algorithms: Vec::new(),
            scale_set: ScaleSet::default(),
            ext_signal_set: ExtSignalSet::default(),
        }
    }
}

impl Menu {
    /// Finds the algorithm carrying the given `index`.
    pub fn algorithm_by_index(&self, index: u32) -> Option<&Algorithm> {
        self.algorithms.iter().find(|a| a.index == index)
    }

    /// Finds an algorithm by its name (e.g. `L1_SingleMu22`).
    pub fn algorithm_by_name(&self, name: &str) -> Option<&Algorithm> {
        self.algorithms.iter().find(|a| a.name == name)
    }
}

// --- Algorithms ---

/// One trigger decision rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Algorithm {
    pub name: String,
    /// Boolean expression referencing cuts and requirements by name.
    pub expression: String,
    /// Unique within a menu; not enforced here.
    pub index: u32,
    pub module_id: u32,
    pub module_index: u32,
    pub comment: String,
    /// Tokens of the comma-separated `<labels>` element.
    pub labels: Vec<String>,
    pub cuts: Vec<Cut>,
    pub object_requirements: Vec<ObjectRequirement>,
    pub external_requirements: Vec<ExternalRequirement>,
}

/// A threshold constraint referenced by an algorithm expression.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cut {
    pub name: String,
    /// `<object>`, written as an empty element when blank.
    pub object: String,
    /// `<type>`
    pub cut_type: String,
    pub minimum: f64,
    pub maximum: f64,
    /// `<data>`, written as an empty element when blank.
    pub data: String,
    pub comment: String,
}

/// A physics-object condition referenced by an algorithm expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRequirement {
    pub name: String,
    /// `<type>`
    pub object_type: String,
    /// One of `.ge.`, `.eq.`, ... (not validated).
    pub comparison_operator: String,
    pub threshold: f64,
    /// Bunch-crossing offset.
    pub bx_offset: i32,
    pub comment: String,
}

impl Default for ObjectRequirement {
    fn default() -> Self {
        Self {
            name: String::new(),
            object_type: String::new(),
            comparison_operator: DEFAULT_COMPARISON_OPERATOR.into(),
            threshold: 0.0,
            bx_offset: 0,
            comment: String::new(),
        }
    }
}

/// A reference to an external signal condition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalRequirement {
    pub name: String,
    pub bx_offset: i32,
    pub comment: String,
}

// --- Scales ---

/// A named collection of scales.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScaleSet {
    pub name: String,
    /// Carried in memory only; the XML format has no slot for it.
    pub comment: String,
    pub scales: Vec<Scale>,
}

/// A calibration curve for one (object, type) pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scale {
    /// `<object>` (e.g. `EG`, `MU`)
    pub object: String,
    /// `<type>` (e.g. `ET`, `ETA`)
    pub scale_type: String,
    pub minimum: f64,
    pub maximum: f64,
    pub step: f64,
    /// `<n_bits>`
    pub n_bits: u32,
    pub bins: Vec<Bin>,
}

/// One discretized interval of a `Scale`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bin {
    pub number: u32,
    pub minimum: f64,
    pub maximum: f64,
}

// --- External Signals ---

/// A named collection of external signals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtSignalSet {
    pub name: String,
    /// Carried in memory only; the XML format has no slot for it.
    pub comment: String,
    pub ext_signals: Vec<ExtSignal>,
}

/// One external-signal channel mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtSignal {
    pub name: String,
    pub system: String,
    pub cable: u32,
    pub channel: u32,
    pub description: String,
    pub label: String,
}
