// src/lib.rs

#![doc = "Reads and writes Level-1 trigger menu XML documents (tmxsd schema)."]
#![doc = ""]
#![doc = "The library holds a typed model of a menu (algorithms, cuts, object and"]
#![doc = "external requirements, scales, external signals) and a codec that"]
#![doc = "converts it to and from XML with exact numeric formatting and field"]
#![doc = "presence rules."]
#![doc = ""]
#![doc = "It supports:"]
#![doc = "- `load_menu_from_str` / `load_menu_from_file`: parsing a menu document."]
#![doc = "- `save_menu_to_string` / `save_menu_to_writer`: serializing a menu back to XML."]

// --- Crate Modules ---

mod error;
mod format;
mod labels;
mod reader;
mod tree;
mod types;
mod value;
mod writer;

// --- Public API Re-exports ---

pub use error::{ErrorCategory, MenuError, ValueKind};
pub use format::format_decimal;
pub use labels::{join, tokenize};
pub use reader::{
    ReadOptions, load_menu_from_file, load_menu_from_str, load_menu_from_str_with, read_menu,
};
pub use tree::{DocumentNode, Element};
pub use types::{
    Algorithm, Bin, Cut, DEFAULT_COMPARISON_OPERATOR, DEFAULT_UUID, ExtSignal, ExtSignalSet,
    ExternalRequirement, Menu, ObjectRequirement, Scale, ScaleSet,
};
pub use value::{Field, parse_decimal, parse_offset, parse_text, parse_unsigned};
pub use writer::{TMXSD_NAMESPACE, build_menu_tree, save_menu_to_string, save_menu_to_writer};
