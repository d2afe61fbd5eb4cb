// crates/l1menu/src/reader.rs

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::MenuError;
use crate::labels::tokenize;
use crate::tree::{DocumentNode, Element};
use crate::types::{
    Algorithm, Bin, Cut, ExtSignal, ExtSignalSet, ExternalRequirement, Menu, ObjectRequirement,
    Scale, ScaleSet,
};
use crate::value::{Field, parse_decimal, parse_offset, parse_text, parse_unsigned};

/// Controls how the reader treats elements that are absent from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadOptions {
    /// When `false` (the default) an absent element reads as empty text: zero
    /// for numbers, an empty string for text, an empty `scale_set` or
    /// `ext_signal_set`.
    ///
    /// When `true`, an absent element that the writer always emits fails the
    /// read with `MenuError::MissingElement`. Elements the writer may omit
    /// (comments, labels, descriptions) stay optional.
    pub require_fields: bool,
}

impl ReadOptions {
    /// Options that reject structurally incomplete documents.
    pub fn strict() -> Self {
        Self {
            require_fields: true,
        }
    }
}

/// Parses a menu XML string slice with the default (lenient) options.
///
/// # Errors
/// Returns a `MenuError` if the XML is malformed, the `menu` root is missing,
/// or any field fails to convert to its type.
pub fn load_menu_from_str(xml_content: &str) -> Result<Menu, MenuError> {
    load_menu_from_str_with(xml_content, &ReadOptions::default())
}

/// Parses a menu XML string slice with explicit options.
pub fn load_menu_from_str_with(
    xml_content: &str,
    options: &ReadOptions,
) -> Result<Menu, MenuError> {
    let root = Element::parse(xml_content)?;
    read_menu(&root, options)
}

/// Reads and parses a menu XML file.
///
/// # Errors
/// A file that cannot be opened yields `MenuError::Io` naming the path.
/// Content that is not UTF-8 is a structural error, like any other
/// malformed document.
pub fn load_menu_from_file(
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> Result<Menu, MenuError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| MenuError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    let xml_content = std::str::from_utf8(&bytes)?;
    load_menu_from_str_with(xml_content, options)
}

/// Builds a `Menu` from an already parsed document root.
///
/// The root must be a `menu` element, with or without a namespace prefix.
pub fn read_menu<N: DocumentNode>(root: &N, options: &ReadOptions) -> Result<Menu, MenuError> {
    if root.local_name() != "menu" {
        return Err(MenuError::MissingElement {
            element: "menu".into(),
        });
    }
    let scope = Scope::new(root, "menu", options);

    let algorithms = root
        .children_named("algorithm")
        .map(|node| read_algorithm(node, options))
        .collect::<Result<Vec<_>, MenuError>>()?;

    let scale_set = scope
        .child("scale_set")?
        .map(|node| read_scale_set(node, options))
        .transpose()?
        .unwrap_or_default();

    let ext_signal_set = scope
        .child("ext_signal_set")?
        .map(|node| read_ext_signal_set(node, options))
        .transpose()?
        .unwrap_or_default();

    let menu = Menu {
        name: scope.text("name")?,
        uuid_menu: scope.text("uuid_menu")?,
        uuid_firmware: scope.text("uuid_firmware")?,
        grammar_version: scope.text("grammar_version")?,
        n_modules: scope.unsigned("n_modules")?,
        comment: scope.optional_text("comment"),
        algorithms,
        scale_set,
        ext_signal_set,
    };

    debug!(
        "Read menu '{}': {} algorithms, {} scales, {} external signals",
        menu.name,
        menu.algorithms.len(),
        menu.scale_set.scales.len(),
        menu.ext_signal_set.ext_signals.len()
    );
    Ok(menu)
}

// --- Algorithms ---

fn read_algorithm<N: DocumentNode>(node: &N, options: &ReadOptions) -> Result<Algorithm, MenuError> {
    let scope = Scope::new(node, "algorithm", options);

    let cuts = node
        .children_named("cut")
        .map(|n| read_cut(n, options))
        .collect::<Result<Vec<_>, MenuError>>()?;
    let object_requirements = node
        .children_named("object_requirement")
        .map(|n| read_object_requirement(n, options))
        .collect::<Result<Vec<_>, MenuError>>()?;
    let external_requirements = node
        .children_named("external_requirement")
        .map(|n| read_external_requirement(n, options))
        .collect::<Result<Vec<_>, MenuError>>()?;

    Ok(Algorithm {
        name: scope.text("name")?,
        expression: scope.text("expression")?,
        index: scope.unsigned("index")?,
        module_id: scope.unsigned("module_id")?,
        module_index: scope.unsigned("module_index")?,
        comment: scope.optional_text("comment"),
        labels: tokenize(scope.optional("labels")),
        cuts,
        object_requirements,
        external_requirements,
    })
}

fn read_cut<N: DocumentNode>(node: &N, options: &ReadOptions) -> Result<Cut, MenuError> {
    let scope = Scope::new(node, "cut", options);
    Ok(Cut {
        name: scope.text("name")?,
        object: scope.optional_text("object"),
        cut_type: scope.text("type")?,
        minimum: scope.decimal("minimum")?,
        maximum: scope.decimal("maximum")?,
        data: scope.optional_text("data"),
        comment: scope.optional_text("comment"),
    })
}

fn read_object_requirement<N: DocumentNode>(
    node: &N,
    options: &ReadOptions,
) -> Result<ObjectRequirement, MenuError> {
    let scope = Scope::new(node, "object_requirement", options);
    Ok(ObjectRequirement {
        name: scope.text("name")?,
        object_type: scope.text("type")?,
        comparison_operator: scope.text("comparison_operator")?,
        threshold: scope.decimal("threshold")?,
        bx_offset: scope.offset("bx_offset")?,
        comment: scope.optional_text("comment"),
    })
}

fn read_external_requirement<N: DocumentNode>(
    node: &N,
    options: &ReadOptions,
) -> Result<ExternalRequirement, MenuError> {
    let scope = Scope::new(node, "external_requirement", options);
    Ok(ExternalRequirement {
        name: scope.text("name")?,
        bx_offset: scope.offset("bx_offset")?,
        comment: scope.optional_text("comment"),
    })
}

// --- Scales ---

fn read_scale_set<N: DocumentNode>(node: &N, options: &ReadOptions) -> Result<ScaleSet, MenuError> {
    let scope = Scope::new(node, "scale_set", options);
    let scales = node
        .children_named("scale")
        .map(|n| read_scale(n, options))
        .collect::<Result<Vec<_>, MenuError>>()?;
    Ok(ScaleSet {
        name: scope.text("name")?,
        comment: String::new(),
        scales,
    })
}

fn read_scale<N: DocumentNode>(node: &N, options: &ReadOptions) -> Result<Scale, MenuError> {
    let scope = Scope::new(node, "scale", options);
    let bins = node
        .children_named("bin")
        .map(|n| read_bin(n, options))
        .collect::<Result<Vec<_>, MenuError>>()?;
    Ok(Scale {
        object: scope.text("object")?,
        scale_type: scope.text("type")?,
        minimum: scope.decimal("minimum")?,
        maximum: scope.decimal("maximum")?,
        step: scope.decimal("step")?,
        n_bits: scope.unsigned("n_bits")?,
        bins,
    })
}

fn read_bin<N: DocumentNode>(node: &N, options: &ReadOptions) -> Result<Bin, MenuError> {
    let scope = Scope::new(node, "bin", options);
    Ok(Bin {
        number: scope.unsigned("number")?,
        minimum: scope.decimal("minimum")?,
        maximum: scope.decimal("maximum")?,
    })
}

// --- External Signals ---

fn read_ext_signal_set<N: DocumentNode>(
    node: &N,
    options: &ReadOptions,
) -> Result<ExtSignalSet, MenuError> {
    let scope = Scope::new(node, "ext_signal_set", options);
    let ext_signals = node
        .children_named("ext_signal")
        .map(|n| read_ext_signal(n, options))
        .collect::<Result<Vec<_>, MenuError>>()?;
    Ok(ExtSignalSet {
        name: scope.text("name")?,
        comment: String::new(),
        ext_signals,
    })
}

fn read_ext_signal<N: DocumentNode>(node: &N, options: &ReadOptions) -> Result<ExtSignal, MenuError> {
    let scope = Scope::new(node, "ext_signal", options);
    Ok(ExtSignal {
        name: scope.text("name")?,
        system: scope.text("system")?,
        cable: scope.unsigned("cable")?,
        channel: scope.unsigned("channel")?,
        description: scope.optional_text("description"),
        label: scope.optional_text("label"),
    })
}

// --- Helper Functions ---

/// Field lookup and coercion for the children of one element.
struct Scope<'a, N> {
    node: &'a N,
    parent: &'static str,
    options: &'a ReadOptions,
}

impl<'a, N: DocumentNode> Scope<'a, N> {
    fn new(node: &'a N, parent: &'static str, options: &'a ReadOptions) -> Self {
        Self {
            node,
            parent,
            options,
        }
    }

    fn missing(&self, element: &str) -> MenuError {
        MenuError::MissingElement {
            element: Field::new(self.parent, element).to_string(),
        }
    }

    /// Text of an element the writer always emits.
    fn required(&self, element: &'static str) -> Result<&'a str, MenuError> {
        match self.node.text_of(element) {
            Some(text) => Ok(text),
            None if self.options.require_fields => Err(self.missing(element)),
            None => {
                debug!("<{}> has no <{}>, reading it as empty", self.parent, element);
                Ok("")
            }
        }
    }

    /// Text of an element the writer may leave out.
    fn optional(&self, element: &'static str) -> &'a str {
        self.node.text_of(element).unwrap_or_default()
    }

    fn child(&self, element: &'static str) -> Result<Option<&'a N>, MenuError> {
        match self.node.find_single_child(element) {
            None if self.options.require_fields => Err(self.missing(element)),
            found => Ok(found),
        }
    }

    fn text(&self, element: &'static str) -> Result<String, MenuError> {
        self.required(element).map(parse_text)
    }

    fn optional_text(&self, element: &'static str) -> String {
        parse_text(self.optional(element))
    }

    fn unsigned(&self, element: &'static str) -> Result<u32, MenuError> {
        parse_unsigned(self.required(element)?, Field::new(self.parent, element))
    }

    fn offset(&self, element: &'static str) -> Result<i32, MenuError> {
        parse_offset(self.required(element)?, Field::new(self.parent, element))
    }

    fn decimal(&self, element: &'static str) -> Result<f64, MenuError> {
        parse_decimal(self.required(element)?, Field::new(self.parent, element))
    }
}
