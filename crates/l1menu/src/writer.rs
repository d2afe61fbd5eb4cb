// crates/l1menu/src/writer.rs

//! Serializes a `Menu` back into a tmxsd menu document.
//!
//! The element order, the constant menu children (`ancestor_id`,
//! `global_tag`, `is_valid`, `is_obsolete`) and the per-field presence rules
//! are fixed by the consumers of the format, so the output is predictable
//! byte for byte.

use core::fmt::Display;
use std::io;

use log::debug;

use crate::error::MenuError;
use crate::format::format_decimal;
use crate::labels::join;
use crate::tree::{DocumentNode, Element};
use crate::types::{
    Algorithm, Bin, Cut, ExtSignal, ExtSignalSet, ExternalRequirement, Menu, ObjectRequirement,
    Scale, ScaleSet,
};

/// Namespace bound to the `tmxsd` prefix on the root element.
pub const TMXSD_NAMESPACE: &str = "http://www.cern.ch/tmxsd/1.0.0";

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "http://www.cern.ch/tmxsd/1.0.0 menu.xsd";

/// Whether a text field is written when its value is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    /// Always written.
    Always,
    /// Written as an empty element when blank.
    EmptyAsTag,
    /// Left out when blank.
    OmitIfEmpty,
}

/// Serializes a `Menu` into a complete menu XML `String`.
///
/// # Errors
/// Serialization into memory does not fail for a well-formed model; the
/// `Result` carries writer errors through unchanged.
pub fn save_menu_to_string(menu: &Menu) -> Result<String, MenuError> {
    let mut buffer = Vec::new();
    save_menu_to_writer(menu, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| MenuError::from(e.utf8_error()))
}

/// Serializes a `Menu` into `sink`.
///
/// # Errors
/// Returns `MenuError::Write` if the sink fails.
pub fn save_menu_to_writer<W: io::Write>(menu: &Menu, sink: W) -> Result<(), MenuError> {
    let root: Element = build_menu_tree(menu);
    root.write_document(sink)?;
    debug!(
        "Wrote menu '{}' with {} algorithms",
        menu.name,
        menu.algorithms.len()
    );
    Ok(())
}

/// Builds the document tree for `menu`, rooted at `tmxsd:menu`.
pub fn build_menu_tree<N: DocumentNode>(menu: &Menu) -> N {
    let mut root = N::create("tmxsd:menu");
    root.set_attribute("xmlns:tmxsd", TMXSD_NAMESPACE);
    root.set_attribute("xmlns:xsi", XSI_NAMESPACE);
    root.set_attribute("xsi:schemaLocation", SCHEMA_LOCATION);

    append_value(&mut root, "ancestor_id", 0);
    append_text(&mut root, "name", &menu.name, Presence::Always);
    append_text(&mut root, "uuid_menu", &menu.uuid_menu, Presence::Always);
    append_text(&mut root, "uuid_firmware", &menu.uuid_firmware, Presence::Always);
    root.append_child("global_tag", None);
    append_text(&mut root, "grammar_version", &menu.grammar_version, Presence::Always);
    append_value(&mut root, "n_modules", menu.n_modules);
    append_text(&mut root, "is_valid", "true", Presence::Always);
    append_text(&mut root, "is_obsolete", "false", Presence::Always);
    append_text(&mut root, "comment", &menu.comment, Presence::OmitIfEmpty);

    for algorithm in &menu.algorithms {
        build_algorithm(root.append_child("algorithm", None), algorithm);
    }
    build_scale_set(root.append_child("scale_set", None), &menu.scale_set);
    build_ext_signal_set(root.append_child("ext_signal_set", None), &menu.ext_signal_set);
    root
}

// --- Algorithms ---

fn build_algorithm<N: DocumentNode>(node: &mut N, algorithm: &Algorithm) {
    append_text(node, "name", &algorithm.name, Presence::Always);
    append_text(node, "expression", &algorithm.expression, Presence::Always);
    append_value(node, "index", algorithm.index);
    append_value(node, "module_id", algorithm.module_id);
    append_value(node, "module_index", algorithm.module_index);
    append_text(node, "comment", &algorithm.comment, Presence::OmitIfEmpty);
    append_text(node, "labels", &join(&algorithm.labels), Presence::OmitIfEmpty);

    for cut in &algorithm.cuts {
        build_cut(node.append_child("cut", None), cut);
    }
    for requirement in &algorithm.object_requirements {
        build_object_requirement(node.append_child("object_requirement", None), requirement);
    }
    for requirement in &algorithm.external_requirements {
        build_external_requirement(node.append_child("external_requirement", None), requirement);
    }
}

fn build_cut<N: DocumentNode>(node: &mut N, cut: &Cut) {
    append_text(node, "name", &cut.name, Presence::Always);
    append_text(node, "object", &cut.object, Presence::EmptyAsTag);
    append_text(node, "type", &cut.cut_type, Presence::Always);
    append_decimal(node, "minimum", cut.minimum);
    append_decimal(node, "maximum", cut.maximum);
    append_text(node, "data", &cut.data, Presence::EmptyAsTag);
    append_text(node, "comment", &cut.comment, Presence::OmitIfEmpty);
}

fn build_object_requirement<N: DocumentNode>(node: &mut N, requirement: &ObjectRequirement) {
    append_text(node, "name", &requirement.name, Presence::Always);
    append_text(node, "type", &requirement.object_type, Presence::Always);
    append_text(
        node,
        "comparison_operator",
        &requirement.comparison_operator,
        Presence::Always,
    );
    append_decimal(node, "threshold", requirement.threshold);
    append_value(node, "bx_offset", requirement.bx_offset);
    append_text(node, "comment", &requirement.comment, Presence::OmitIfEmpty);
}

fn build_external_requirement<N: DocumentNode>(node: &mut N, requirement: &ExternalRequirement) {
    append_text(node, "name", &requirement.name, Presence::Always);
    append_value(node, "bx_offset", requirement.bx_offset);
    append_text(node, "comment", &requirement.comment, Presence::OmitIfEmpty);
}

// --- Scales ---

fn build_scale_set<N: DocumentNode>(node: &mut N, scale_set: &ScaleSet) {
    append_text(node, "name", &scale_set.name, Presence::Always);
    for scale in &scale_set.scales {
        build_scale(node.append_child("scale", None), scale);
    }
}

fn build_scale<N: DocumentNode>(node: &mut N, scale: &Scale) {
    append_text(node, "object", &scale.object, Presence::Always);
    append_text(node, "type", &scale.scale_type, Presence::Always);
    append_decimal(node, "minimum", scale.minimum);
    append_decimal(node, "maximum", scale.maximum);
    append_decimal(node, "step", scale.step);
    append_value(node, "n_bits", scale.n_bits);
    for bin in &scale.bins {
        build_bin(node.append_child("bin", None), bin);
    }
}

fn build_bin<N: DocumentNode>(node: &mut N, bin: &Bin) {
    append_value(node, "number", bin.number);
    append_decimal(node, "minimum", bin.minimum);
    append_decimal(node, "maximum", bin.maximum);
}

// --- External Signals ---

fn build_ext_signal_set<N: DocumentNode>(node: &mut N, ext_signal_set: &ExtSignalSet) {
    append_text(node, "name", &ext_signal_set.name, Presence::Always);
    for ext_signal in &ext_signal_set.ext_signals {
        build_ext_signal(node.append_child("ext_signal", None), ext_signal);
    }
}

fn build_ext_signal<N: DocumentNode>(node: &mut N, ext_signal: &ExtSignal) {
    append_text(node, "name", &ext_signal.name, Presence::Always);
    append_text(node, "system", &ext_signal.system, Presence::Always);
    append_value(node, "cable", ext_signal.cable);
    append_value(node, "channel", ext_signal.channel);
    append_text(node, "description", &ext_signal.description, Presence::OmitIfEmpty);
    append_text(node, "label", &ext_signal.label, Presence::OmitIfEmpty);
}

// --- Helper Functions ---

fn append_text<N: DocumentNode>(node: &mut N, name: &str, value: &str, presence: Presence) {
    match presence {
        Presence::OmitIfEmpty if value.is_empty() => {}
        Presence::EmptyAsTag if value.is_empty() => {
            node.append_child(name, None);
        }
        _ => {
            node.append_child(name, Some(value));
        }
    }
}

/// Integers are written through their `Display` form.
fn append_value<N: DocumentNode, T: Display>(node: &mut N, name: &str, value: T) {
    node.append_child(name, Some(&value.to_string()));
}

fn append_decimal<N: DocumentNode>(node: &mut N, name: &str, value: f64) {
    node.append_child(name, Some(&format_decimal(value)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_menu() -> Menu {
        Menu {
            name: "L1Menu_Writer".into(),
            grammar_version: "0.5".into(),
            n_modules: 1,
            algorithms: vec![Algorithm {
                name: "L1_SingleEG10".into(),
                expression: "EG10".into(),
                index: 2,
                labels: vec!["eg".into(), "single".into()],
                cuts: vec![Cut {
                    name: "EG-ETA_2p5".into(),
                    cut_type: "ETA".into(),
                    minimum: -2.5,
                    maximum: 2.5,
                    ..Default::default()
                }],
                object_requirements: vec![ObjectRequirement {
                    name: "EG10".into(),
                    object_type: "EG".into(),
                    threshold: 10.0,
                    ..Default::default()
                }],
                external_requirements: vec![ExternalRequirement {
                    name: "EXT_BPTX_plus".into(),
                    bx_offset: -2,
                    comment: "beam pickup".into(),
                }],
                ..Default::default()
            }],
            scale_set: ScaleSet {
                name: "scales".into(),
                ..Default::default()
            },
            ext_signal_set: ExtSignalSet {
                name: "signals".into(),
                ext_signals: vec![ExtSignal {
                    name: "BPTX_plus".into(),
                    system: "BPTX".into(),
                    cable: 2,
                    channel: 5,
                    ..Default::default()
                }],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_menu_preamble() {
        let xml = save_menu_to_string(&sample_menu()).unwrap();
        assert!(xml.starts_with(
            "<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"no\"?>\n\
<tmxsd:menu xmlns:tmxsd=\"http://www.cern.ch/tmxsd/1.0.0\" \
xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
xsi:schemaLocation=\"http://www.cern.ch/tmxsd/1.0.0 menu.xsd\">\n\
\x20 <ancestor_id>0</ancestor_id>\n\
\x20 <name>L1Menu_Writer</name>\n\
\x20 <uuid_menu>00000000-0000-0000-0000-000000000000</uuid_menu>\n\
\x20 <uuid_firmware>00000000-0000-0000-0000-000000000000</uuid_firmware>\n\
\x20 <global_tag/>\n\
\x20 <grammar_version>0.5</grammar_version>\n\
\x20 <n_modules>1</n_modules>\n\
\x20 <is_valid>true</is_valid>\n\
\x20 <is_obsolete>false</is_obsolete>\n\
\x20 <algorithm>\n"
        ));
        assert!(xml.ends_with("</tmxsd:menu>\n"));
    }

    #[test]
    fn test_algorithm_layout() {
        let xml = save_menu_to_string(&sample_menu()).unwrap();
        let expected = "\
\x20 <algorithm>
    <name>L1_SingleEG10</name>
    <expression>EG10</expression>
    <index>2</index>
    <module_id>0</module_id>
    <module_index>0</module_index>
    <labels>eg,single</labels>
    <cut>
      <name>EG-ETA_2p5</name>
      <object/>
      <type>ETA</type>
      <minimum>-2.5000000000000000E+00</minimum>
      <maximum>+2.5000000000000000E+00</maximum>
      <data/>
    </cut>
    <object_requirement>
      <name>EG10</name>
      <type>EG</type>
      <comparison_operator>.ge.</comparison_operator>
      <threshold>+1.0000000000000000E+01</threshold>
      <bx_offset>0</bx_offset>
    </object_requirement>
    <external_requirement>
      <name>EXT_BPTX_plus</name>
      <bx_offset>-2</bx_offset>
      <comment>beam pickup</comment>
    </external_requirement>
  </algorithm>
";
        assert!(xml.contains(expected), "{}", xml);
    }

    #[test]
    fn test_omit_if_empty_fields() {
        let xml = save_menu_to_string(&sample_menu()).unwrap();
        // Neither the menu nor the algorithm has a comment.
        assert_eq!(xml.matches("<comment>").count(), 1);
        assert!(!xml.contains("<description>"));
        assert!(!xml.contains("<label>"));
    }

    #[test]
    fn test_empty_labels_are_omitted() {
        let mut menu = sample_menu();
        menu.algorithms[0].labels.clear();
        let xml = save_menu_to_string(&menu).unwrap();
        assert!(!xml.contains("<labels"));
    }

    #[test]
    fn test_always_fields_written_when_empty() {
        let xml = save_menu_to_string(&Menu::default()).unwrap();
        assert!(xml.contains("  <name/>\n"));
        assert!(xml.contains("  <grammar_version/>\n"));
        assert!(xml.contains("  <scale_set>\n    <name/>\n  </scale_set>\n"));
        assert!(xml.contains("  <ext_signal_set>\n    <name/>\n  </ext_signal_set>\n"));
    }

    #[test]
    fn test_ext_signal_layout() {
        let xml = save_menu_to_string(&sample_menu()).unwrap();
        let expected = "\
\x20   <ext_signal>
      <name>BPTX_plus</name>
      <system>BPTX</system>
      <cable>2</cable>
      <channel>5</channel>
    </ext_signal>
";
        assert!(xml.contains(expected), "{}", xml);
    }

    #[test]
    fn test_scale_layout() {
        let mut menu = sample_menu();
        menu.scale_set.scales.push(Scale {
            object: "EG".into(),
            scale_type: "ET".into(),
            maximum: 63.0,
            step: 0.5,
            n_bits: 6,
            bins: vec![Bin {
                number: 0,
                minimum: 0.0,
                maximum: 0.5,
            }],
            ..Default::default()
        });
        let xml = save_menu_to_string(&menu).unwrap();
        let expected = "\
\x20   <scale>
      <object>EG</object>
      <type>ET</type>
      <minimum>+0.0000000000000000E+00</minimum>
      <maximum>+6.3000000000000000E+01</maximum>
      <step>+5.0000000000000000E-01</step>
      <n_bits>6</n_bits>
      <bin>
        <number>0</number>
        <minimum>+0.0000000000000000E+00</minimum>
        <maximum>+5.0000000000000000E-01</maximum>
      </bin>
    </scale>
";
        assert!(xml.contains(expected), "{}", xml);
    }

    #[test]
    fn test_text_is_escaped() {
        let mut menu = sample_menu();
        menu.algorithms[0].expression = "EG10 AND (A<B) & C".into();
        let xml = save_menu_to_string(&menu).unwrap();
        assert!(xml.contains("<expression>EG10 AND (A&lt;B) &amp; C</expression>"));
    }

    #[test]
    fn test_save_to_failing_writer() {
        struct Broken;
        impl io::Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let err = save_menu_to_writer(&sample_menu(), Broken).unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Io);
    }
}
