//! Integration tests focused on error handling and edge cases.
//!
//! These tests ensure the reader reports malformed XML, missing elements,
//! unconvertible values and unreadable files as errors, without panicking
//! and without returning a partial menu.

use l1menu::{
    ErrorCategory, MenuError, ReadOptions, ValueKind, load_menu_from_file, load_menu_from_str,
    load_menu_from_str_with, save_menu_to_string,
};
use std::fs;
use std::path::PathBuf;

/// A minimal valid menu used as a base for creating corrupted test cases.
const MINIMAL_VALID_XML: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="no"?>
<tmxsd:menu xmlns:tmxsd="http://www.cern.ch/tmxsd/1.0.0">
  <name>L1Menu_Minimal</name>
  <uuid_menu>00000000-0000-0000-0000-000000000000</uuid_menu>
  <uuid_firmware>00000000-0000-0000-0000-000000000000</uuid_firmware>
  <grammar_version>0.7</grammar_version>
  <n_modules>1</n_modules>
  <algorithm>
    <name>L1_Test</name>
    <expression>OBJ1</expression>
    <index>0</index>
    <module_id>0</module_id>
    <module_index>0</module_index>
    <cut>
      <name>OBJ-ETA</name>
      <object>MU</object>
      <type>ETA</type>
      <minimum>-1.0</minimum>
      <maximum>1.0</maximum>
      <data/>
    </cut>
  </algorithm>
  <scale_set>
    <name>scales</name>
    <scale>
      <object>EG</object>
      <type>ET</type>
      <minimum>0</minimum>
      <maximum>63</maximum>
      <step>1</step>
      <n_bits>6</n_bits>
    </scale>
  </scale_set>
  <ext_signal_set>
    <name>signals</name>
    <ext_signal>
      <name>BPTX_plus</name>
      <system>BPTX</system>
      <cable>2</cable>
      <channel>5</channel>
    </ext_signal>
  </ext_signal_set>
</tmxsd:menu>"#;

fn expect_coercion(xml: &str, expected_field: &str, expected_kind: ValueKind) {
    let result = load_menu_from_str(xml);
    match result {
        Err(MenuError::TypeCoercion { field, kind, .. }) => {
            assert_eq!(field, expected_field);
            assert_eq!(kind, expected_kind);
        }
        other => panic!("Expected TypeCoercion on {}, got {:?}", expected_field, other),
    }
}

#[test]
fn test_minimal_template_is_valid() {
    let menu = load_menu_from_str_with(MINIMAL_VALID_XML, &ReadOptions::strict())
        .expect("Template should parse");
    assert_eq!(menu.algorithms.len(), 1);
}

/// Verifies that the reader catches malformed XML syntax (e.g., unclosed tags).
#[test]
fn test_malformed_xml_syntax() {
    let xml = r#"<tmxsd:menu><name>broken ... missing closing tags"#;
    let result = load_menu_from_str(xml);
    match result {
        Err(e) => assert_eq!(e.category(), ErrorCategory::Structural, "{:?}", e),
        Ok(menu) => panic!("Expected a structural error, got {:?}", menu),
    }
}

#[test]
fn test_mismatched_closing_tag() {
    let xml = MINIMAL_VALID_XML.replace("</expression>", "</expr>");
    let err = load_menu_from_str(&xml).unwrap_err();
    assert!(matches!(err, MenuError::Xml(_)), "{:?}", err);
}

#[test]
fn test_missing_menu_root() {
    let xml = MINIMAL_VALID_XML.replace("tmxsd:menu", "tmxsd:configuration");
    let err = load_menu_from_str(&xml).unwrap_err();
    assert!(
        matches!(&err, MenuError::MissingElement { element } if element == "menu"),
        "{:?}",
        err
    );
}

#[test]
fn test_invalid_unsigned_names_field() {
    let xml = MINIMAL_VALID_XML.replace("<index>0</index>", "<index>abc</index>");
    expect_coercion(&xml, "algorithm/index", ValueKind::Unsigned);
}

#[test]
fn test_negative_unsigned_is_rejected() {
    let xml = MINIMAL_VALID_XML.replace("<n_modules>1</n_modules>", "<n_modules>-1</n_modules>");
    expect_coercion(&xml, "menu/n_modules", ValueKind::Unsigned);
}

#[test]
fn test_invalid_decimal_names_field() {
    let xml = MINIMAL_VALID_XML.replace("<maximum>1.0</maximum>", "<maximum>one</maximum>");
    expect_coercion(&xml, "cut/maximum", ValueKind::Decimal);
}

#[test]
fn test_invalid_nested_scale_field() {
    let xml = MINIMAL_VALID_XML.replace("<n_bits>6</n_bits>", "<n_bits>6 bits</n_bits>");
    expect_coercion(&xml, "scale/n_bits", ValueKind::Unsigned);
}

#[test]
fn test_invalid_ext_signal_field() {
    let xml = MINIMAL_VALID_XML.replace("<channel>5</channel>", "<channel>five</channel>");
    expect_coercion(&xml, "ext_signal/channel", ValueKind::Unsigned);
}

#[test]
fn test_strict_mode_rejects_missing_name() {
    let xml = MINIMAL_VALID_XML.replace("<name>BPTX_plus</name>", "");
    assert_eq!(load_menu_from_str(&xml).unwrap().ext_signal_set.ext_signals[0].name, "");

    let err = load_menu_from_str_with(&xml, &ReadOptions::strict()).unwrap_err();
    assert!(
        matches!(&err, MenuError::MissingElement { element } if element == "ext_signal/name"),
        "{:?}",
        err
    );
    assert_eq!(err.category(), ErrorCategory::Structural);
}

#[test]
fn test_missing_file_is_io_error() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("does_not_exist.xml");
    let err = load_menu_from_file(&path, &ReadOptions::default()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Io);
    assert!(err.to_string().contains("does_not_exist.xml"), "{}", err);
}

#[test]
fn test_non_utf8_file_is_structural() {
    let path = std::env::temp_dir().join(format!("l1menu_non_utf8_{}.xml", std::process::id()));
    let mut bytes = b"<tmxsd:menu><name>".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe, 0xfd]);
    bytes.extend_from_slice(b"</name></tmxsd:menu>");
    fs::write(&path, &bytes).unwrap();

    let result = load_menu_from_file(&path, &ReadOptions::default());
    fs::remove_file(&path).ok();

    let err = result.unwrap_err();
    assert!(matches!(err, MenuError::Malformed(_)), "{:?}", err);
}

#[test]
fn test_unknown_entity_is_structural() {
    let xml = MINIMAL_VALID_XML.replace("<name>L1_Test</name>", "<name>L1_&bogus;</name>");
    let err = load_menu_from_str(&xml).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Structural, "{:?}", err);
}

#[test]
fn test_crlf_line_endings_are_normalized() {
    let xml = MINIMAL_VALID_XML.replace('\n', "\r\n").replace(
        "<n_modules>1</n_modules>",
        "<n_modules>1</n_modules>\r\n  <comment>line1\r\nline2</comment>",
    );
    let menu = load_menu_from_str_with(&xml, &ReadOptions::strict()).unwrap();
    assert_eq!(menu.comment, "line1\nline2");
    assert_eq!(menu.algorithms[0].name, "L1_Test");

    let written = save_menu_to_string(&menu).unwrap();
    assert!(!written.contains('\r'));
}

#[test]
fn test_nul_character_reference_is_rejected() {
    let xml = MINIMAL_VALID_XML.replace("<name>L1Menu_Minimal</name>", "<name>&#0;</name>");
    let err = load_menu_from_str(&xml).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Structural, "{:?}", err);
}
