use ctm_promote::core::document::{attrs, tags, xml, Element};
use ctm_promote::core::{AppError, ErrorCategory};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn fixture_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/jobs_dev.xml"))
}

fn parse_error(input: &str) -> AppError {
    AppError::from(xml::parse_str(input).unwrap_err())
}

#[test]
fn test_parse_fixture_structure() {
    let root = xml::parse_file(fixture_path()).unwrap();
    assert_eq!(root.tag(), tags::DEFTABLE);
    assert_eq!(root.child_elements(tags::FOLDER).count(), 2);
    assert_eq!(root.descendants(tags::JOB).len(), 4);

    let job = root
        .find(tags::JOB, attrs::JOBNAME, "FIN-DEV-GL-ETL-001-ADF-LoadData")
        .unwrap();
    assert_eq!(job.attr(attrs::NODEID), Some("lnxdevapp01"));
    let tags_in_order: Vec<_> = job.children().iter().map(Element::tag).collect();
    assert_eq!(
        tags_in_order,
        vec!["QUANTITATIVE", "QUANTITATIVE", "INCOND", "OUTCOND", "VARIABLE", "ON"]
    );
}

#[test]
fn test_attribute_order_is_preserved() {
    let root = xml::parse_str(r#"<JOB Z="1" A="2" M="3"/>"#).unwrap();
    let keys: Vec<_> = root.attributes().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Z", "A", "M"]);
}

#[test]
fn test_text_and_cdata_are_kept() {
    let root = xml::parse_str("<A><B>  hello  </B><C><![CDATA[x < y]]></C></A>").unwrap();
    assert_eq!(root.children()[0].text(), Some("  hello  "));
    assert_eq!(root.children()[1].text(), Some("x < y"));
}

#[test]
fn test_mismatched_tags_are_parse_errors() {
    let err = parse_error("<DEFTABLE><FOLDER></DEFTABLE>");
    assert_eq!(err.category, ErrorCategory::ValidationError);
    assert_eq!(err.code, "DOC-PARSE-001");
}

#[test]
fn test_structural_parse_errors() {
    for input in ["", "<A/><B/>", "stray<A/>", "<A><B/>"] {
        let err = parse_error(input);
        assert_eq!(err.code, "DOC-PARSE-001", "input {:?}", input);
    }
    assert!(parse_error("<A/><B/>").message.contains("more than one root"));
    assert!(parse_error("").message.contains("no root"));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp = TempDir::new().unwrap();
    let err = AppError::from(xml::parse_file(&temp.path().join("missing.xml")).unwrap_err());
    assert_eq!(err.category, ErrorCategory::IoError);
    assert_eq!(err.code, "DOC-IO-001");
}

#[test]
fn test_serialization_layout() {
    let root = Element::new(tags::DEFTABLE).with_child(
        Element::new(tags::FOLDER)
            .with_attr(attrs::FOLDER_NAME, "F")
            .with_child(Element::new(tags::JOB).with_attr(attrs::JOBNAME, "J")),
    );
    let text = xml::to_string(&root, 4).unwrap();
    assert_eq!(
        text,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <DEFTABLE>\n    \
         <FOLDER FOLDER_NAME=\"F\">\n        \
         <JOB JOBNAME=\"J\"/>\n    \
         </FOLDER>\n\
         </DEFTABLE>\n"
    );
}

#[test]
fn test_serialization_is_deterministic_and_reparses() {
    let root = xml::parse_file(fixture_path()).unwrap();
    let first = xml::to_string(&root, 4).unwrap();
    let second = xml::to_string(&root, 4).unwrap();
    assert_eq!(first, second);
    assert_eq!(xml::parse_str(&first).unwrap(), root);
}

#[test]
fn test_special_characters_survive_writing() {
    let root = Element::new(tags::JOB).with_attr("CMDLINE", r#"a && b < "c""#);
    let text = xml::to_string(&root, 2).unwrap();
    let reparsed = xml::parse_str(&text).unwrap();
    assert_eq!(reparsed.attr("CMDLINE"), Some(r#"a && b < "c""#));
}

#[test]
fn test_encoded_whitespace_and_padded_text_survive_round_trip() {
    let source = "<JOB CMDLINE=\"a&#10;b\"><DESCRIPTION>  x  </DESCRIPTION></JOB>";
    let root = xml::parse_str(source).unwrap();
    assert_eq!(root.attr("CMDLINE"), Some("a\nb"));
    assert_eq!(root.children()[0].text(), Some("  x  "));

    let text = xml::to_string(&root, 4).unwrap();
    assert!(text.contains("CMDLINE=\"a&#10;b\""));
    assert!(text.contains("<DESCRIPTION>  x  </DESCRIPTION>"));
    assert_eq!(xml::parse_str(&text).unwrap(), root);
}

#[test]
fn test_write_file_creates_parent_directories() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("out").join("nested").join("jobs.xml");
    let root = Element::new(tags::DEFTABLE);

    xml::write_file(&target, &root, 4).unwrap();

    let written = fs::read_to_string(&target).unwrap();
    assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(written.contains("<DEFTABLE/>"));
}
