use ctm_promote::core::document::{attrs, tags, xml, Element};
use ctm_promote::core::environment::Environment;
use ctm_promote::core::steps::{activate_folders, FolderActivation, RewriteStep, StepOutcome};
use std::path::Path;

fn fixture() -> Element {
    xml::parse_file(Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/jobs_dev.xml"
    )))
    .unwrap()
}

#[test]
fn test_manual_folders_become_system() {
    let mut root = fixture();
    assert_eq!(activate_folders(&mut root), 1);
    for folder in root.child_elements(tags::FOLDER) {
        assert_eq!(folder.attr(attrs::FOLDER_ORDER_METHOD), Some("SYSTEM"));
    }
}

#[test]
fn test_activation_is_idempotent() {
    let mut once = fixture();
    activate_folders(&mut once);
    let mut twice = once.clone();

    assert_eq!(activate_folders(&mut twice), 0);
    assert_eq!(once, twice);
    assert_eq!(xml::to_string(&once, 4).unwrap(), xml::to_string(&twice, 4).unwrap());
}

#[test]
fn test_missing_order_method_is_added() {
    let mut root = Element::new(tags::DEFTABLE)
        .with_child(Element::new(tags::FOLDER).with_attr(attrs::FOLDER_NAME, "NEW"));
    assert_eq!(activate_folders(&mut root), 1);
    let folder = root.child_elements(tags::FOLDER).next().unwrap();
    assert_eq!(folder.attr(attrs::FOLDER_ORDER_METHOD), Some("SYSTEM"));
}

#[test]
fn test_step_ignores_target_environment() {
    let step = FolderActivation;
    assert_eq!(step.name(), "activate");
    assert!(!step.requires_target());

    for target in Environment::ALL {
        let mut root = fixture();
        let outcome = step.apply(&mut root, target).unwrap();
        assert_eq!(outcome, StepOutcome::Applied { changes: 1 });
    }
}
