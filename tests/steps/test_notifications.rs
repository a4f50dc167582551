use ctm_promote::core::document::{attrs, tags, xml, Element};
use ctm_promote::core::environment::Environment;
use ctm_promote::core::steps::{standardize_notifications, StepRegistry};
use std::path::Path;

fn fixture() -> Element {
    xml::parse_file(Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/jobs_dev.xml"
    )))
    .unwrap()
}

fn reaction_blocks(job: &Element) -> Vec<&Element> {
    job.child_elements(tags::ON).collect()
}

#[test]
fn test_preprod_jobs_get_exactly_two_blocks() {
    let mut root = fixture();
    let processed = standardize_notifications(&mut root, Environment::Preprod).unwrap();
    assert_eq!(processed, 4);

    for job in root.descendants(tags::JOB) {
        let blocks = reaction_blocks(job);
        assert_eq!(blocks.len(), 2, "job {:?}", job.attr(attrs::JOBNAME));
        assert_eq!(blocks[0].attr("CODE"), Some("NOTOK"));
        assert_eq!(blocks[1].attr("CODE"), Some("ENDEDOK"));
    }
}

#[test]
fn test_prod_jobs_get_exactly_one_block() {
    let mut root = fixture();
    standardize_notifications(&mut root, Environment::Prod).unwrap();

    for job in root.descendants(tags::JOB) {
        let blocks = reaction_blocks(job);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].child_elements(tags::DOREMEDY).next().is_some());
    }
}

#[test]
fn test_old_block_contents_do_not_survive() {
    let mut root = fixture();
    standardize_notifications(&mut root, Environment::Prod).unwrap();

    for mail in root.descendants(tags::DOMAIL) {
        assert_ne!(mail.attr("DEST"), Some("someone@example.com"));
    }
    let shouts: Vec<_> = root.descendants(tags::DOSHOUT);
    assert!(shouts.iter().all(|shout| shout.attr("DEST") == Some("ProdOnCallPager")));
}

#[test]
fn test_non_reaction_children_keep_their_order() {
    let mut root = fixture();
    standardize_notifications(&mut root, Environment::Preprod).unwrap();
    let job = root
        .find(tags::JOB, attrs::JOBNAME, "FIN-DEV-GL-ETL-001-ADF-LoadData")
        .unwrap();
    let tags_in_order: Vec<_> = job.children().iter().map(Element::tag).collect();
    assert_eq!(
        tags_in_order,
        vec!["QUANTITATIVE", "QUANTITATIVE", "INCOND", "OUTCOND", "VARIABLE", "ON", "ON"]
    );
}

#[test]
fn test_dev_target_is_a_byte_identical_no_op() {
    let original = fixture();
    let mut root = original.clone();

    let step = StepRegistry::with_defaults()
        .unwrap()
        .get("notifications")
        .unwrap();
    let outcome = step.apply(&mut root, Environment::Dev).unwrap();

    assert_eq!(outcome.changes(), 0);
    assert_eq!(
        xml::to_string(&original, 4).unwrap(),
        xml::to_string(&root, 4).unwrap()
    );
}
