use ctm_promote::core::document::{attrs, tags, xml, Element};
use ctm_promote::core::environment::Environment;
use ctm_promote::core::steps::{
    standardize_resources, ResourceStandardizer, RewriteStep, StepOutcome, BASELINE_RESOURCE,
};
use ctm_promote::core::ProfileTable;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

fn fixture() -> Element {
    xml::parse_file(Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/jobs_dev.xml"
    )))
    .unwrap()
}

fn job(name: &str, resources: &[&str]) -> Element {
    let mut job = Element::new(tags::JOB).with_attr(attrs::JOBNAME, name);
    for resource in resources {
        job.push_child(
            Element::new(tags::QUANTITATIVE)
                .with_attr(attrs::NAME, *resource)
                .with_attr(attrs::QUANT, "1")
                .with_attr(attrs::ONFAIL, "R")
                .with_attr(attrs::ONOK, "R"),
        );
    }
    job
}

fn resource_set(job: &Element) -> BTreeSet<String> {
    job.child_elements(tags::QUANTITATIVE)
        .filter_map(|q| q.attr(attrs::NAME))
        .map(str::to_string)
        .collect()
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn standardize(job_element: Element, target: Environment) -> Element {
    let mut root = Element::new(tags::DEFTABLE)
        .with_child(Element::new(tags::FOLDER).with_child(job_element));
    standardize_resources(&mut root, target).unwrap();
    root.descendants(tags::JOB)[0].clone()
}

#[test]
fn test_adb_job_converges_to_three_resources() {
    let result = standardize(job("X-ADB-Y", &[]), Environment::Prod);
    assert_eq!(
        resource_set(&result),
        set(&[BASELINE_RESOURCE, "DWPROD", "APP-AZ-ADB"])
    );
}

#[test]
fn test_adf_resource_is_renamed_not_duplicated() {
    let result = standardize(
        job("X-ADF-Y", &["ADFDEV", BASELINE_RESOURCE]),
        Environment::Preprod,
    );
    assert_eq!(resource_set(&result), set(&[BASELINE_RESOURCE, "APP-AZ-ADF-PP"]));
    assert_eq!(result.child_elements(tags::QUANTITATIVE).count(), 2);
}

#[test]
fn test_preprod_aliases_are_promoted_to_prod() {
    let result = standardize(
        job("X-ADB-Y", &[BASELINE_RESOURCE, "DWPREPROD", "APP-AZ-ADB-PP"]),
        Environment::Prod,
    );
    assert_eq!(
        resource_set(&result),
        set(&[BASELINE_RESOURCE, "DWPROD", "APP-AZ-ADB"])
    );
    assert_eq!(result.child_elements(tags::QUANTITATIVE).count(), 3);
}

#[test]
fn test_dw_job_with_stray_resource_renames_it() {
    let result = standardize(job("X-DW-Y", &["LEGACY_SLOT"]), Environment::Preprod);
    assert_eq!(resource_set(&result), set(&[BASELINE_RESOURCE, "DWPREPROD"]));
}

#[test]
fn test_plain_job_only_gets_baseline() {
    let result = standardize(job("X-PLAIN-Y", &[]), Environment::Preprod);
    assert_eq!(resource_set(&result), set(&[BASELINE_RESOURCE]));
    let added = result.child_elements(tags::QUANTITATIVE).next().unwrap();
    assert_eq!(added.attr(attrs::QUANT), Some("1"));
    assert_eq!(added.attr(attrs::ONFAIL), Some("R"));
    assert_eq!(added.attr(attrs::ONOK), Some("R"));
}

#[test]
fn test_fixture_document_for_preprod() {
    let mut root = fixture();
    let stats = standardize_resources(&mut root, Environment::Preprod).unwrap();
    assert_eq!(stats.jobs, 4);

    let expect = [
        ("FIN-DEV-GL-ETL-001-ADF-LoadData", vec![BASELINE_RESOURCE, "APP-AZ-ADF-PP"]),
        (
            "FIN-DEV-GL-ETL-002-ADB-Transform",
            vec![BASELINE_RESOURCE, "DWPREPROD", "APP-AZ-ADB-PP"],
        ),
        ("FIN-DEV-GL-ETL-003-DW-Publish", vec![BASELINE_RESOURCE, "DWPREPROD"]),
        ("FIN-DEV-GL-ADHOC-001-Cleanup", vec![BASELINE_RESOURCE]),
    ];
    for (name, resources) in expect {
        let job = root.find(tags::JOB, attrs::JOBNAME, name).unwrap();
        assert_eq!(resource_set(job), set(&resources), "job {}", name);
    }
}

#[test]
fn test_inserted_resources_precede_conditions() {
    let mut root = fixture();
    standardize_resources(&mut root, Environment::Prod).unwrap();
    let job = root
        .find(tags::JOB, attrs::JOBNAME, "FIN-DEV-GL-ETL-002-ADB-Transform")
        .unwrap();
    let tags_in_order: Vec<_> = job.children().iter().map(Element::tag).collect();
    assert_eq!(
        tags_in_order,
        vec!["INCOND", "QUANTITATIVE", "QUANTITATIVE", "QUANTITATIVE", "OUTCOND"]
    );
}

#[test]
fn test_dev_target_is_a_byte_identical_no_op() {
    let original = fixture();
    let mut root = original.clone();
    let step = ResourceStandardizer::new(Arc::new(ProfileTable::standard().unwrap()));

    let outcome = step.apply(&mut root, Environment::Dev).unwrap();

    assert!(matches!(outcome, StepOutcome::Skipped { .. }));
    assert_eq!(
        xml::to_string(&original, 4).unwrap(),
        xml::to_string(&root, 4).unwrap()
    );
}

#[test]
fn test_missing_profile_is_a_skip() {
    let table = ProfileTable::standard().unwrap().without(Environment::Prod);
    let step = ResourceStandardizer::new(Arc::new(table));
    let mut root = fixture();
    let before = root.clone();

    let outcome = step.apply(&mut root, Environment::Prod).unwrap();

    assert!(matches!(outcome, StepOutcome::Skipped { .. }));
    assert_eq!(root, before);
}
