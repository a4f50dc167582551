use ctm_promote::core::document::{attrs, tags, xml, Element};
use ctm_promote::core::environment::{Environment, ProfileTable};
use ctm_promote::core::steps::{apply_environment_promotion, EnvironmentPromoter, RewriteStep};
use ctm_promote::core::{ErrorCategory, ErrorSeverity};
use std::path::Path;
use std::sync::Arc;

fn fixture() -> Element {
    xml::parse_file(Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/jobs_dev.xml"
    )))
    .unwrap()
}

fn single_job(name: &str) -> Element {
    Element::new(tags::DEFTABLE).with_child(
        Element::new(tags::FOLDER).with_child(Element::new(tags::JOB).with_attr(attrs::JOBNAME, name)),
    )
}

fn job_name(root: &Element) -> &str {
    root.descendants(tags::JOB)[0].attr(attrs::JOBNAME).unwrap()
}

#[test]
fn test_job_name_round_trip_through_the_chain() {
    let mut root = single_job("FIN-DEV-GL-ETL-001-ADF-LoadData");

    apply_environment_promotion(&mut root, Environment::Preprod).unwrap();
    assert_eq!(job_name(&root), "FIN-PREPROD-GL-ETL-001-ADF-LoadData-preprod");

    apply_environment_promotion(&mut root, Environment::Prod).unwrap();
    assert_eq!(job_name(&root), "FIN-PROD-GL-ETL-001-ADF-LoadData");
}

#[test]
fn test_job_suffix_is_not_added_twice() {
    let mut root = single_job("FIN-DEV-X-preprod");
    apply_environment_promotion(&mut root, Environment::Preprod).unwrap();
    assert_eq!(job_name(&root), "FIN-PREPROD-X-preprod");
}

#[test]
fn test_fixture_promoted_to_preprod() {
    let mut root = fixture();
    let changes = apply_environment_promotion(&mut root, Environment::Preprod).unwrap();
    assert!(changes > 0);

    let folder = root.child_elements(tags::FOLDER).next().unwrap();
    assert_eq!(folder.attr(attrs::FOLDER_NAME), Some("FIN-PREPROD-GL-ETL"));
    assert_eq!(folder.attr(attrs::APPLICATION), Some("FIN-PREPROD-GL"));
    assert_eq!(folder.attr(attrs::DATACENTER), Some("preprod_dc_1"));

    let job = root
        .find(tags::JOB, attrs::JOBNAME, "FIN-PREPROD-GL-ETL-001-ADF-LoadData-preprod")
        .unwrap();
    assert_eq!(job.attr(attrs::PARENT_FOLDER), Some("FIN-PREPROD-GL-ETL"));
    assert_eq!(job.attr(attrs::SUB_APPLICATION), Some("FIN-PREPROD-GL-ETL"));
    assert_eq!(job.attr(attrs::RUN_AS), Some("svc_acct_fin_pp"));
    assert_eq!(job.attr(attrs::NODEID), Some("lnxppapp01"));
    assert_eq!(job.attr("CMDLINE"), Some("run_adf.sh LoadData"));

    let variable = job.child_elements(tags::VARIABLE).next().unwrap();
    assert_eq!(variable.attr(attrs::VALUE), Some("svc_acct_fin_pp"));
    let incond = job.child_elements(tags::INCOND).next().unwrap();
    assert_eq!(incond.attr(attrs::NAME), Some("FIN-PREPROD-GL-ETL-000-Start-OK"));
    let outcond = job.child_elements(tags::OUTCOND).next().unwrap();
    assert_eq!(
        outcond.attr(attrs::NAME),
        Some("FIN-PREPROD-GL-ETL-001-ADF-LoadData-OK")
    );
}

#[test]
fn test_datacenter_match_is_case_insensitive() {
    let mut root = fixture();
    apply_environment_promotion(&mut root, Environment::Preprod).unwrap();
    let adhoc = root
        .find(tags::FOLDER, attrs::FOLDER_NAME, "FIN-PREPROD-GL-ADHOC")
        .unwrap();
    assert_eq!(adhoc.attr(attrs::DATACENTER), Some("preprod_dc_1"));
}

#[test]
fn test_fixture_promoted_twice_reaches_prod() {
    let mut root = fixture();
    apply_environment_promotion(&mut root, Environment::Preprod).unwrap();
    apply_environment_promotion(&mut root, Environment::Prod).unwrap();

    let job = root
        .find(tags::JOB, attrs::JOBNAME, "FIN-PROD-GL-ETL-001-ADF-LoadData")
        .unwrap();
    assert_eq!(job.attr(attrs::RUN_AS), Some("svc_acct_fin"));
    assert_eq!(job.attr(attrs::NODEID), Some("lnxprodapp01"));
    let folder = root.child_elements(tags::FOLDER).next().unwrap();
    assert_eq!(folder.attr(attrs::DATACENTER), Some("prod_dc_1"));
}

#[test]
fn test_node_without_fragment_is_untouched() {
    let mut root = Element::new(tags::DEFTABLE)
        .with_child(Element::new(tags::JOB).with_attr(attrs::NODEID, "winbatch01"));
    let changes = apply_environment_promotion(&mut root, Environment::Preprod).unwrap();
    assert_eq!(changes, 0);
    assert_eq!(root.children()[0].attr(attrs::NODEID), Some("winbatch01"));
}

#[test]
fn test_dev_target_is_rejected_without_changes() {
    let mut root = fixture();
    let before = root.clone();

    let err = apply_environment_promotion(&mut root, Environment::Dev).unwrap_err();

    assert_eq!(err.code, "PROMOTE-001");
    assert_eq!(err.category, ErrorCategory::ValidationError);
    assert_eq!(root, before);
}

#[test]
fn test_missing_profile_is_fatal() {
    let table = ProfileTable::standard().unwrap().without(Environment::Dev);
    let step = EnvironmentPromoter::new(Arc::new(table));
    let mut root = fixture();

    let err = step.apply(&mut root, Environment::Preprod).unwrap_err();

    assert_eq!(err.code, "PROMOTE-002");
    assert_eq!(err.severity(), ErrorSeverity::Fatal);
}
