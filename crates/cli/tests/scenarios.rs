// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! End-to-end scenario runs against the fake package.

mod common;

use clp_harness::config::{HarnessConfig, ScannerKind};
use clp_harness::control::{CompressRequest, SearchRequest, SearchTarget};
use clp_harness::error::{exit_codes, ErrorKind};
use clp_harness::package::with_running_package;
use clp_harness::report::{ScenarioOutcome, SUMMARY_FILE};
use clp_harness::scenario::{QueryTransform, ScenarioTable};
use clp_harness::session::{Session, INVOCATIONS_FILE};
use common::{FakePackage, HIVE_LINE, HIVE_SYSLOG};

fn hive_session() -> (FakePackage, Session) {
    let pkg = FakePackage::new().with_hive_fixture();
    let session = Session::new(pkg.env(), HarnessConfig::default()).unwrap();
    (pkg, session)
}

/// Compress the hive fixture, run one search, and return its stdout.
async fn search_hive(session: &Session, request: SearchRequest) -> String {
    let owned = session.clone();
    with_running_package(session.package(), move || async move {
        let logs = owned.env().logs_dir("hive-24hrs");
        owned.scripts().compress(&CompressRequest::new(logs)).await?;
        let outcome = owned.scripts().search(&request).await?;
        Ok(outcome.stdout_text().into_owned())
    })
    .await
    .unwrap()
}

// =============================================================================
// Individual searches
// =============================================================================

#[tokio::test]
async fn exact_file_search_returns_the_line_unmodified() {
    let (pkg, session) = hive_session();
    let target = pkg.logs_dir().join("hive-24hrs").join(HIVE_SYSLOG);

    let stdout = search_hive(
        &session,
        SearchRequest::raw("DESERIALIZE_ERRORS").with_target(SearchTarget::FilePath(target)),
    )
    .await;

    assert_eq!(stdout, format!("{}\n", HIVE_LINE));
}

#[tokio::test]
async fn lowercase_query_without_ignore_case_is_empty() {
    let (_pkg, session) = hive_session();
    let query = QueryTransform::Lowercase.apply("DESERIALIZE_ERRORS");
    assert_eq!(query, "deserialize_errors");

    let stdout = search_hive(&session, SearchRequest::raw(query)).await;
    assert_eq!(stdout, "");
}

#[tokio::test]
async fn lowercase_last_with_ignore_case_matches_oracle() {
    let (_pkg, session) = hive_session();
    let transform = QueryTransform::LowercaseLast;
    let query = transform.apply("DESERIALIZE_ERRORS");
    assert_eq!(query, "DESERIALIZE_ERRORs");

    let stdout = search_hive(
        &session,
        SearchRequest::raw(query).ignore_case(transform.ignore_case()),
    )
    .await;

    let group = &ScenarioTable::builtin().groups[0];
    let oracle = session
        .oracle_result(&group.parameters(session.env()))
        .await
        .unwrap();
    assert_eq!(
        test_capture::normalize(&stdout),
        std::fs::read_to_string(oracle).unwrap()
    );
}

// =============================================================================
// Whole runs
// =============================================================================

#[tokio::test]
async fn builtin_table_passes() {
    let (pkg, session) = hive_session();

    let summary = session.run(&ScenarioTable::builtin().groups).await.unwrap();

    assert!(summary.is_success(), "{}", summary.render_text());
    assert_eq!(summary.totals().passed, 4);
    assert_eq!(summary.exit_code(), exit_codes::SUCCESS);
    assert_eq!(pkg.events(), vec!["start", "stop"]);
    assert!(!pkg.exists("var/data"));

    let out = pkg.output_dir();
    assert!(out.join(SUMMARY_FILE).is_file());
    assert!(out.join(INVOCATIONS_FILE).is_file());
    assert_eq!(
        std::fs::read_to_string(out.join("grep-hive-24hrs-DESERIALIZE_ERRORS"))
            .unwrap()
            .lines()
            .count(),
        3
    );

    let log = session.log().unwrap();
    assert_eq!(log.find_by_program("compress.sh").len(), 1);
    assert_eq!(log.find_by_program("search.sh").len(), 4);
    // The oracle is computed once for the two transforms that need it.
    assert_eq!(log.find_by_program("grep").len(), 1);
    assert!(log.find_failures().is_empty());
}

#[tokio::test]
async fn each_group_gets_its_own_lifecycle() {
    let pkg = FakePackage::new().with_hive_fixture();
    let session = Session::new(pkg.env(), HarnessConfig::default()).unwrap();
    let table = ScenarioTable::parse(
        r#"
        [[groups]]
        name = "hive-24hrs"
        query = "DESERIALIZE_ERRORS"
        transforms = ["identity"]

        [[groups]]
        name = "hive-24hrs-again"
        query = "DESERIALIZE_ERRORS"
        transforms = ["identity"]
        "#,
    )
    .unwrap();
    // Second group reads the same fixture under another name.
    std::os::unix::fs::symlink(
        pkg.logs_dir().join("hive-24hrs"),
        pkg.logs_dir().join("hive-24hrs-again"),
    )
    .unwrap();

    let summary = session.run(&table.groups).await.unwrap();
    assert!(summary.is_success(), "{}", summary.render_text());
    assert_eq!(pkg.events(), vec!["start", "stop", "start", "stop"]);
    // Different dataset names give different labels.
    assert_eq!(session.oracle().labels().await.len(), 2);
}

#[tokio::test]
async fn one_fixture_many_queries() {
    let (pkg, session) = hive_session();
    let table = ScenarioTable::parse(
        r#"
        [[groups]]
        name = "hive-24hrs"
        query = "DESERIALIZE_ERRORS"
        transforms = ["identity"]

        [[groups]]
        name = "hive-24hrs"
        query = "starting"
        "#,
    )
    .unwrap();
    table.validate().unwrap();

    let summary = session.run(&table.groups).await.unwrap();

    assert!(summary.is_success(), "{}", summary.render_text());
    assert_eq!(summary.totals().passed, 4);
    assert_eq!(pkg.events(), vec!["start", "stop", "start", "stop"]);
    assert_eq!(
        session.oracle().labels().await,
        vec!["grep-hive-24hrs-DESERIALIZE_ERRORS", "grep-hive-24hrs-starting"]
    );
}

#[tokio::test]
async fn lowercase_transform_of_lowercase_query_matches_oracle() {
    let (_pkg, session) = hive_session();
    let table = ScenarioTable::parse(
        r#"
        [[groups]]
        name = "hive-24hrs"
        query = "starting"
        transforms = ["lowercase"]
        "#,
    )
    .unwrap();

    let summary = session.run(&table.groups).await.unwrap();

    assert!(summary.is_success(), "{}", summary.render_text());
    let log = session.log().unwrap();
    assert_eq!(log.find_by_program("grep").len(), 1);
}

#[tokio::test]
async fn mismatch_is_reported_with_both_paths() {
    let pkg = FakePackage::new().with_hive_fixture();
    // A search backend that drops one match.
    pkg.set_script(
        "search.sh",
        "for last; do :; done\n\
         case \"$last\" in deserialize_errors) exit 0 ;; esac\n\
         echo '2015-03-23 12:01:00,000 INFO [main] org.apache.hadoop.hive.ql.exec.MapOperator: DESERIALIZE_ERRORS:3'",
    );
    let session = Session::new(pkg.env(), HarnessConfig::default()).unwrap();
    let table = ScenarioTable::parse(
        r#"
        [[groups]]
        name = "hive-24hrs"
        query = "DESERIALIZE_ERRORS"
        "#,
    )
    .unwrap();

    let summary = session.run(&table.groups).await.unwrap();
    let scenarios = &summary.groups[0].scenarios;

    let ScenarioOutcome::Failed(ref failure) = scenarios[0].outcome else {
        panic!("identity search should fail: {:?}", scenarios[0]);
    };
    assert_eq!(failure.kind, ErrorKind::Assertion);
    assert!(failure.message.contains("grep-hive-24hrs-DESERIALIZE_ERRORS"));
    assert!(failure.message.contains("clp-hive-24hrs-DESERIALIZE_ERRORS-identity.txt"));
    assert!(failure.excerpt.as_ref().unwrap().contains("DESERIALIZE_ERRORS:0"));
    assert!(matches!(scenarios[1].outcome, ScenarioOutcome::Passed { .. }));
    assert!(matches!(scenarios[2].outcome, ScenarioOutcome::Failed(_)));
    assert_eq!(summary.exit_code(), exit_codes::SCENARIO_FAILED);
    assert_eq!(pkg.events(), vec!["start", "stop"]);
}

#[tokio::test]
async fn dataset_group_counts_and_buckets() {
    let pkg = FakePackage::new();
    pkg.write_fixture(
        "mongodb",
        "mongod.log",
        "{\"msg\":\"mongo::RecoveryUnit::onRollback\"}\n\
         {\"msg\":\"other\"}\n\
         {\"msg\":\"mongo::RecoveryUnit::onRollback\"}\n",
    );
    let mut config = HarnessConfig::default();
    config.oracle.scanner = ScannerKind::Builtin;
    let session = Session::new(pkg.env(), config).unwrap();
    let table = ScenarioTable::parse(
        r#"
        [[groups]]
        name = "mongodb"
        query = "mongo::RecoveryUnit::onRollback"
        dataset = "pytest"
        transforms = ["identity"]

        [groups.count]
        expected = 2

        [groups.time_buckets]
        bucket_ms = 60000
        expected = [{ timestamp = 0, count = 2 }]
        "#,
    )
    .unwrap();

    let summary = session.run(&table.groups).await.unwrap();
    assert!(summary.is_success(), "{}", summary.render_text());

    let log = session.log().unwrap();
    let compress = &log.find_by_program("compress.sh")[0];
    assert_eq!(compress.command.args[..2], ["--dataset", "pytest"]);
    assert!(log
        .find_by_program("search.sh")
        .iter()
        .all(|i| i.command.args.windows(2).any(|w| w == ["--dataset", "pytest"])));
}
