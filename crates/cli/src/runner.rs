// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario execution against a running package.
//!
//! A group compresses its fixture once, then runs each scenario in order.
//! A failing scenario does not stop its siblings unless the failure is
//! fatal, in which case the rest of the group is skipped.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::compare::write_sorted_output;
use crate::control::{CompressRequest, SearchRequest, SearchTarget, SEARCH_SCRIPT};
use crate::error::HarnessError;
use crate::oracle::label_file_name;
use crate::report::{GroupReport, ScenarioReport};
use crate::scenario::{
    parse_count, parse_time_buckets, BucketCount, CountCheck, ExactFileCheck, QueryTransform,
    Scenario, ScenarioGroup, TestCaseParameters, TimeBucketCheck,
};
use crate::session::Session;

/// Compress the group's fixture and run its scenarios, appending each
/// outcome to `report` as soon as it is known.
///
/// Only a compress failure is returned; scenario failures are recorded.
pub async fn run_group(
    session: &Session,
    group: &ScenarioGroup,
    report: &Arc<Mutex<GroupReport>>,
) -> Result<(), HarnessError> {
    let params = group.parameters(session.env());

    info!(group = %params.name, dir = %params.logs_dir.display(), "compressing fixture");
    let request =
        CompressRequest::new(&params.logs_dir).with_dataset(params.dataset.clone());
    session.scripts().compress(&request).await?;

    let mut fatal: Option<String> = None;
    for scenario in group.scenarios() {
        let name = scenario.name();
        let entry = match fatal {
            Some(ref reason) => ScenarioReport::skipped(name, reason.clone()),
            None => match run_scenario(session, &params, &scenario).await {
                Ok(detail) => {
                    info!(group = %params.name, scenario = %name, "passed");
                    ScenarioReport::passed(name, detail)
                }
                Err(e) => {
                    warn!(group = %params.name, scenario = %name, error = %e, "failed");
                    if e.is_fatal() {
                        fatal = Some(format!("skipped after fatal error in {}", name));
                    }
                    ScenarioReport::failed(name, &e)
                }
            },
        };
        report.lock().scenarios.push(entry);
    }
    Ok(())
}

/// Run one scenario. `Ok` carries an optional detail for the report.
pub async fn run_scenario(
    session: &Session,
    params: &TestCaseParameters,
    scenario: &Scenario,
) -> Result<Option<String>, HarnessError> {
    match scenario {
        Scenario::ExactFile(check) => exact_file(session, params, check).await.map(|()| None),
        Scenario::Search(transform) => {
            transformed_search(session, params, *transform).await.map(|()| None)
        }
        Scenario::Count(check) => count(session, params, check).await.map(Some),
        Scenario::TimeBuckets(check) => time_buckets(session, params, check).await.map(Some),
    }
}

fn base_request(params: &TestCaseParameters, query: String) -> SearchRequest {
    SearchRequest::raw(query).with_dataset(params.dataset.clone())
}

fn describe(request: &SearchRequest) -> String {
    format!("{} {}", SEARCH_SCRIPT, request.to_args().join(" "))
}

async fn exact_file(
    session: &Session,
    params: &TestCaseParameters,
    check: &ExactFileCheck,
) -> Result<(), HarnessError> {
    let request = base_request(params, params.query.clone())
        .with_target(SearchTarget::FilePath(params.logs_dir.join(&check.path)));
    let outcome = session.scripts().search(&request).await?;

    let actual = outcome.stdout.as_deref().unwrap_or_default();
    if actual != check.expected.as_bytes() {
        return Err(HarnessError::UnexpectedOutput {
            command: describe(&request),
            expected: check.expected.clone(),
            actual: outcome.stdout_text().into_owned(),
        });
    }
    Ok(())
}

/// Result file for a transformed search, next to the oracle results.
pub fn search_output_path(
    session: &Session,
    params: &TestCaseParameters,
    transform: QueryTransform,
) -> PathBuf {
    let label = match params.dataset {
        Some(ref dataset) => format!(
            "clp-{}-{}-{}-{}",
            params.name, dataset, params.query, transform
        ),
        None => format!("clp-{}-{}-{}", params.name, params.query, transform),
    };
    session
        .output_dir()
        .join(format!("{}.txt", label_file_name(&label)))
}

async fn transformed_search(
    session: &Session,
    params: &TestCaseParameters,
    transform: QueryTransform,
) -> Result<(), HarnessError> {
    let request = base_request(params, transform.apply(&params.query))
        .ignore_case(transform.ignore_case());
    let outcome = session.scripts().search(&request).await?;
    let stdout = outcome.stdout_text();

    if !transform.expects_results(&params.query) {
        if !stdout.is_empty() {
            return Err(HarnessError::UnexpectedOutput {
                command: describe(&request),
                expected: String::new(),
                actual: stdout.into_owned(),
            });
        }
        return Ok(());
    }

    let actual = search_output_path(session, params, transform);
    write_sorted_output(&actual, &stdout)?;
    let expected = session.oracle_result(params).await?;
    session.differ().diff_files(&expected, &actual).await
}

async fn count(
    session: &Session,
    params: &TestCaseParameters,
    check: &CountCheck,
) -> Result<String, HarnessError> {
    let request = base_request(params, params.query.clone()).with_target(SearchTarget::Count);
    let outcome = session.scripts().search(&request).await?;
    let stdout = outcome.stdout_text();

    let Some(count) = parse_count(&stdout) else {
        return Err(HarnessError::UnexpectedOutput {
            command: describe(&request),
            expected: "a match count".to_string(),
            actual: stdout.into_owned(),
        });
    };
    if let Some(expected) = check.expected {
        if expected != count {
            return Err(HarnessError::UnexpectedOutput {
                command: describe(&request),
                expected: expected.to_string(),
                actual: count.to_string(),
            });
        }
    }
    Ok(format!("{} matches", count))
}

fn render_buckets(buckets: &[BucketCount]) -> String {
    buckets
        .iter()
        .map(|b| format!("timestamp: {} count: {}", b.timestamp, b.count))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn time_buckets(
    session: &Session,
    params: &TestCaseParameters,
    check: &TimeBucketCheck,
) -> Result<String, HarnessError> {
    let request = base_request(params, params.query.clone())
        .with_target(SearchTarget::CountByTimeBucket(check.bucket_ms));
    let outcome = session.scripts().search(&request).await?;
    let stdout = outcome.stdout_text();

    let buckets = parse_time_buckets(&stdout).map_err(|message| HarnessError::UnexpectedOutput {
        command: describe(&request),
        expected: format!("`timestamp: <ms> count: <n>` lines ({})", message),
        actual: stdout.to_string(),
    })?;
    if let Some(ref expected) = check.expected {
        if *expected != buckets {
            return Err(HarnessError::UnexpectedOutput {
                command: describe(&request),
                expected: render_buckets(expected),
                actual: render_buckets(&buckets),
            });
        }
    }
    Ok(format!("{} buckets", buckets.len()))
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
