// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario tables: which fixture datasets to compress and which searches to
//! check against them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::env::EnvironmentParameters;
use crate::error::HarnessError;
use crate::oracle::oracle_label;

/// Line printed by the first matching message of the built-in table.
pub const HIVE_EXACT_FILE_LINE: &str = "2015-03-23 11:54:22,594 INFO [main] \
     org.apache.hadoop.hive.ql.exec.MapOperator: DESERIALIZE_ERRORS:0\n";

/// How a query is altered before it is sent to the search script
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryTransform {
    /// Query unchanged
    Identity,
    /// Whole query lowercased, searched case-sensitively
    Lowercase,
    /// Only the last character lowercased, searched with `--ignore-case`
    LowercaseLast,
}

impl QueryTransform {
    pub const ALL: [QueryTransform; 3] = [
        QueryTransform::Identity,
        QueryTransform::Lowercase,
        QueryTransform::LowercaseLast,
    ];

    pub fn apply(self, query: &str) -> String {
        match self {
            QueryTransform::Identity => query.to_string(),
            QueryTransform::Lowercase => query.to_lowercase(),
            QueryTransform::LowercaseLast => {
                let mut chars = query.chars();
                match chars.next_back() {
                    Some(last) => {
                        let mut out: String = chars.collect();
                        out.extend(last.to_lowercase());
                        out
                    }
                    None => String::new(),
                }
            }
        }
    }

    pub fn ignore_case(self) -> bool {
        matches!(self, QueryTransform::LowercaseLast)
    }

    /// Whether the search for `query` should match the oracle for `query`.
    /// A case-sensitive lowercase search must come back empty, unless
    /// lowercasing leaves the query unchanged.
    pub fn expects_results(self, query: &str) -> bool {
        match self {
            QueryTransform::Lowercase => self.apply(query) == query,
            QueryTransform::Identity | QueryTransform::LowercaseLast => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryTransform::Identity => "identity",
            QueryTransform::Lowercase => "lowercase",
            QueryTransform::LowercaseLast => "lowercase_last",
        }
    }
}

impl std::fmt::Display for QueryTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_transforms() -> Vec<QueryTransform> {
    QueryTransform::ALL.to_vec()
}

/// Search restricted to one original file, compared byte-for-byte
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExactFileCheck {
    /// Relative to the fixture directory
    pub path: PathBuf,
    /// Complete expected stdout, line terminators included
    pub expected: String,
}

/// `--count` search
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CountCheck {
    /// When absent the count is only reported
    #[serde(default)]
    pub expected: Option<u64>,
}

/// One line of `--count-by-time-bucket` output
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BucketCount {
    pub timestamp: u64,
    pub count: u64,
}

/// `--count-by-time-bucket` search
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TimeBucketCheck {
    pub bucket_ms: u64,
    /// When absent the buckets are only reported
    #[serde(default)]
    pub expected: Option<Vec<BucketCount>>,
}

/// One fixture dataset, one query, and the checks run against them after a
/// single compression
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScenarioGroup {
    /// Fixture directory name under the uncompressed logs directory
    pub name: String,
    pub query: String,
    /// Dataset label passed as `--dataset` to compress and search
    #[serde(default)]
    pub dataset: Option<String>,
    #[serde(default = "default_transforms")]
    pub transforms: Vec<QueryTransform>,
    #[serde(default)]
    pub exact_file: Option<ExactFileCheck>,
    #[serde(default)]
    pub count: Option<CountCheck>,
    #[serde(default)]
    pub time_buckets: Option<TimeBucketCheck>,
}

/// A single check within a group
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scenario {
    ExactFile(ExactFileCheck),
    Search(QueryTransform),
    Count(CountCheck),
    TimeBuckets(TimeBucketCheck),
}

impl Scenario {
    pub fn name(&self) -> String {
        match self {
            Scenario::ExactFile(_) => "exact-file".to_string(),
            Scenario::Search(transform) => format!("search-{}", transform),
            Scenario::Count(_) => "count".to_string(),
            Scenario::TimeBuckets(_) => "time-buckets".to_string(),
        }
    }
}

/// Values fixed for every scenario of a group
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TestCaseParameters {
    pub name: String,
    pub logs_dir: PathBuf,
    pub query: String,
    pub dataset: Option<String>,
}

impl TestCaseParameters {
    /// Oracle label for the untransformed query.
    pub fn oracle_label(&self) -> String {
        oracle_label(&self.name, &self.query)
    }
}

impl ScenarioGroup {
    pub fn parameters(&self, env: &EnvironmentParameters) -> TestCaseParameters {
        TestCaseParameters {
            name: self.name.clone(),
            logs_dir: env.logs_dir(&self.name),
            query: self.query.clone(),
            dataset: self.dataset.clone(),
        }
    }

    /// Checks in execution order: exact file, searches, count, time buckets.
    pub fn scenarios(&self) -> Vec<Scenario> {
        let mut scenarios = Vec::new();
        if let Some(ref check) = self.exact_file {
            scenarios.push(Scenario::ExactFile(check.clone()));
        }
        scenarios.extend(self.transforms.iter().copied().map(Scenario::Search));
        if let Some(ref check) = self.count {
            scenarios.push(Scenario::Count(check.clone()));
        }
        if let Some(ref check) = self.time_buckets {
            scenarios.push(Scenario::TimeBuckets(check.clone()));
        }
        scenarios
    }
}

/// Ordered list of scenario groups
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScenarioTable {
    #[serde(default)]
    pub groups: Vec<ScenarioGroup>,
}

impl ScenarioTable {
    /// Load from a TOML or JSON file (by extension).
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HarnessError::ScenarioFile(format!("{}: {}", path.display(), e)))?;
        let table = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            Self::parse(&content)
        };
        let table: Self = table
            .map_err(|e| HarnessError::ScenarioFile(format!("{}: {}", path.display(), e)))?;
        table
            .validate()
            .map_err(|e| HarnessError::ScenarioFile(format!("{}: {}", path.display(), e)))?;
        Ok(table)
    }

    /// Parse TOML content without validating it.
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// The `hive-24hrs` text-search table.
    pub fn builtin() -> Self {
        Self {
            groups: vec![ScenarioGroup {
                name: "hive-24hrs".to_string(),
                query: "DESERIALIZE_ERRORS".to_string(),
                dataset: None,
                transforms: default_transforms(),
                exact_file: Some(ExactFileCheck {
                    path: PathBuf::from(
                        "logs/i-8fca0980/application_1427088391284_0097/\
                         container_1427088391284_0097_01_000007/syslog",
                    ),
                    expected: HIVE_EXACT_FILE_LINE.to_string(),
                }),
                count: None,
                time_buckets: None,
            }],
        }
    }

    /// Groups are keyed by fixture, query, and dataset label; one fixture
    /// may appear in several groups.
    pub fn validate(&self) -> Result<(), String> {
        let mut keys = HashSet::new();
        for group in &self.groups {
            if group.name.is_empty() {
                return Err("group name must not be empty".to_string());
            }
            if !keys.insert((&group.name, &group.query, &group.dataset)) {
                return Err(format!(
                    "duplicate group '{}' with query {:?}",
                    group.name, group.query
                ));
            }
            if group.query.is_empty() {
                return Err(format!("group '{}': query must not be empty", group.name));
            }
            if let Some(ref check) = group.exact_file {
                if check.path.is_absolute() {
                    return Err(format!(
                        "group '{}': exact_file.path must be relative to the fixture directory",
                        group.name
                    ));
                }
            }
            if let Some(ref check) = group.time_buckets {
                if check.bucket_ms == 0 {
                    return Err(format!(
                        "group '{}': time_buckets.bucket_ms must be positive",
                        group.name
                    ));
                }
            }
        }
        Ok(())
    }

    /// Groups whose names appear in `names`, in table order. Every group of a
    /// selected name is kept. An empty filter selects every group; an unknown
    /// name is an error.
    pub fn select(&self, names: &[String]) -> Result<Vec<ScenarioGroup>, HarnessError> {
        if names.is_empty() {
            return Ok(self.groups.clone());
        }
        if let Some(unknown) = names
            .iter()
            .find(|n| !self.groups.iter().any(|g| &g.name == *n))
        {
            return Err(HarnessError::ScenarioFile(format!(
                "no group named '{}'",
                unknown
            )));
        }
        Ok(self
            .groups
            .iter()
            .filter(|g| names.contains(&g.name))
            .cloned()
            .collect())
    }
}

/// Parse `--count` output: a single unsigned integer.
pub fn parse_count(stdout: &str) -> Option<u64> {
    stdout.trim().parse().ok()
}

static BUCKET_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^timestamp: (\d+) count: (\d+)$").ok());

/// Parse `--count-by-time-bucket` output, one `timestamp: <ms> count: <n>`
/// per line. Blank lines are ignored.
pub fn parse_time_buckets(stdout: &str) -> Result<Vec<BucketCount>, String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let caps = BUCKET_LINE
                .as_ref()
                .and_then(|re| re.captures(line))
                .ok_or_else(|| format!("malformed bucket line {:?}", line))?;
            let timestamp = caps[1]
                .parse()
                .map_err(|e| format!("bad timestamp in {:?}: {}", line, e))?;
            let count = caps[2]
                .parse()
                .map_err(|e| format!("bad count in {:?}: {}", line, e))?;
            Ok(BucketCount { timestamp, count })
        })
        .collect()
}

#[cfg(test)]
#[path = "scenario_tests.rs"]
mod tests;
