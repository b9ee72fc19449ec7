// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Shared helpers: a fake CLP package made of shell control scripts.
//!
//! `compress.sh` records its input directory; `search.sh` greps the recorded
//! directories case-sensitively (or with `-i` for `--ignore-case`). Start and
//! stop append to an events file that lives outside the package, so it
//! survives purges.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use clp_harness::env::EnvironmentParameters;
use tempfile::TempDir;

/// Line the exact-file scenario expects from the hive fixture.
pub const HIVE_LINE: &str = "2015-03-23 11:54:22,594 INFO [main] org.apache.hadoop.hive.ql.exec.MapOperator: DESERIALIZE_ERRORS:0";

/// Fixture file searched by the exact-file scenario, relative to the dataset.
pub const HIVE_SYSLOG: &str =
    "logs/i-8fca0980/application_1427088391284_0097/container_1427088391284_0097_01_000007/syslog";

pub struct FakePackage {
    pub root: TempDir,
}

impl FakePackage {
    /// A package whose scripts all succeed.
    pub fn new() -> Self {
        let pkg = Self {
            root: tempfile::tempdir().unwrap(),
        };
        std::fs::create_dir_all(pkg.sbin_dir()).unwrap();
        std::fs::create_dir_all(pkg.logs_dir()).unwrap();

        let data = pkg.package_dir().join("var/data");
        let log = pkg.package_dir().join("var/log");
        let events = pkg.events_path();
        let inputs = data.join("inputs");

        pkg.set_script(
            "start-clp.sh",
            &format!(
                "echo start >> '{}'\nmkdir -p '{}' '{}'",
                events.display(),
                data.display(),
                log.display()
            ),
        );
        pkg.set_script(
            "stop-clp.sh",
            &format!("echo stop >> '{}'", events.display()),
        );
        pkg.set_script(
            "compress.sh",
            &format!(
                r#"while [ $# -gt 1 ]; do shift; done
mkdir -p '{data}'
echo "$1" >> '{inputs}'
echo "compressed $1""#,
                data = data.display(),
                inputs = inputs.display()
            ),
        );
        pkg.set_script(
            "search.sh",
            &format!(
                r#"ignore=""
file=""
mode=lines
while [ $# -gt 1 ]; do
  case "$1" in
    --ignore-case) ignore="-i" ;;
    --dataset) shift ;;
    --file-path) shift; file="$1" ;;
    --count) mode=count ;;
    --count-by-time-bucket) shift; mode=buckets ;;
  esac
  shift
done
query="$1"
[ -f '{inputs}' ] || exit 0
matches() {{
  if [ -n "$file" ]; then
    grep -h $ignore -F -e "$query" "$file"
  else
    while read -r dir; do grep -r -h $ignore -F -e "$query" "$dir"; done < '{inputs}'
  fi
  return 0
}}
case "$mode" in
  lines) matches ;;
  count) matches | wc -l | tr -d ' ' ;;
  buckets) echo "timestamp: 0 count: $(matches | wc -l | tr -d ' ')" ;;
esac
exit 0"#,
                inputs = inputs.display()
            ),
        );
        pkg
    }

    /// Replace a control script's body.
    pub fn set_script(&self, name: &str, body: &str) {
        let path = self.sbin_dir().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    pub fn package_dir(&self) -> PathBuf {
        self.root.path().join("clp")
    }

    pub fn sbin_dir(&self) -> PathBuf {
        self.root.path().join("clp/sbin")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.path().join("logs")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("out")
    }

    pub fn events_path(&self) -> PathBuf {
        self.root.path().join("events.log")
    }

    /// Start/stop calls so far, in order.
    pub fn events(&self) -> Vec<String> {
        std::fs::read_to_string(self.events_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn env(&self) -> EnvironmentParameters {
        EnvironmentParameters {
            bins_dir: self.package_dir().join("bin"),
            package_dir: self.package_dir(),
            package_sbin_dir: self.sbin_dir(),
            test_output_dir: self.output_dir(),
            uncompressed_logs_dir: self.logs_dir(),
        }
    }

    /// Required variables for driving the binary.
    pub fn env_vars(&self) -> Vec<(&'static str, PathBuf)> {
        let env = self.env();
        env.entries()
            .iter()
            .map(|(name, value)| (*name, value.to_path_buf()))
            .collect()
    }

    pub fn write_fixture(&self, dataset: &str, rel: &str, content: &str) {
        let path = self.logs_dir().join(dataset).join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// The hive-24hrs dataset: one matching line in the exact-file target,
    /// more matches elsewhere, and lines that never match.
    pub fn with_hive_fixture(self) -> Self {
        self.write_fixture(
            "hive-24hrs",
            HIVE_SYSLOG,
            &format!(
                "2015-03-23 11:54:21,100 INFO [main] org.apache.hadoop.mapred.MapTask: starting\n\
                 {}\n\
                 2015-03-23 11:54:23,001 INFO [main] org.apache.hadoop.mapred.Task: done\n",
                HIVE_LINE
            ),
        );
        self.write_fixture(
            "hive-24hrs",
            "logs/i-0b2c1d3e/application_1427088391284_0101/container_01/syslog",
            "2015-03-23 12:01:00,000 INFO [main] org.apache.hadoop.hive.ql.exec.MapOperator: DESERIALIZE_ERRORS:3\n\
             2015-03-23 12:01:00,500 INFO [main] org.apache.hadoop.hive.ql.exec.MapOperator: RECORDS_IN:12\n\
             2015-03-23 11:59:59,999 WARN [main] org.apache.hadoop.hive.ql.exec.MapOperator: DESERIALIZE_ERRORS:1\n",
        );
        self
    }

    pub fn exists(&self, rel: &str) -> bool {
        Path::new(&self.package_dir()).join(rel).exists()
    }
}
