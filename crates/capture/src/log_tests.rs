// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use rstest::rstest;
use std::thread;
use std::time::Duration;

fn make_command(program: &str) -> CapturedCommand {
    CapturedCommand {
        program: program.to_string(),
        args: vec!["--raw".to_string()],
        cwd: None,
    }
}

fn exited(code: i32) -> CapturedOutcome {
    CapturedOutcome::Exited {
        code: Some(code),
        duration: Duration::from_millis(1),
    }
}

#[test]
fn test_record_and_retrieve() {
    let log = InvocationLog::new();

    log.record(make_command("/sbin/start-clp.sh"), exited(0));

    assert_eq!(log.len(), 1);
    let invocations = log.invocations();
    assert_eq!(invocations[0].seq, 0);
    assert_eq!(invocations[0].command.program, "/sbin/start-clp.sh");
}

#[rstest]
#[case(1, 1)]
#[case(5, 2)]
#[case(10, 5)]
#[case(3, 10)]
fn test_last_n(#[case] total: usize, #[case] n: usize) {
    let log = InvocationLog::new();

    for i in 0..total {
        log.record(make_command(&format!("cmd-{}", i)), exited(0));
    }

    let last = log.last(n);
    let expected_len = n.min(total);
    assert_eq!(last.len(), expected_len);

    let start = total.saturating_sub(n);
    for (i, invocation) in last.iter().enumerate() {
        assert_eq!(invocation.command.program, format!("cmd-{}", start + i));
    }
}

#[test]
fn test_count_and_failures() {
    let log = InvocationLog::new();

    log.record(make_command("search.sh"), exited(0));
    log.record(make_command("diff"), exited(1));
    log.record(
        make_command("grep"),
        CapturedOutcome::TimedOut { timeout_ms: 100 },
    );
    log.record(
        make_command("missing"),
        CapturedOutcome::SpawnFailed {
            message: "No such file or directory".to_string(),
        },
    );

    assert_eq!(log.count(|i| i.outcome.is_success()), 1);
    assert_eq!(log.find_failures().len(), 3);
}

#[test]
fn test_find_by_program() {
    let log = InvocationLog::new();

    log.record(make_command("/pkg/sbin/search.sh"), exited(0));
    log.record(make_command("/pkg/sbin/compress.sh"), exited(0));
    log.record(make_command("/pkg/sbin/search.sh"), exited(0));

    assert_eq!(log.find_by_program("search.sh").len(), 2);
    assert!(log.find_by_program("stop-clp.sh").is_empty());
}

#[test]
fn test_clear() {
    let log = InvocationLog::new();

    log.record(make_command("start-clp.sh"), exited(0));

    assert!(!log.is_empty());
    log.clear();
    assert!(log.is_empty());
}

#[test]
fn test_clone_shares_state() {
    let log1 = InvocationLog::new();
    let log2 = log1.clone();

    log1.record(make_command("a"), exited(0));
    assert_eq!(log2.len(), 1);

    log2.record(make_command("b"), exited(0));
    assert_eq!(log1.len(), 2);
}

#[test]
fn test_concurrent_records_get_unique_seq() {
    let log = InvocationLog::new();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let log = log.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    log.record(make_command(&format!("t{}-{}", t, i)), exited(0));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut seqs: Vec<u64> = log.invocations().iter().map(|i| i.seq).collect();
    seqs.sort_unstable();
    assert_eq!(seqs, (0..100).collect::<Vec<u64>>());
}

#[test]
fn test_file_capture_appends_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invocations.jsonl");

    {
        let log = InvocationLog::with_file(&path).unwrap();
        log.record(make_command("start-clp.sh"), exited(0));
    }
    {
        let log = InvocationLog::with_file(&path).unwrap();
        log.record(make_command("stop-clp.sh"), exited(0));
    }

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let second: CapturedInvocation = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second.command.program, "stop-clp.sh");
}

#[test]
fn test_record_launched_keeps_launch_time() {
    let log = InvocationLog::new();
    let launched = Instant::now();
    thread::sleep(Duration::from_millis(50));

    log.record_launched(launched, make_command("compress.sh"), exited(0));

    let invocation = &log.invocations()[0];
    let since_launch = SystemTime::now()
        .duration_since(invocation.timestamp)
        .unwrap();
    assert!(since_launch >= Duration::from_millis(50), "{since_launch:?}");
    assert!(invocation.elapsed < Duration::from_millis(50));
}
