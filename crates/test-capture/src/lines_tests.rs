// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case("", vec![])]
#[case("a", vec!["a"])]
#[case("a\n", vec!["a"])]
#[case("a\r\nb\n", vec!["a", "b"])]
#[case("a\n\nb", vec!["a", "", "b"])]
fn test_split_lines(#[case] input: &str, #[case] expected: Vec<&str>) {
    assert_eq!(split_lines(input), expected);
}

#[test]
fn test_sorted_lines_orders_bytewise() {
    let input = "b line\nA line\na line\n";
    assert_eq!(sorted_lines(input), vec!["A line", "a line", "b line"]);
}

#[test]
fn test_render_lines_terminates_every_line() {
    assert_eq!(render_lines(&["x", "y"]), "x\ny\n");
    assert_eq!(render_lines::<&str>(&[]), "");
}

#[test]
fn test_normalize_ignores_missing_final_newline() {
    assert_eq!(normalize("b\na"), normalize("a\nb\n"));
}

#[test]
fn test_normalize_keeps_duplicates() {
    assert_eq!(normalize("x\ny\nx\n"), "x\nx\ny\n");
}

proptest! {
    #[test]
    fn normalize_is_idempotent(lines in proptest::collection::vec("[a-zA-Z0-9 :,]{0,12}", 0..20)) {
        let text = lines.join("\n");
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once.clone());
    }

    #[test]
    fn normalize_is_order_insensitive(mut lines in proptest::collection::vec("[a-z]{1,8}", 0..20)) {
        let forward = render_lines(&lines);
        lines.reverse();
        let backward = render_lines(&lines);
        prop_assert_eq!(normalize(&forward), normalize(&backward));
    }
}
