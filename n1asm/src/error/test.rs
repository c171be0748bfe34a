use std::path::Path;
use std::sync::Arc;

use expect_test::expect;

use super::{render_tabs, Error, ErrorKind};

fn error(src: &str, line: u32) -> Error {
    let src: Arc<str> = Arc::from(src);
    Error::new(Path::new("main.asm"), &src, line, ErrorKind::Syntax, "bad")
}

#[test]
fn tabs_align_to_four() {
    assert_eq!(render_tabs("\tb", 4), "    b");
    assert_eq!(render_tabs("ab\tc", 4), "ab  c");
    assert_eq!(render_tabs("abcd\te", 4), "abcd    e");
    assert_eq!(render_tabs("a\n\tb", 4), "a\n    b");
}

#[test]
fn display_is_one_line() {
    let err = error("nop\n", 0).at(3);
    assert_eq!(err.to_string(), "main.asm:1:4: Syntax Error: bad");
    let err = error("nop\n", 0);
    assert_eq!(err.to_string(), "main.asm:1: Syntax Error: bad");
}

#[test]
fn report_short_file() {
    let report = error("a\n\tb\nc", 1).report();
    let body: Vec<&str> = report
        .lines()
        .filter(|l| {
            l.starts_with(">>>") || l.trim_start().starts_with(|c: char| c.is_ascii_digit())
        })
        .collect();
    expect![[r#"
        [
            "    1    a",
            ">>> 2        b",
            "    3    c",
        ]
    "#]]
    .assert_debug_eq(&body);
    assert!(!report.contains("..."));
    assert!(report.contains("File \"main.asm\" | Line 2"));
    assert!(report.ends_with(&format!("Syntax Error:\n\nbad\n\n{}", "-".repeat(80))));
}

#[test]
fn report_truncates_context() {
    let src: String = (1..=20).map(|i| format!("line{i}\n")).collect();
    let report = error(&src, 10).at(2).report();
    assert!(report.contains("File \"main.asm\" | Line 11 | Column 3"));
    assert!(report.contains("         ...\n\n    5    line5\n"));
    assert!(report.contains(">>> 11   line11\n"));
    assert!(report.contains("    17   line17\n\n         ...\n"));
    assert!(!report.contains("line4\n"));
    assert!(!report.contains("line18\n"));
}
