use std::path::Path;
use std::sync::Arc;

use expect_test::{expect, Expect};
use string_interner::{DefaultBackend, StringInterner};
use test_strategy::proptest;

use super::LexOutput;
use crate::error::{Error, ErrorKind};
use crate::token::{self, Token, TokenType};

fn lex(src: &str) -> (Result<LexOutput, Error>, StringInterner<DefaultBackend>) {
    let mut si = StringInterner::default();
    let src: Arc<str> = Arc::from(src);
    let out = LexOutput::lex_all(Path::new("test.asm"), &src, &mut si);
    (out, si)
}

fn render(token: &Token, si: &StringInterner<DefaultBackend>) -> String {
    let value = token
        .value
        .and_then(|v| si.resolve(v))
        .map(|v| format!(" {v:?}"))
        .unwrap_or_default();
    format!("{}:{} {}{value}\n", token.line, token.column, token.kind)
}

fn check(src: &str, expect: Expect) {
    let (out, si) = lex(src);
    let out = out.unwrap_or_else(|e| panic!("{e}"));
    let rendered: String = out.tokens.iter().map(|t| render(t, &si)).collect();
    expect.assert_eq(&rendered);
}

fn check_abstract(src: &str, expect: Expect) {
    let (out, _) = lex(src);
    let out = out.unwrap_or_else(|e| panic!("{e}"));
    let rendered: String = out
        .abstract_lines
        .iter()
        .map(|line| {
            let kinds: Vec<_> = line.iter().map(|t| t.kind.name()).collect();
            format!("{}: {}\n", line[0].line, kinds.join(" "))
        })
        .collect();
    expect.assert_eq(&rendered);
}

fn check_err(src: &str, column: u32, message: &str) {
    let (out, _) = lex(src);
    let err = out.expect_err("source should not tokenize");
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.column, Some(column), "{err}");
    assert!(err.message.contains(message), "{err}");
}

#[test]
fn empty() {
    check("", expect![[""]]);
    let (out, _) = lex("");
    let out = out.unwrap();
    assert!(out.lines.is_empty());
    assert!(out.abstract_lines.is_empty());
}

#[test]
fn instruction_with_comment() {
    check(
        "mvi a, 0x1F ; load",
        expect![[r#"
            0:0 NAME "mvi"
            0:3 SPACE
            0:4 REGISTER "a"
            0:5 COMMA
            0:6 SPACE
            0:7 HEXADECIMAL "1F"
            0:11 SPACE
            0:12 COMMENT " load"
            0:18 NEWLINE
        "#]],
    );
}

#[test]
fn definitions() {
    check(
        "CONST Foo, 0b1010_0101\nvar buf, 16\nres msg, \"hi there\"\n",
        expect![[r#"
            0:0 CONSTANT "CONST"
            0:5 SPACE
            0:6 NAME "Foo"
            0:9 COMMA
            0:10 SPACE
            0:11 BINARY "10100101"
            0:22 NEWLINE
            1:0 VARIABLE "var"
            1:3 SPACE
            1:4 NAME "buf"
            1:7 COMMA
            1:8 SPACE
            1:9 DECIMAL "16"
            1:11 NEWLINE
            2:0 RESOURCE "res"
            2:3 SPACE
            2:4 NAME "msg"
            2:7 COMMA
            2:8 SPACE
            2:10 STRING "hi there"
            2:19 NEWLINE
        "#]],
    );
}

#[test]
fn macro_arguments() {
    check(
        "@macro add2: %r0, %i1",
        expect![[r#"
            0:0 AT
            0:1 NAME "macro"
            0:6 SPACE
            0:7 NAME "add2"
            0:11 COLON
            0:12 SPACE
            0:13 ARGUMENT "r0"
            0:16 COMMA
            0:17 SPACE
            0:18 ARGUMENT "i1"
            0:21 NEWLINE
        "#]],
    );
}

#[test]
fn blank_runs_coalesce() {
    check(
        " \t  nop\t \t;x",
        expect![[r#"
            0:0 SPACE
            0:4 NAME "nop"
            0:7 SPACE
            0:10 COMMENT "x"
            0:12 NEWLINE
        "#]],
    );
}

#[test]
fn registers_and_names() {
    check(
        "A ab x .l z",
        expect![[r#"
            0:0 REGISTER "A"
            0:1 SPACE
            0:2 NAME "ab"
            0:4 SPACE
            0:5 NAME "x"
            0:6 SPACE
            0:7 NAME ".l"
            0:9 SPACE
            0:10 REGISTER "z"
            0:11 NEWLINE
        "#]],
    );
}

#[test]
fn single_quotes_and_punctuation() {
    check(
        "'say hi' $*",
        expect![[r#"
            0:1 STRING "say hi"
            0:8 SPACE
            0:9 DOLLAR
            0:10 ASTERISK
            0:11 NEWLINE
        "#]],
    );
}

#[test]
fn either_quote_closes_a_string() {
    check(
        "res s, 'abc\"",
        expect![[r#"
            0:0 RESOURCE "res"
            0:3 SPACE
            0:4 NAME "s"
            0:5 COMMA
            0:6 SPACE
            0:8 STRING "abc"
            0:12 NEWLINE
        "#]],
    );
}

#[test]
fn octal_and_decimal_separators() {
    check(
        "0o17,1_000",
        expect![[r#"
            0:0 OCTAL "17"
            0:4 COMMA
            0:5 DECIMAL "1000"
            0:10 NEWLINE
        "#]],
    );
}

#[test]
fn abstract_lines() {
    check_abstract(
        "; header\n\n  include std/io\\fmt  \n\ncode\n\tnop ; done\n",
        expect![[r#"
            2: INCLUDE SPACE NAME SLASH NAME SLASH NAME
            4: CODE
            5: NAME
        "#]],
    );
}

#[test]
fn raw_lines_keep_every_physical_line() {
    let (out, _) = lex("nop\n\n; only a comment\n");
    let out = out.unwrap();
    assert_eq!(out.lines.len(), 3);
    assert_eq!(token::types(&out.lines[1]), Vec::<TokenType>::new());
    assert_eq!(token::types(&out.lines[2]), vec![TokenType::Comment]);
    assert_eq!(out.abstract_lines.len(), 1);
}

#[test]
fn unclosed_string() {
    check_err("res s, \"abc", 7, "string not closed");
    check_err("'abc", 0, "string not closed");
}

#[test]
fn empty_literal() {
    check_err("0x", 0, "no digits");
    check_err("mvi a, 0b", 7, "no digits");
}

#[test]
fn misplaced_radix() {
    check_err("12x", 2, "radix prefix");
    check_err("00b1", 2, "radix prefix");
}

#[test]
fn digit_outside_radix() {
    check_err("0b102", 4, "invalid digit '2'");
    check_err("0o19", 3, "invalid digit '9'");
    check_err("12a", 2, "invalid digit 'a'");
}

#[test]
fn bad_arguments() {
    check_err("%q1", 1, "argument class");
    check_err("%rr", 2, "argument index");
    check_err("%r", 2, "argument index");
}

#[test]
fn illegal_character() {
    check_err("mvi a, #1", 7, "invalid character '#'");
    check_err("nop!", 3, "invalid character '!'");
}

#[test]
fn argument_closes_after_two_chars() {
    check(
        "%a12",
        expect![[r#"
            0:0 ARGUMENT "a1"
            0:3 DECIMAL "2"
            0:4 NEWLINE
        "#]],
    );
}

#[proptest]
fn tokenizing_is_idempotent(#[strategy("[a-z0-9 ,:;%@\t\"]{0,40}")] src: String) {
    let (first, _) = lex(&src);
    let (second, _) = lex(&src);
    match (first, second) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
        (a, b) => panic!("diverging results: {a:?} / {b:?}"),
    }
}

#[proptest]
fn one_space_per_blank_run(
    #[strategy(proptest::collection::vec(("[a-z]{1,5}", "[ \t]{1,6}"), 1..8))] parts: Vec<(
        String,
        String,
    )>,
) {
    let mut src = String::new();
    let mut starts = Vec::new();
    for (word, blanks) in &parts {
        src.push_str(word);
        starts.push(src.len() as u32);
        src.push_str(blanks);
    }
    let (out, _) = lex(&src);
    let out = out.unwrap();
    let spaces: Vec<u32> = out
        .tokens
        .iter()
        .filter(|t| t.is(TokenType::Space))
        .map(|t| t.column)
        .collect();
    assert_eq!(spaces, starts);
}

#[proptest]
fn numeric_literals_round_trip(value: u32, #[strategy(0..4usize)] radix: usize) {
    let (src, kind) = match radix {
        0 => (format!("{value}"), TokenType::Decimal),
        1 => (format!("0x{value:X}"), TokenType::Hexadecimal),
        2 => (format!("0o{value:o}"), TokenType::Octal),
        _ => (format!("0b{value:b}"), TokenType::Binary),
    };
    let (out, si) = lex(&src);
    let out = out.unwrap();
    let literal = out.tokens[0];
    assert_eq!(literal.kind, kind);
    let digits = literal.value.and_then(|v| si.resolve(v)).unwrap();
    assert_eq!(token::number(kind, digits), Some(value));
}
