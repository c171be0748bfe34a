use super::Module;
use crate::token::{self, TokenType};

#[test]
fn tokenize_then_parse() {
    let mut module = Module::new("main.asm", "const limit, 0b1000_0000\n\ncode\n  mvi a, limit ; go\n");
    module.tokenize().unwrap();
    assert_eq!(module.lines.len(), 4);
    assert_eq!(module.abstract_lines.len(), 3);
    assert!(module.constants.is_empty());

    module.parse().unwrap();
    let limit = module.constants[0];
    assert_eq!(module.text(&limit.name), "limit");
    assert_eq!(module.number(&limit.value), Some(128));
    assert_eq!(module.instructions.len(), 1);
    assert_eq!(module.source_line(3), Some("  mvi a, limit ; go"));
    assert!(token::contains(module.line_tokens(3), TokenType::Comment));
    assert!(module.line_tokens(9).is_empty());
}

#[test]
fn number_of_non_literal() {
    let module = Module::build("main.asm", "export main").unwrap();
    assert_eq!(module.number(&module.exports[0].name), None);
}

#[test]
fn oversized_literal() {
    let module = Module::build("main.asm", "const big, 0x1_0000_0000").unwrap();
    assert_eq!(module.number(&module.constants[0].value), None);
}

#[test]
fn shipped_builtins_parse() {
    let src = include_str!("../../../stdlib/builtins.asmn1");
    let module = Module::build("builtins.asmn1", src).unwrap_or_else(|e| panic!("{}", e.report()));
    assert!(module.includes.is_empty());
    assert!(module.instructions.is_empty());
    let macros: Vec<&str> = module.macros.iter().map(|m| module.text(&m.name)).collect();
    assert_eq!(macros, ["exit", "clear", "inc", "dec"]);
}
