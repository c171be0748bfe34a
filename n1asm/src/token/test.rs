use test_strategy::proptest;

use super::{contains, split, types, without, Token, TokenType};

const KINDS: [TokenType; 4] = [
    TokenType::Name,
    TokenType::Comma,
    TokenType::Space,
    TokenType::Newline,
];

fn seq(kinds: &[TokenType]) -> Vec<Token> {
    kinds
        .iter()
        .enumerate()
        .map(|(i, &kind)| Token::new(kind, 0, i as u32))
        .collect()
}

fn shape(groups: &[Vec<Token>]) -> Vec<Vec<TokenType>> {
    groups.iter().map(|g| types(g)).collect()
}

#[test]
fn split_on_commas() {
    use TokenType::*;
    let tokens = seq(&[Name, Comma, Space, Decimal, Comma, Register]);
    assert_eq!(
        shape(&split(&tokens, Comma)),
        vec![vec![Name], vec![Space, Decimal], vec![Register]]
    );
}

#[test]
fn split_without_separator() {
    use TokenType::*;
    let tokens = seq(&[Name, Space, Name]);
    assert_eq!(shape(&split(&tokens, Comma)), vec![vec![Name, Space, Name]]);
    assert_eq!(shape(&split(&[], Comma)), vec![Vec::<TokenType>::new()]);
}

#[test]
fn split_drops_only_trailing_empty() {
    use TokenType::*;
    let tokens = seq(&[Comma, Name, Comma, Comma]);
    assert_eq!(
        shape(&split(&tokens, Comma)),
        vec![vec![], vec![Name], vec![]]
    );
}

#[test]
fn filter_and_contains() {
    use TokenType::*;
    let tokens = seq(&[Name, Space, Register, Comma, Space, Decimal]);
    assert!(contains(&tokens, Register));
    assert!(!contains(&tokens, Colon));
    let stripped = without(&without(&tokens, Space), Comma);
    assert_eq!(types(&stripped), vec![Name, Register, Decimal]);
    // positions survive filtering
    assert_eq!(stripped[1].column, 2);
}

#[test]
fn keywords_are_case_insensitive() {
    assert_eq!(TokenType::keyword("CoNsT"), Some(TokenType::Constant));
    assert_eq!(TokenType::keyword("res"), Some(TokenType::Resource));
    assert_eq!(TokenType::keyword("constant"), None);
}

#[proptest]
fn split_then_join_restores_input(
    #[strategy(proptest::collection::vec(0..4usize, 0..48))] picks: Vec<usize>,
) {
    let kinds: Vec<_> = picks.iter().map(|&i| KINDS[i]).collect();
    let tokens = seq(&kinds);
    for separator in KINDS {
        let groups = split(&tokens, separator);
        let mut joined = Vec::new();
        for (i, group) in groups.iter().enumerate() {
            joined.extend(group.iter().map(|t| t.kind));
            if i + 1 < groups.len() {
                joined.push(separator);
            }
        }
        if kinds.last() == Some(&separator) {
            joined.push(separator);
        }
        assert_eq!(joined, kinds);
    }
}
