// src/ssn/parser.rs

//! Parser for the `synchronous_standby_names` grammar.

use super::lexer::{Token, TokenKind, tokenize};
use super::value::{SsnValue, SyncType};
use crate::ci::CiSet;
use crate::error::SsnParseError;

/// Parses a `synchronous_standby_names` GUC value.
///
/// An empty token stream parses to [`SsnValue::empty`]. Everything else
/// follows the grammar's shape-matching rules: `ANY n(...)` is quorum mode,
/// `FIRST n(...)` or a bare `n(...)` is priority mode with that count, and
/// anything else is priority mode with an implicit count of 1 over the
/// whole token stream.
pub fn parse(value: &str) -> Result<SsnValue, SsnParseError> {
    let tokens = tokenize(value);
    if tokens.is_empty() {
        return Ok(SsnValue::empty());
    }

    let (sync_type, num, list) = classify(&tokens);
    let members = parse_list(list)?;

    Ok(SsnValue {
        sync_type,
        has_star: members.contains("*"),
        num,
        members,
    })
}

/// Matches the leading/trailing shape of the token stream to decide the
/// sync type, requested count, and the slice of tokens making up the list.
fn classify(tokens: &[Token]) -> (SyncType, u32, &[Token]) {
    let kinds_head = |n: usize| -> Vec<TokenKind> { tokens.iter().take(n).map(|t| t.kind).collect() };
    let last_is_rparen = tokens.last().map(|t| t.kind) == Some(TokenKind::RParen);

    if tokens.len() >= 4
        && kinds_head(3) == [TokenKind::Any, TokenKind::Num, TokenKind::LParen]
        && last_is_rparen
    {
        let num = parse_num(&tokens[1].lexeme);
        return (SyncType::Quorum, num, &tokens[3..tokens.len() - 1]);
    }

    if tokens.len() >= 4
        && kinds_head(3) == [TokenKind::First, TokenKind::Num, TokenKind::LParen]
        && last_is_rparen
    {
        let num = parse_num(&tokens[1].lexeme);
        return (SyncType::Priority, num, &tokens[3..tokens.len() - 1]);
    }

    if tokens.len() >= 3
        && kinds_head(2) == [TokenKind::Num, TokenKind::LParen]
        && last_is_rparen
    {
        let num = parse_num(&tokens[0].lexeme);
        return (SyncType::Priority, num, &tokens[2..tokens.len() - 1]);
    }

    (SyncType::Priority, 1, tokens)
}

fn parse_num(lexeme: &str) -> u32 {
    lexeme.parse().unwrap_or(0)
}

/// Parses a comma-separated name list. Even positions must be names, odd
/// positions must be commas, and the list may not end on a comma.
///
/// NOTE: `FIRST` and `ANY` are accepted unquoted as ordinary member names
/// here (e.g. `"first,any"` parses to `{first, any}`), matching the
/// original implementation. It is unclear whether PostgreSQL's own GUC
/// parser accepts the same thing; this behavior is preserved deliberately
/// rather than special-cased away.
fn parse_list(list: &[Token]) -> Result<CiSet, SsnParseError> {
    let mut members = CiSet::new();

    for (i, token) in list.iter().enumerate() {
        if i % 2 == 1 {
            if i + 1 == list.len() {
                return Err(SsnParseError::TrailingComma {
                    offset: token.offset,
                });
            }
            if token.kind != TokenKind::Comma {
                return Err(SsnParseError::ExpectedComma {
                    kind: token.kind.name(),
                    lexeme: token.lexeme.clone(),
                    offset: token.offset,
                });
            }
            continue;
        }

        match token.kind {
            TokenKind::Ident | TokenKind::First | TokenKind::Any => {
                members.insert(token.lexeme.clone());
            }
            TokenKind::Star => {
                members.insert("*".to_string());
            }
            TokenKind::DQuot => {
                members.insert(unquote(&token.lexeme));
            }
            _ => {
                return Err(SsnParseError::UnexpectedToken {
                    kind: token.kind.name(),
                    lexeme: token.lexeme.clone(),
                    offset: token.offset,
                });
            }
        }
    }

    Ok(members)
}

/// Strips the outer quotes from a `DQUOT` lexeme and collapses `""` escapes
/// to a single `"`.
fn unquote(lexeme: &str) -> String {
    let inner = &lexeme[1..lexeme.len() - 1];
    inner.replace("\"\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_parses_to_empty_value() {
        let v = parse("").unwrap();
        assert_eq!(v, SsnValue::empty());
    }

    #[test]
    fn first_is_case_insensitive_keyword_and_also_a_member() {
        let v = parse("FiRsT").unwrap();
        assert_eq!(v.sync_type, SyncType::Priority);
        assert!(v.members.contains("first"));
        assert_eq!(v.num, 1);
    }

    #[test]
    fn quoted_numeric_name() {
        let v = parse("\"1\"").unwrap();
        assert!(v.members.contains("1"));
        assert_eq!(v.members.len(), 1);
    }

    #[test]
    fn whitespace_and_commas() {
        let v = parse(" a , b ").unwrap();
        assert!(v.members.contains("a"));
        assert!(v.members.contains("b"));
        assert_eq!(v.num, 1);
    }

    #[test]
    fn any_quorum_with_star() {
        let v = parse("ANY 4(\"a\",*,b)").unwrap();
        assert!(v.has_star);
        assert_eq!(v.num, 4);
        assert_eq!(v.sync_type, SyncType::Quorum);
    }

    #[test]
    fn bare_number_without_parens_is_an_error() {
        assert!(parse("1").is_err());
    }

    #[test]
    fn trailing_comma_is_an_error() {
        assert!(parse("a,").is_err());
    }

    #[test]
    fn missing_comma_between_names_is_an_error() {
        assert!(parse("ANY 4(\"a\" b,\"c c\")").is_err());
    }

    #[test]
    fn trailing_comma_inside_parens_is_an_error() {
        assert!(parse("FIRST 4(\"a\",)").is_err());
    }

    #[test]
    fn empty_list_with_comma_is_an_error() {
        assert!(parse("2 (,)").is_err());
    }

    #[test]
    fn unquoted_first_and_any_as_member_names_is_preserved_behavior() {
        let v = parse("first,any").unwrap();
        assert!(v.members.contains("first"));
        assert!(v.members.contains("any"));
        assert_eq!(v.num, 1);
    }

    #[test]
    fn duplicate_names_are_coalesced() {
        let v = parse("a,A,a").unwrap();
        assert_eq!(v.members.len(), 1);
    }
}
