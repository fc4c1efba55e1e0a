//! logos-based tokenizer for the textual selector form.
//!
//! Longest match wins, so `/template/` and `:is(` lex as single tokens and
//! never split into punctuation plus an identifier.

use std::ops::Range;

use logos::Logos;

/// Selector token produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    /// `/template/` combinator.
    #[token("/template/")]
    Template,

    /// `:is(` opening a base-type test.
    #[token(":is(")]
    IsOpen,

    /// `)`
    #[token(")")]
    ParenClose,

    /// Type names, class names and control names.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    /// `.`
    #[token(".")]
    Dot,

    /// `#`
    #[token("#")]
    Hash,

    /// `*`
    #[token("*")]
    Star,

    /// `>`
    #[token(">")]
    GreaterThan,
}

/// A token and its byte span in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Range<usize>,
}

/// Input that matched no token.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    /// Number of tokens lexed before the failure.
    pub index: usize,
    pub span: Range<usize>,
}

/// Tokenize a selector string, stopping at the first unrecognized input.
pub fn tokenize(input: &str) -> Result<Vec<Lexeme>, LexError> {
    let mut lexemes = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(token) => lexemes.push(Lexeme { token, span }),
            Err(()) => {
                return Err(LexError {
                    index: lexemes.len(),
                    span,
                })
            }
        }
    }
    Ok(lexemes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|l| l.token).collect()
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            tokens(". # * > )"),
            vec![Token::Dot, Token::Hash, Token::Star, Token::GreaterThan, Token::ParenClose]
        );
    }

    #[test]
    fn compound_tokens_beat_pieces() {
        assert_eq!(
            tokens(":is(Control) /template/ Border"),
            vec![
                Token::IsOpen,
                Token::Ident,
                Token::ParenClose,
                Token::Template,
                Token::Ident,
            ]
        );
    }

    #[test]
    fn idents_keep_underscores_and_dashes() {
        let input = "#PART_ContentPresenter.is-wide";
        let result = tokenize(input).unwrap();
        assert_eq!(result[1].token, Token::Ident);
        assert_eq!(&input[result[1].span.clone()], "PART_ContentPresenter");
        assert_eq!(&input[result[3].span.clone()], "is-wide");
    }

    #[test]
    fn unrecognized_input_stops_the_lexer() {
        let err = tokenize("Border%.x").unwrap_err();
        assert_eq!(err, LexError { index: 1, span: 6..7 });
    }
}
