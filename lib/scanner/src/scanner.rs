use cursor::{Cursor, Line};
use errors::{ErrorKind, LoxError, LoxErrors};

pub mod token;
pub use token::{Keyword, Literal, Token, TokenData};
use TokenData::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Unexpected character.")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
    #[error("Invalid number literal.")]
    InvalidNumber(String),
}

impl ScanError {
    fn at(self, line: Line) -> LoxError {
        LoxError::new(ErrorKind::Scan, line, self)
    }
}

/// Scans `source` into tokens, collecting diagnostics for anything it has to skip.
pub fn scan(source: &str) -> (Vec<Token<'_>>, LoxErrors) {
    Scanner::new(source).scan_tokens()
}

#[derive(Debug)]
pub struct Scanner<'a> {
    start: Cursor<'a>,
    current: Cursor<'a>,
    tokens: Vec<Token<'a>>,
    errors: LoxErrors,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        let cursor = Cursor::new(source);
        Self { start: cursor.clone(), current: cursor, tokens: Vec::new(), errors: LoxErrors::default() }
    }

    /// Runs to the end of the source. The token list always ends with [`TokenData::Eof`].
    pub fn scan_tokens(mut self) -> (Vec<Token<'a>>, LoxErrors) {
        while let Some(c) = self.advance() {
            self.scan_token(c);
        }
        self.tokens.push(Token::eof(self.current.line()));

        log::debug!("Scanned {} tokens, {} errors", self.tokens.len(), self.errors.len());
        (self.tokens, self.errors)
    }

    fn scan_token(&mut self, c: char) {
        match c {
            '(' => self.add_token(LeftParen),
            ')' => self.add_token(RightParen),
            '{' => self.add_token(LeftBrace),
            '}' => self.add_token(RightBrace),
            ',' => self.add_token(Comma),
            '.' => self.add_token(Dot),
            '-' => self.add_token(Minus),
            '+' => self.add_token(Plus),
            ';' => self.add_token(Semicolon),
            '*' => self.add_token(Star),

            '!' => self.add_token_if_matches('=', BangEqual, Bang),
            '=' => self.add_token_if_matches('=', EqualEqual, Equal),
            '<' => self.add_token_if_matches('=', LessEqual, Less),
            '>' => self.add_token_if_matches('=', GreaterEqual, Greater),

            '/' => {
                if self.current.advance_if('/') {
                    // Comment
                    self.current.advance_while(|c| c != '\n');
                } else {
                    self.add_token(Slash)
                }
            }

            '"' => self.string(),

            d if d.is_ascii_digit() => self.number(),

            a if is_alpha(a) => self.identifier(),

            // '\n' is counted by the cursor
            ' ' | '\r' | '\t' | '\n' => (),

            c => self.error(ScanError::UnexpectedCharacter(c)),
        }
    }

    fn advance(&mut self) -> Option<char> {
        self.start = self.current.clone();
        self.current.next()
    }

    fn lexeme(&self) -> &'a str {
        self.start.slice_until(&self.current)
    }

    fn add_token(&mut self, data: TokenData<'a>) {
        let token = Token::new(data, self.lexeme(), self.current.line());
        log::trace!("{}", token.describe());
        self.tokens.push(token);
    }

    fn add_token_if_matches(&mut self, expected: char, matched: TokenData<'a>, otherwise: TokenData<'a>) {
        if self.current.advance_if(expected) {
            self.add_token(matched)
        } else {
            self.add_token(otherwise)
        }
    }

    fn error(&mut self, error: ScanError) {
        log::debug!("Skipping {:?} at {:?}", error, self.current);
        self.errors.push(error.at(self.current.line()));
    }

    fn string(&mut self) {
        self.current.advance_while(|c| c != '"');

        if !self.current.advance_if('"') {
            self.error(ScanError::UnterminatedString);
            return;
        }

        let lexeme = self.lexeme();
        self.add_token(Str(&lexeme[1..lexeme.len() - 1]));
    }

    fn number(&mut self) {
        self.current.advance_while(|c| c.is_ascii_digit());

        // A '.' only belongs to the number if a digit follows it
        if self.current.peek() == Some('.') && self.current.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.current.next();
            self.current.advance_while(|c| c.is_ascii_digit());
        }

        // Every `digits(.digits)?` lexeme parses, out of range values become infinity
        match self.lexeme().parse::<f64>() {
            Ok(n) => self.add_token(Number(n)),
            Err(_) => self.error(ScanError::InvalidNumber(self.lexeme().to_string())),
        }
    }

    fn identifier(&mut self) {
        self.current.advance_while(is_alphanumeric);

        let data = match self.lexeme().parse::<Keyword>() {
            Ok(keyword) => keyword.into(),
            Err(_) => Identifier,
        };
        self.add_token(data);
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    use super::*;

    fn token(data: TokenData<'static>, lexeme: &'static str, line: usize) -> Token<'static> {
        Token::new(data, lexeme, Line(line))
    }

    fn eof(line: usize) -> Token<'static> {
        Token::eof(Line(line))
    }

    fn scan_ok(source: &str) -> Vec<Token<'_>> {
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty(), "Unexpected scan errors: {errors}");
        tokens
    }

    fn kinds(source: &str) -> Vec<TokenData<'_>> {
        scan_ok(source).into_iter().map(|t| t.data).collect_vec()
    }

    #[test]
    fn string_literals() {
        assert_eq!(
            scan_ok("\"hello world\""),
            vec![token(Str("hello world"), "\"hello world\"", 1), eof(1)]
        );

        assert_eq!(scan_ok("\"\""), vec![token(Str(""), "\"\"", 1), eof(1)]);

        // Newlines inside a string are counted, the token sits on the closing line
        assert_eq!(
            scan_ok("\"a\nb\" 1"),
            vec![token(Str("a\nb"), "\"a\nb\"", 2), token(Number(1.0), "1", 2), eof(2)]
        );
    }

    #[test]
    fn unterminated_string() {
        let (tokens, errors) = scan("\"hello world");
        assert_eq!(tokens, vec![eof(1)]);
        assert_eq!(*errors, vec![ScanError::UnterminatedString.at(Line(1))]);

        let (tokens, errors) = scan("1 \"hello\nworld\n");
        assert_eq!(tokens, vec![token(Number(1.0), "1", 1), eof(3)]);
        assert_eq!(errors.to_string(), "[line 3] Error: Unterminated string.");
    }

    #[test]
    fn two_char_tokens() {
        assert_eq!(
            scan_ok("! != = == < <= > >="),
            vec![
                token(Bang, "!", 1),
                token(BangEqual, "!=", 1),
                token(Equal, "=", 1),
                token(EqualEqual, "==", 1),
                token(Less, "<", 1),
                token(LessEqual, "<=", 1),
                token(Greater, ">", 1),
                token(GreaterEqual, ">=", 1),
                eof(1),
            ]
        );

        // Greedy: never `!` followed by `=`
        assert_eq!(kinds("!==="), vec![BangEqual, EqualEqual, Eof]);
        assert_eq!(kinds("<=="), vec![LessEqual, Equal, Eof]);
    }

    #[test]
    fn single_char_tokens() {
        assert_eq!(
            kinds("=(){},.-+;*/!<>"),
            vec![
                Equal, LeftParen, RightParen, LeftBrace, RightBrace, Comma, Dot, Minus, Plus,
                Semicolon, Star, Slash, Bang, Less, Greater, Eof
            ]
        );
    }

    #[test]
    fn comments() {
        assert_eq!(
            scan_ok("a // comment\nb"),
            vec![token(Identifier, "a", 1), token(Identifier, "b", 2), eof(2)]
        );

        assert_eq!(scan_ok("// only a comment"), vec![eof(1)]);
        assert_eq!(kinds("4 / 2 // halves"), vec![Number(4.0), Slash, Number(2.0), Eof]);
    }

    #[test]
    fn numbers() {
        assert_eq!(scan_ok("123"), vec![token(Number(123.0), "123", 1), eof(1)]);
        assert_eq!(scan_ok("3.25"), vec![token(Number(3.25), "3.25", 1), eof(1)]);
        assert_eq!(scan_ok("007"), vec![token(Number(7.0), "007", 1), eof(1)]);

        // No digit after the dot: number then dot
        assert_eq!(scan_ok("1."), vec![token(Number(1.0), "1", 1), token(Dot, ".", 1), eof(1)]);
        assert_eq!(kinds(".5"), vec![Dot, Number(5.0), Eof]);
        assert_eq!(kinds("1.2.3"), vec![Number(1.2), Dot, Number(3.0), Eof]);
        assert_eq!(kinds("-1"), vec![Minus, Number(1.0), Eof]);

        let huge = format!("1{}", "0".repeat(400));
        assert_eq!(kinds(&huge), vec![Number(f64::INFINITY), Eof]);
    }

    #[test]
    fn literal_values() {
        let tokens = scan_ok("12.5 \"s\" nil");
        assert_eq!(tokens[0].literal(), Some(Literal::Number(12.5)));
        assert_eq!(tokens[1].literal(), Some(Literal::Str("s")));
        assert_eq!(tokens[2].literal(), None);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("and class else false for fun if nil or print return super this true var while"),
            vec![
                And, Class, Else, False, For, Fun, If, Nil, Or, Print, Return, Super, This, True,
                Var, While, Eof
            ]
        );

        assert_eq!(
            scan_ok("orchid _under score2 Print"),
            vec![
                token(Identifier, "orchid", 1),
                token(Identifier, "_under", 1),
                token(Identifier, "score2", 1),
                token(Identifier, "Print", 1),
                eof(1),
            ]
        );
    }

    #[test]
    fn whitespace_and_lines() {
        assert_eq!(
            scan_ok(" \t\r1\n\n2\r\n"),
            vec![token(Number(1.0), "1", 1), token(Number(2.0), "2", 3), eof(4)]
        );
    }

    #[test]
    fn unexpected_characters_are_skipped() {
        let (tokens, errors) = scan("1 @ 2\n# 3");
        assert_eq!(
            tokens,
            vec![
                token(Number(1.0), "1", 1),
                token(Number(2.0), "2", 1),
                token(Number(3.0), "3", 2),
                eof(2),
            ]
        );
        assert_eq!(
            *errors,
            vec![
                ScanError::UnexpectedCharacter('@').at(Line(1)),
                ScanError::UnexpectedCharacter('#').at(Line(2)),
            ]
        );
        assert_eq!(errors.to_string(), "[line 1] Error: Unexpected character.\n[line 2] Error: Unexpected character.");
    }

    #[test]
    fn empty_source() {
        assert_eq!(scan_ok(""), vec![eof(1)]);
    }
}
