use cursor::{Cursor, Line};
use diagnostics::Diagnostic;

pub mod token;
pub use token::{Literal, Token, TokenType};
use TokenType::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanErrorType {
    #[error("Unexpected character: {0}")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
    #[error("Invalid number literal: {0}")]
    InvalidNumber(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error: {error}")]
pub struct ScanError {
    pub error: ScanErrorType,
    pub line: Line,
}

impl From<ScanError> for Diagnostic {
    fn from(e: ScanError) -> Self {
        Diagnostic::Lexical { line: e.line, message: e.error.to_string() }
    }
}

/// Result of scanning a whole source: the tokens (always terminated by `Eof`)
/// together with every lexical error hit on the way.
#[derive(Debug, PartialEq)]
pub struct Scanned<'a> {
    pub tokens: Vec<Token<'a>>,
    pub errors: Vec<ScanError>,
}

impl Scanned<'_> {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Scanner<'a> {
    start: Cursor<'a>,
    current: Cursor<'a>,
    tokens: Vec<Token<'a>>,
    errors: Vec<ScanError>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        let cursor = Cursor::new(source);
        Self { start: cursor.clone(), current: cursor, tokens: Vec::new(), errors: Vec::new() }
    }

    pub fn scan_tokens(mut self) -> Scanned<'a> {
        loop {
            self.start = self.current.clone();
            let Some(c) = self.current.next() else {
                break;
            };
            self.scan_token(c);
        }

        self.tokens.push(Token::eof(self.current.line()));
        log::debug!(
            "Scanned {} tokens with {} errors",
            self.tokens.len(),
            self.errors.len()
        );

        Scanned { tokens: self.tokens, errors: self.errors }
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

            '!' => self.add_one_or_two('=', BangEqual, Bang),
            '=' => self.add_one_or_two('=', EqualEqual, Equal),
            '<' => self.add_one_or_two('=', LessEqual, Less),
            '>' => self.add_one_or_two('=', GreaterEqual, Greater),

            '/' => {
                if self.current.next_if_eq('/') {
                    // Comment, the newline itself is left for the main loop
                    self.current.eat_while(|c| c != '\n');
                } else {
                    self.add_token(Slash)
                }
            }

            ' ' | '\r' | '\t' | '\n' => (),

            '"' => self.string(),

            d if d.is_ascii_digit() => self.number(),

            a if is_identifier_start(a) => self.identifier(),

            c => self.error(ScanErrorType::UnexpectedCharacter(c)),
        }
    }

    fn lexeme(&self) -> &'a str {
        self.start.slice_until(&self.current)
    }

    fn add_token(&mut self, token_type: TokenType) {
        self.push(Token::new(token_type, self.lexeme(), self.current.line()));
    }

    fn add_literal_token(&mut self, token_type: TokenType, literal: Literal<'a>) {
        let token = Token::new(token_type, self.lexeme(), self.current.line());
        self.push(token.with_literal(literal));
    }

    fn push(&mut self, token: Token<'a>) {
        log::trace!("Scanned {:?}", token);
        self.tokens.push(token);
    }

    fn add_one_or_two(&mut self, second: char, two: TokenType, one: TokenType) {
        if self.current.next_if_eq(second) {
            self.add_token(two)
        } else {
            self.add_token(one)
        }
    }

    fn error(&mut self, error: ScanErrorType) {
        log::trace!("Scan error at line {}: {}", self.current.line(), error);
        self.errors.push(ScanError { error, line: self.current.line() });
    }

    fn string(&mut self) {
        self.current.eat_while(|c| c != '"');

        if !self.current.next_if_eq('"') {
            // Reported on the line where the input ran out, not where the string began.
            self.error(ScanErrorType::UnterminatedString);
            return;
        }

        let lexeme = self.lexeme();
        self.add_literal_token(Str, Literal::Str(&lexeme[1..lexeme.len() - 1]));
    }

    fn number(&mut self) {
        self.current.eat_while(|c| c.is_ascii_digit());

        // A trailing '.' without digits after it is not part of the number
        if self.current.peek() == Some('.')
            && self.current.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.current.next();
            self.current.eat_while(|c| c.is_ascii_digit());
        }

        let lexeme = self.lexeme();
        match lexeme.parse::<f64>() {
            Ok(n) => self.add_literal_token(Number, Literal::Number(n)),
            Err(_) => self.error(ScanErrorType::InvalidNumber(lexeme.to_string())),
        }
    }

    fn identifier(&mut self) {
        self.current.eat_while(is_identifier_char);
        let token_type = TokenType::keyword(self.lexeme()).unwrap_or(Identifier);
        self.add_token(token_type);
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn eof(line: usize) -> Token<'static> {
        Token::eof(Line(line))
    }

    fn token(token_type: TokenType, lexeme: &str, line: usize) -> Token<'_> {
        Token::new(token_type, lexeme, Line(line))
    }

    fn number(lexeme: &str, value: f64, line: usize) -> Token<'_> {
        token(Number, lexeme, line).with_literal(Literal::Number(value))
    }

    fn scan(source: &str) -> Scanned<'_> {
        Scanner::new(source).scan_tokens()
    }

    #[test]
    fn one_plus_two() {
        let scanned = scan("1+2");
        assert!(scanned.is_ok());
        assert_eq!(
            scanned.tokens,
            vec![number("1", 1.0, 1), token(Plus, "+", 1), number("2", 2.0, 1), eof(1)]
        );
    }

    #[test]
    fn empty_source() {
        assert_eq!(scan(""), Scanned { tokens: vec![eof(1)], errors: vec![] });
        assert_eq!(scan("\n\n").tokens, vec![eof(3)]);
    }

    #[test]
    fn string_literals() {
        let scanned = scan("\"hello world\"");
        assert_eq!(
            scanned.tokens,
            vec![
                token(Str, "\"hello world\"", 1).with_literal(Literal::Str("hello world")),
                eof(1),
            ]
        );

        let scanned = scan("\"\"");
        assert_eq!(scanned.tokens[0].literal, Some(Literal::Str("")));
    }

    #[test]
    fn multi_line_string() {
        let scanned = scan("\"a\nb\"\n+");
        assert!(scanned.is_ok());
        assert_eq!(
            scanned.tokens,
            vec![
                token(Str, "\"a\nb\"", 2).with_literal(Literal::Str("a\nb")),
                token(Plus, "+", 3),
                eof(3),
            ]
        );
    }

    #[test]
    fn unterminated_string() {
        let scanned = scan("\"hello world");
        assert_eq!(
            scanned,
            Scanned {
                tokens: vec![eof(1)],
                errors: vec![ScanError { error: ScanErrorType::UnterminatedString, line: Line(1) }],
            }
        );

        // Reported at the line where the input ends
        let scanned = scan("1 \"hello\nworld\n");
        assert_eq!(
            scanned.errors,
            vec![ScanError { error: ScanErrorType::UnterminatedString, line: Line(3) }]
        );
        assert_eq!(scanned.tokens, vec![number("1", 1.0, 1), eof(3)]);
    }

    #[test]
    fn two_char_tokens() {
        let scanned = scan("! != = == < <= > >=");
        assert_eq!(
            scanned.tokens,
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

        // Maximal munch: "===" is "==" followed by "="
        let scanned = scan("===");
        assert_eq!(
            scanned.tokens,
            vec![token(EqualEqual, "==", 1), token(Equal, "=", 1), eof(1)]
        );
    }

    #[test]
    fn single_char_tokens() {
        let scanned = scan("=(){},.-+;*/!<>");
        let types: Vec<TokenType> = scanned.tokens.iter().map(|t| t.token_type).collect();
        assert_eq!(
            types,
            vec![
                Equal, LeftParen, RightParen, LeftBrace, RightBrace, Comma, Dot, Minus, Plus,
                Semicolon, Star, Slash, Bang, Less, Greater, Eof,
            ]
        );
    }

    #[test]
    fn comments() {
        let scanned = scan("a // comment\nb");
        assert_eq!(
            scanned.tokens,
            vec![token(Identifier, "a", 1), token(Identifier, "b", 2), eof(2)]
        );

        let scanned = scan("// only a comment");
        assert_eq!(scanned.tokens, vec![eof(1)]);
    }

    #[test]
    fn numbers() {
        let scanned = scan("123 45.67 8.");
        assert_eq!(
            scanned.tokens,
            vec![
                number("123", 123.0, 1),
                number("45.67", 45.67, 1),
                number("8", 8.0, 1),
                token(Dot, ".", 1),
                eof(1),
            ]
        );

        let scanned = scan(".5");
        assert_eq!(scanned.tokens, vec![token(Dot, ".", 1), number("5", 5.0, 1), eof(1)]);
    }

    #[test]
    fn identifiers_and_keywords() {
        let scanned = scan("andy and _x1 nil");
        assert_eq!(
            scanned.tokens,
            vec![
                token(Identifier, "andy", 1),
                token(And, "and", 1),
                token(Identifier, "_x1", 1),
                token(Nil, "nil", 1),
                eof(1),
            ]
        );
    }

    #[test]
    fn unexpected_characters_accumulate() {
        let scanned = scan("@ 1\n# $");
        assert_eq!(scanned.tokens, vec![number("1", 1.0, 1), eof(2)]);
        assert_eq!(
            scanned.errors,
            vec![
                ScanError { error: ScanErrorType::UnexpectedCharacter('@'), line: Line(1) },
                ScanError { error: ScanErrorType::UnexpectedCharacter('#'), line: Line(2) },
                ScanError { error: ScanErrorType::UnexpectedCharacter('$'), line: Line(2) },
            ]
        );
        assert_eq!(scanned.errors[0].to_string(), "[line 1] Error: Unexpected character: @");
        assert_eq!(
            Diagnostic::from(scanned.errors[2].clone()).to_string(),
            "[line 2] Error: Unexpected character: $"
        );
    }
}
