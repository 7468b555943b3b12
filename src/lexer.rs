use crate::error::SetkerError;
use crate::value::number_literal;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,
    Mod,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    And,
    Class,
    Else,
    False,
    For,
    Fun,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    // Special
    Eof,
}

impl TokenType {
    /// Name used by the tokenize-mode output.
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::LeftParen => "LEFT_PAREN",
            TokenType::RightParen => "RIGHT_PAREN",
            TokenType::LeftBrace => "LEFT_BRACE",
            TokenType::RightBrace => "RIGHT_BRACE",
            TokenType::LeftBracket => "LEFT_BRACKET",
            TokenType::RightBracket => "RIGHT_BRACKET",
            TokenType::Comma => "COMMA",
            TokenType::Colon => "COLON",
            TokenType::Dot => "DOT",
            TokenType::Minus => "MINUS",
            TokenType::Plus => "PLUS",
            TokenType::Semicolon => "SEMICOLON",
            TokenType::Slash => "SLASH",
            TokenType::Star => "STAR",
            TokenType::Mod => "MOD",
            TokenType::Bang => "BANG",
            TokenType::BangEqual => "BANG_EQUAL",
            TokenType::Equal => "EQUAL",
            TokenType::EqualEqual => "EQUAL_EQUAL",
            TokenType::Greater => "GREATER",
            TokenType::GreaterEqual => "GREATER_EQUAL",
            TokenType::Less => "LESS",
            TokenType::LessEqual => "LESS_EQUAL",
            TokenType::Identifier => "IDENTIFIER",
            TokenType::String => "STRING",
            TokenType::Number => "NUMBER",
            TokenType::And => "AND",
            TokenType::Class => "CLASS",
            TokenType::Else => "ELSE",
            TokenType::False => "FALSE",
            TokenType::For => "FOR",
            TokenType::Fun => "FUN",
            TokenType::If => "IF",
            TokenType::Nil => "NIL",
            TokenType::Or => "OR",
            TokenType::Print => "PRINT",
            TokenType::Return => "RETURN",
            TokenType::Super => "SUPER",
            TokenType::This => "THIS",
            TokenType::True => "TRUE",
            TokenType::Var => "VAR",
            TokenType::While => "WHILE",
            TokenType::Eof => "EOF",
        }
    }
}

/// The typed payload a NUMBER or STRING token carries, distinct from its
/// lexeme.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub line: usize,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, line: usize) -> Self {
        Self {
            token_type,
            lexeme,
            literal: None,
            line,
        }
    }

    pub fn with_literal(token_type: TokenType, lexeme: String, literal: Literal, line: usize) -> Self {
        Self {
            token_type,
            lexeme,
            literal: Some(literal),
            line,
        }
    }
}

/// Tokenize-mode line format: `TYPE lexeme literal`.
///
/// String tokens print their quoted form followed by the raw contents;
/// number tokens print the source lexeme followed by the canonical decimal
/// (`42` -> `42.0`). Everything else has a `null` literal.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.token_type, &self.literal) {
            (TokenType::String, Some(Literal::String(contents))) => {
                write!(f, "STRING \"{}\" {}", self.lexeme, contents)
            }
            (TokenType::Number, Some(Literal::Number(n))) => {
                write!(f, "NUMBER {} {}", self.lexeme, number_literal(*n))
            }
            _ => write!(f, "{} {} null", self.token_type.name(), self.lexeme),
        }
    }
}

/// Everything one scan produces. Scanning never aborts: errors are
/// collected so a single run reports all of them, and the token stream is
/// still usable for tokenize-mode output.
pub struct ScanResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<SetkerError>,
}

impl ScanResult {
    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct Lexer {
    source: Vec<u8>,
    tokens: Vec<Token>,
    errors: Vec<SetkerError>,
    start: usize,
    current: usize,
    line: usize,
    keywords: HashMap<&'static str, TokenType>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let mut keywords = HashMap::new();
        keywords.insert("and", TokenType::And);
        keywords.insert("class", TokenType::Class);
        keywords.insert("else", TokenType::Else);
        keywords.insert("false", TokenType::False);
        keywords.insert("for", TokenType::For);
        keywords.insert("fun", TokenType::Fun);
        keywords.insert("if", TokenType::If);
        keywords.insert("nil", TokenType::Nil);
        keywords.insert("or", TokenType::Or);
        keywords.insert("print", TokenType::Print);
        keywords.insert("return", TokenType::Return);
        keywords.insert("super", TokenType::Super);
        keywords.insert("this", TokenType::This);
        keywords.insert("true", TokenType::True);
        keywords.insert("var", TokenType::Var);
        keywords.insert("while", TokenType::While);

        Self {
            source: source.as_bytes().to_vec(),
            tokens: Vec::new(),
            errors: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            keywords,
        }
    }

    pub fn scan_tokens(mut self) -> ScanResult {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens
            .push(Token::new(TokenType::Eof, String::new(), self.line));

        ScanResult {
            tokens: self.tokens,
            errors: self.errors,
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) {
        let c = self.advance();

        match c {
            b'(' => self.add_token(TokenType::LeftParen),
            b')' => self.add_token(TokenType::RightParen),
            b'{' => self.add_token(TokenType::LeftBrace),
            b'}' => self.add_token(TokenType::RightBrace),
            b'[' => self.add_token(TokenType::LeftBracket),
            b']' => self.add_token(TokenType::RightBracket),
            b',' => self.add_token(TokenType::Comma),
            b':' => self.add_token(TokenType::Colon),
            b'.' => self.add_token(TokenType::Dot),
            b'-' => self.add_token(TokenType::Minus),
            b'+' => self.add_token(TokenType::Plus),
            b';' => self.add_token(TokenType::Semicolon),
            b'*' => self.add_token(TokenType::Star),
            b'%' => self.add_token(TokenType::Mod),
            b'!' => {
                let token_type = if self.match_byte(b'=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.add_token(token_type);
            }
            b'=' => {
                let token_type = if self.match_byte(b'=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.add_token(token_type);
            }
            b'>' => {
                let token_type = if self.match_byte(b'=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(token_type);
            }
            b'<' => {
                if self.match_byte(b'=') {
                    self.add_token(TokenType::LessEqual);
                } else if self.match_byte(b'|') {
                    self.block_comment();
                } else {
                    self.add_token(TokenType::Less);
                }
            }
            b'/' => {
                if self.match_byte(b'/') {
                    // Comment goes until end of line
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenType::Slash);
                }
            }
            b' ' | b'\r' | b'\t' => {
                // Ignore whitespace
            }
            b'\n' => {
                self.line += 1;
            }
            b'"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() || c == b'_' => self.identifier(),
            _ => {
                self.errors.push(SetkerError::lex_error(
                    self.line,
                    format!("Unexpected character: {}", c as char),
                ));
            }
        }
    }

    fn advance(&mut self) -> u8 {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.current += 1;
            true
        }
    }

    fn peek(&self) -> u8 {
        if self.current >= self.source.len() {
            return 0;
        }
        self.source[self.current]
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.source.len() {
            return 0;
        }
        self.source[self.current + 1]
    }

    /// `<| ... |>`, no nesting. An unterminated comment silently swallows
    /// the rest of the file. Embedded newlines do not advance the line
    /// counter (inherited behavior).
    fn block_comment(&mut self) {
        while !self.is_at_end() {
            if self.peek() == b'|' && self.peek_next() == b'>' {
                self.current += 2;
                return;
            }
            self.advance();
        }
    }

    fn string(&mut self) {
        while self.peek() != b'"' && !self.is_at_end() {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.errors.push(SetkerError::lex_error(
                self.line,
                "Unterminated string.".to_string(),
            ));
            return;
        }

        // Consume the closing quote
        self.advance();

        // The lexeme is the contents between the quotes
        let contents = self.lexeme_slice(self.start + 1, self.current - 1);
        self.tokens.push(Token::with_literal(
            TokenType::String,
            contents.clone(),
            Literal::String(contents),
            self.line,
        ));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A '.' joins the number only when a digit follows; otherwise the
        // number ends here and the dot is scanned as its own token.
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let lexeme = self.lexeme_slice(self.start, self.current);
        let value: f64 = lexeme.parse().unwrap_or(0.0);
        self.tokens.push(Token::with_literal(
            TokenType::Number,
            lexeme,
            Literal::Number(value),
            self.line,
        ));
    }

    fn identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }

        let text = self.lexeme_slice(self.start, self.current);
        let token_type = self
            .keywords
            .get(text.as_str())
            .copied()
            .unwrap_or(TokenType::Identifier);

        self.tokens.push(Token::new(token_type, text, self.line));
    }

    fn add_token(&mut self, token_type: TokenType) {
        let text = self.lexeme_slice(self.start, self.current);
        self.tokens.push(Token::new(token_type, text, self.line));
    }

    fn lexeme_slice(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.source[start..end]).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> ScanResult {
        Lexer::new(source).scan_tokens()
    }

    fn types(source: &str) -> Vec<TokenType> {
        scan(source).tokens.iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn empty_source_yields_eof() {
        let result = scan("");
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].token_type, TokenType::Eof);
        assert!(!result.had_error());
    }

    #[test]
    fn punctuation_and_operators() {
        assert_eq!(
            types("(){}[],.;:+-*/% ! != = == < <= > >="),
            vec![
                TokenType::LeftParen,
                TokenType::RightParen,
                TokenType::LeftBrace,
                TokenType::RightBrace,
                TokenType::LeftBracket,
                TokenType::RightBracket,
                TokenType::Comma,
                TokenType::Dot,
                TokenType::Semicolon,
                TokenType::Colon,
                TokenType::Plus,
                TokenType::Minus,
                TokenType::Star,
                TokenType::Slash,
                TokenType::Mod,
                TokenType::Bang,
                TokenType::BangEqual,
                TokenType::Equal,
                TokenType::EqualEqual,
                TokenType::Less,
                TokenType::LessEqual,
                TokenType::Greater,
                TokenType::GreaterEqual,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(
            types("var Var if nil"),
            vec![
                TokenType::Var,
                TokenType::Identifier,
                TokenType::If,
                TokenType::Nil,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn number_literal_keeps_lexeme() {
        let result = scan("1.500");
        assert_eq!(result.tokens[0].lexeme, "1.500");
        assert_eq!(result.tokens[0].literal, Some(Literal::Number(1.5)));
    }

    #[test]
    fn trailing_dot_is_a_separate_token() {
        assert_eq!(
            types("123."),
            vec![TokenType::Number, TokenType::Dot, TokenType::Eof]
        );
    }

    #[test]
    fn dot_between_digit_runs_joins_the_number() {
        let result = scan("12.34");
        assert_eq!(result.tokens.len(), 2);
        assert_eq!(result.tokens[0].literal, Some(Literal::Number(12.34)));
    }

    #[test]
    fn string_literal_strips_quotes() {
        let result = scan("\"hello\"");
        assert_eq!(result.tokens[0].lexeme, "hello");
        assert_eq!(
            result.tokens[0].literal,
            Some(Literal::String("hello".to_string()))
        );
    }

    #[test]
    fn empty_string_has_empty_lexeme() {
        let result = scan("\"\"");
        assert_eq!(result.tokens[0].token_type, TokenType::String);
        assert_eq!(result.tokens[0].lexeme, "");
    }

    #[test]
    fn multiline_string_advances_line_counter() {
        let result = scan("\"a\nb\" x");
        assert_eq!(result.tokens[0].token_type, TokenType::String);
        assert_eq!(result.tokens[1].line, 2);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let result = scan("\"abc");
        assert!(result.had_error());
        assert_eq!(
            result.errors[0].message,
            "[line 1] Error: Unterminated string."
        );
        // No string token was produced
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].token_type, TokenType::Eof);
    }

    #[test]
    fn line_comment_runs_to_end_of_line() {
        assert_eq!(
            types("// nothing here\nvar"),
            vec![TokenType::Var, TokenType::Eof]
        );
        let result = scan("// nothing\nx");
        assert_eq!(result.tokens[0].line, 2);
    }

    #[test]
    fn block_comment_is_skipped() {
        assert_eq!(
            types("1 <| anything * / \"x\" |> 2"),
            vec![TokenType::Number, TokenType::Number, TokenType::Eof]
        );
    }

    #[test]
    fn unterminated_block_comment_swallows_rest_of_file() {
        assert_eq!(types("1 <| never closed"), vec![TokenType::Number, TokenType::Eof]);
        assert!(!scan("1 <| never closed").had_error());
    }

    #[test]
    fn unexpected_character_reports_and_continues() {
        let result = scan("@#\nvar");
        assert_eq!(result.errors.len(), 2);
        assert_eq!(
            result.errors[0].message,
            "[line 1] Error: Unexpected character: @"
        );
        assert_eq!(
            result.errors[1].message,
            "[line 1] Error: Unexpected character: #"
        );
        assert_eq!(result.tokens[0].token_type, TokenType::Var);
    }

    #[test]
    fn scanner_tracks_lines() {
        let result = scan("1\n2 3\n4");
        let lines: Vec<usize> = result.tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 2, 3, 3]);
    }

    #[test]
    fn token_display_format() {
        let result = scan("var x = 42;");
        let printed: Vec<String> = result.tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            printed,
            vec![
                "VAR var null",
                "IDENTIFIER x null",
                "EQUAL = null",
                "NUMBER 42 42.0",
                "SEMICOLON ; null",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn string_token_display_reconstructs_quotes() {
        let result = scan("\"hi\"");
        assert_eq!(result.tokens[0].to_string(), "STRING \"hi\" hi");
    }

    #[test]
    fn number_token_display_is_canonical() {
        let result = scan("1.500 0.25");
        assert_eq!(result.tokens[0].to_string(), "NUMBER 1.500 1.5");
        assert_eq!(result.tokens[1].to_string(), "NUMBER 0.25 0.25");
    }
}
