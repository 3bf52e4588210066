//! Minimal S-expression reader for KiCad board files.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Unexpected end of input (unclosed list opened at line {0})")]
    UnclosedList(usize),
    #[error("Unterminated string starting at line {0}")]
    UnterminatedString(usize),
    #[error("Unexpected `)` at line {0}")]
    UnexpectedClose(usize),
    #[error("Empty input")]
    Empty,
    #[error("Trailing data after the top-level expression at line {0}")]
    TrailingData(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SExp {
    Atom(String),
    List(Vec<SExp>),
}

impl SExp {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExp::Atom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SExp]> {
        match self {
            SExp::List(items) => Some(items),
            _ => None,
        }
    }

    /// First atom of a list, e.g. `footprint` for `(footprint "R_0603" ...)`.
    pub fn tag(&self) -> Option<&str> {
        self.as_list()
            .and_then(|items| items.first())
            .and_then(SExp::as_atom)
    }

    /// Atom at position `index` of a list (0 is the tag).
    pub fn atom_at(&self, index: usize) -> Option<&str> {
        self.as_list()
            .and_then(|items| items.get(index))
            .and_then(SExp::as_atom)
    }

    /// Direct child lists whose tag is `key`.
    pub fn children<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a SExp> + 'a {
        self.as_list()
            .unwrap_or(&[])
            .iter()
            .filter(move |item| item.tag() == Some(key))
    }

    /// First direct child list tagged `key`.
    pub fn child(&self, key: &str) -> Option<&SExp> {
        self.as_list()?.iter().find(|item| item.tag() == Some(key))
    }

    /// Value of a `(key value)` child.
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.child(key).and_then(|c| c.atom_at(1))
    }
}

pub struct SExpParser<'a> {
    input: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> SExpParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.chars().peekable(),
            line: 1,
        }
    }

    /// Parse exactly one top-level expression.
    pub fn parse(&mut self) -> Result<SExp, ParseError> {
        self.skip_whitespace();
        let root = match self.input.peek() {
            None => return Err(ParseError::Empty),
            Some(_) => self.parse_sexp()?,
        };
        self.skip_whitespace();
        if self.input.peek().is_some() {
            return Err(ParseError::TrailingData(self.line));
        }
        Ok(root)
    }

    fn parse_sexp(&mut self) -> Result<SExp, ParseError> {
        match self.input.peek() {
            Some('(') => self.parse_list(),
            Some(')') => Err(ParseError::UnexpectedClose(self.line)),
            Some('"') => self.parse_string(),
            _ => Ok(self.parse_symbol()),
        }
    }

    fn parse_list(&mut self) -> Result<SExp, ParseError> {
        let opened_at = self.line;
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.input.peek() {
                None => return Err(ParseError::UnclosedList(opened_at)),
                Some(')') => {
                    self.bump();
                    return Ok(SExp::List(items));
                }
                Some(_) => items.push(self.parse_sexp()?),
            }
        }
    }

    fn parse_string(&mut self) -> Result<SExp, ParseError> {
        let started_at = self.line;
        self.bump();
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedString(started_at)),
                Some('"') => return Ok(SExp::Atom(s)),
                Some('\\') => match self.bump() {
                    None => return Err(ParseError::UnterminatedString(started_at)),
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some(other) => s.push(other),
                },
                Some(ch) => s.push(ch),
            }
        }
    }

    fn parse_symbol(&mut self) -> SExp {
        let mut s = String::new();
        while let Some(&ch) = self.input.peek() {
            if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' {
                break;
            }
            s.push(ch);
            self.bump();
        }
        SExp::Atom(s)
    }

    fn skip_whitespace(&mut self) {
        while self.input.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.input.next();
        if ch == Some('\n') {
            self.line += 1;
        }
        ch
    }
}
