//! A compact CSS selector subset, enough for the attribute-driven wiring of
//! formset markup.
//!
//! Supported:
//! - type (`input`), universal (`*`), `#id`, `.class`
//! - attributes: `[name]`, `[name=v]`, `[name^=v]`, `[name$=v]`, `[name*=v]`,
//!   `[name~=v]`; values may be bare or quoted
//! - descendant (whitespace) and child (`>`) combinators
//! - selector lists (`a, b`)
//!
//! Type and attribute names match ASCII case-insensitively, values match exactly.
use crate::{Document, NodeKey};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorError {
    Empty,
    UnexpectedChar { ch: char, pos: usize },
    UnterminatedAttribute { pos: usize },
    DanglingCombinator { pos: usize },
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorError::Empty => f.write_str("empty selector"),
            SelectorError::UnexpectedChar { ch, pos } => {
                write!(f, "unexpected {ch:?} at byte {pos}")
            }
            SelectorError::UnterminatedAttribute { pos } => {
                write!(f, "unterminated attribute selector starting at byte {pos}")
            }
            SelectorError::DanglingCombinator { pos } => {
                write!(f, "combinator at byte {pos} has no right-hand side")
            }
        }
    }
}

impl std::error::Error for SelectorError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Prefix,
    Suffix,
    Contains,
    Includes,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttrMatch {
    fn test(&self, actual: &str) -> bool {
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == self.value,
            AttrOp::Prefix => !self.value.is_empty() && actual.starts_with(&self.value),
            AttrOp::Suffix => !self.value.is_empty() && actual.ends_with(&self.value),
            AttrOp::Contains => !self.value.is_empty() && actual.contains(&self.value),
            AttrOp::Includes => actual.split_ascii_whitespace().any(|t| t == self.value),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, doc: &Document, key: NodeKey) -> bool {
        let Some(name) = doc.name(key) else {
            return false;
        };
        if let Some(tag) = &self.tag
            && tag != "*"
            && !tag.eq_ignore_ascii_case(name)
        {
            return false;
        }
        if let Some(id) = &self.id
            && doc.attr(key, "id") != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| doc.has_class(key, c)) {
            return false;
        }
        self.attrs
            .iter()
            .all(|a| doc.attr(key, &a.name).is_some_and(|v| a.test(v)))
    }
}

/// One complex selector; `parts[i].0` links `parts[i]` to `parts[i - 1]`.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

impl Complex {
    fn matches(&self, doc: &Document, key: NodeKey) -> bool {
        self.match_at(doc, key, self.parts.len() - 1)
    }

    fn match_at(&self, doc: &Document, key: NodeKey, idx: usize) -> bool {
        let (combinator, compound) = &self.parts[idx];
        if !compound.matches(doc, key) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => doc
                .parent_element(key)
                .is_some_and(|parent| self.match_at(doc, parent, idx - 1)),
            Combinator::Descendant => {
                let mut current = doc.parent_element(key);
                while let Some(ancestor) = current {
                    if self.match_at(doc, ancestor, idx - 1) {
                        return true;
                    }
                    current = doc.parent_element(ancestor);
                }
                false
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let alternatives = Parser::new(source).parse_list()?;
        Ok(Self {
            source: source.trim().to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, doc: &Document, key: NodeKey) -> bool {
        self.alternatives.iter().any(|c| c.matches(doc, key))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(ch) => SelectorError::UnexpectedChar { ch, pos: self.pos },
            None => SelectorError::Empty,
        }
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn parse_list(&mut self) -> Result<Vec<Complex>, SelectorError> {
        let mut out = Vec::new();
        loop {
            self.skip_ws();
            out.push(self.parse_complex()?);
            self.skip_ws();
            match self.peek() {
                None => break,
                Some(',') => {
                    self.bump();
                }
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(out)
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;
        loop {
            let compound = self.parse_compound()?;
            if compound.is_empty() {
                return Err(if parts.is_empty() {
                    self.unexpected()
                } else {
                    SelectorError::DanglingCombinator { pos: self.pos }
                });
            }
            parts.push((combinator, compound));

            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    combinator = Combinator::Child;
                }
                Some(_) if had_ws => combinator = Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(Complex { parts })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        if self.peek() == Some('*') {
            self.bump();
            compound.tag = Some("*".to_string());
        } else if self.peek().is_some_and(|c| c.is_alphabetic()) {
            compound.tag = Some(self.ident().to_ascii_lowercase());
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    let id = self.ident();
                    if id.is_empty() {
                        return Err(self.unexpected());
                    }
                    compound.id = Some(id);
                }
                Some('.') => {
                    self.bump();
                    let class = self.ident();
                    if class.is_empty() {
                        return Err(self.unexpected());
                    }
                    compound.classes.push(class);
                }
                Some('[') => compound.attrs.push(self.parse_attr()?),
                _ => break,
            }
        }
        Ok(compound)
    }

    fn parse_attr(&mut self) -> Result<AttrMatch, SelectorError> {
        let open = self.pos;
        self.bump();
        self.skip_ws();
        let name = self.ident().to_ascii_lowercase();
        if name.is_empty() {
            return Err(self.unexpected());
        }
        self.skip_ws();
        let op = match self.bump() {
            Some(']') => {
                return Ok(AttrMatch {
                    name,
                    op: AttrOp::Exists,
                    value: String::new(),
                });
            }
            Some('=') => AttrOp::Equals,
            Some(c @ ('^' | '$' | '*' | '~')) => {
                if self.bump() != Some('=') {
                    return Err(SelectorError::UnterminatedAttribute { pos: open });
                }
                match c {
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '*' => AttrOp::Contains,
                    _ => AttrOp::Includes,
                }
            }
            _ => return Err(SelectorError::UnterminatedAttribute { pos: open }),
        };
        self.skip_ws();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                let Some(rel) = self.src[start..].find(quote) else {
                    return Err(SelectorError::UnterminatedAttribute { pos: open });
                };
                self.pos = start + rel + 1;
                self.src[start..start + rel].to_string()
            }
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c != ']' && !c.is_ascii_whitespace())
                {
                    self.bump();
                }
                self.src[start..self.pos].to_string()
            }
        };
        self.skip_ws();
        if self.bump() != Some(']') {
            return Err(SelectorError::UnterminatedAttribute { pos: open });
        }
        Ok(AttrMatch { name, op, value })
    }
}
