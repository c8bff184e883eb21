//! Small HTML tokenizer for server-rendered form markup.
//!
//! Tag and attribute names are restricted to ASCII `[A-Za-z0-9:_-]` and lowercased.
//! `script`, `style` and `textarea` bodies are scanned as raw text up to their
//! close tag; textarea bodies still get entity decoding.
//!
//! Known limitations:
//! - No HTML5 parse-error recovery; malformed tags degrade to best-effort tokens.
//! - No implied end tags; the tree builder pops to the nearest matching open element.
use crate::entities::decode_entities;
use crate::types::{Attribute, Token};
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_rawtext_element(name: &str) -> bool {
    matches!(name, "script" | "style" | "textarea")
}

#[inline]
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

/// Cursor over the input. Slices are only cut at ASCII structural bytes, so every
/// slice endpoint stays on a UTF-8 char boundary.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    out: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            out: Vec::new(),
        }
    }

    pub fn run(mut self) -> Vec<Token> {
        while self.pos < self.input.len() {
            if self.bytes()[self.pos] != b'<' {
                self.text();
                continue;
            }
            let rest = &self.input[self.pos..];
            if rest.starts_with(COMMENT_START) {
                self.comment();
            } else if rest.len() >= 9 && rest.as_bytes()[..9].eq_ignore_ascii_case(b"<!doctype") {
                self.doctype();
            } else if rest.as_bytes().get(1) == Some(&b'/') {
                self.end_tag();
            } else if rest.as_bytes().get(1).is_some_and(|b| b.is_ascii_alphabetic()) {
                self.start_tag();
            } else {
                // A lone '<' is text.
                self.push_text("<");
                self.pos += 1;
            }
        }
        log::trace!(target: "html.tokenizer", "tokenized {} tokens", self.out.len());
        self.out
    }

    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        // Merge with a preceding text token so "a < b" stays one node.
        if let Some(Token::Text(prev)) = self.out.last_mut() {
            prev.push_str(text);
        } else {
            self.out.push(Token::Text(text.to_string()));
        }
    }

    fn text(&mut self) {
        let start = self.pos;
        let end = memchr(b'<', &self.bytes()[start..])
            .map(|rel| start + rel)
            .unwrap_or(self.input.len());
        let decoded = decode_entities(&self.input[start..end]);
        self.push_text(&decoded);
        self.pos = end;
    }

    fn comment(&mut self) {
        let body_start = self.pos + COMMENT_START.len();
        match self.input[body_start..].find(COMMENT_END) {
            Some(rel) => {
                let body = &self.input[body_start..body_start + rel];
                self.out.push(Token::Comment(body.to_string()));
                self.pos = body_start + rel + COMMENT_END.len();
            }
            None => {
                self.out
                    .push(Token::Comment(self.input[body_start..].to_string()));
                self.pos = self.input.len();
            }
        }
    }

    fn doctype(&mut self) {
        let body_start = self.pos + 2;
        match memchr(b'>', &self.bytes()[body_start..]) {
            Some(rel) => {
                let body = self.input[body_start..body_start + rel].trim();
                self.out.push(Token::Doctype(body.to_string()));
                self.pos = body_start + rel + 1;
            }
            None => self.pos = self.input.len(),
        }
    }

    fn name_at(&self, start: usize) -> usize {
        let bytes = self.bytes();
        let mut end = start;
        while end < bytes.len() && is_name_byte(bytes[end]) {
            end += 1;
        }
        end
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn end_tag(&mut self) {
        let name_start = self.pos + 2;
        let name_end = self.name_at(name_start);
        let name = self.input[name_start..name_end].to_ascii_lowercase();
        self.pos = match memchr(b'>', &self.bytes()[name_end..]) {
            Some(rel) => name_end + rel + 1,
            None => self.input.len(),
        };
        if !name.is_empty() {
            self.out.push(Token::EndTag(name));
        }
    }

    fn start_tag(&mut self) {
        let name_start = self.pos + 1;
        let name_end = self.name_at(name_start);
        let name = self.input[name_start..name_end].to_ascii_lowercase();
        self.pos = name_end;

        let mut attributes: Vec<Attribute> = Vec::new();
        let mut self_closing = false;
        let len = self.input.len();
        loop {
            self.skip_whitespace();
            if self.pos >= len {
                break;
            }
            match self.bytes()[self.pos] {
                b'>' => {
                    self.pos += 1;
                    break;
                }
                b'/' => {
                    self.pos += 1;
                    if self.bytes().get(self.pos) == Some(&b'>') {
                        self_closing = true;
                        self.pos += 1;
                        break;
                    }
                }
                b if is_name_byte(b) => {
                    if let Some(attribute) = self.attribute() {
                        // First occurrence wins for duplicate attribute names.
                        if !attributes.iter().any(|(k, _)| *k == attribute.0) {
                            attributes.push(attribute);
                        }
                    }
                }
                _ => self.pos += 1,
            }
        }

        let self_closing = self_closing || is_void_element(&name);
        let rawtext = !self_closing && is_rawtext_element(&name);
        self.out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });
        if rawtext {
            self.rawtext(name);
        }
    }

    fn attribute(&mut self) -> Option<Attribute> {
        let name_start = self.pos;
        let name_end = self.name_at(name_start);
        if name_end == name_start {
            self.pos += 1;
            return None;
        }
        let name = self.input[name_start..name_end].to_ascii_lowercase();
        self.pos = name_end;
        self.skip_whitespace();

        if self.bytes().get(self.pos) != Some(&b'=') {
            return Some((name, None));
        }
        self.pos += 1;
        self.skip_whitespace();

        let bytes = self.bytes();
        let value = match bytes.get(self.pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                let value_start = self.pos + 1;
                let value_end = memchr(quote, &bytes[value_start..])
                    .map(|rel| value_start + rel)
                    .unwrap_or(bytes.len());
                self.pos = (value_end + 1).min(bytes.len());
                decode_entities(&self.input[value_start..value_end])
            }
            _ => {
                let value_start = self.pos;
                let mut end = value_start;
                while end < bytes.len() && !bytes[end].is_ascii_whitespace() && bytes[end] != b'>'
                {
                    if bytes[end] == b'/' && bytes.get(end + 1) == Some(&b'>') {
                        break;
                    }
                    end += 1;
                }
                self.pos = end;
                decode_entities(&self.input[value_start..end])
            }
        };
        Some((name, Some(value)))
    }

    /// Consume everything up to `</name` (ASCII case-insensitive) followed by
    /// optional whitespace and `>`. A missing close tag swallows the rest of the input.
    fn rawtext(&mut self, name: String) {
        let body_start = self.pos;
        let bytes = self.bytes();
        let mut scan = body_start;
        let mut close: Option<(usize, usize)> = None;
        while let Some(rel) = memchr(b'<', &bytes[scan..]) {
            let lt = scan + rel;
            let name_start = lt + 2;
            let name_end = name_start + name.len();
            if bytes.get(lt + 1) == Some(&b'/')
                && bytes.len() >= name_end
                && bytes[name_start..name_end].eq_ignore_ascii_case(name.as_bytes())
            {
                let mut k = name_end;
                while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                    k += 1;
                }
                if bytes.get(k) == Some(&b'>') {
                    close = Some((lt, k + 1));
                    break;
                }
            }
            scan = lt + 1;
        }

        let (body_end, resume) = close.unwrap_or((bytes.len(), bytes.len()));
        let raw = &self.input[body_start..body_end];
        if !raw.is_empty() {
            let text = if name == "textarea" {
                decode_entities(raw)
            } else {
                raw.to_string()
            };
            self.out.push(Token::Text(text));
        }
        self.out.push(Token::EndTag(name));
        self.pos = resume;
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::new(input).run()
}
