//! core::notes::config_text
//!
//! The git-config text format used for note bodies.
//!
//! Only what note records need is supported: sections with optional
//! quoted subsections, `key = value` lines, comments, quoting, the
//! standard escapes and line continuations. Section and key names are
//! case-insensitive and stored lowercase.
//!
//! # Example
//!
//! ```
//! use groupnotes::core::notes::config_text::ConfigText;
//!
//! let text = ConfigText::parse("[group]\n\tname = \"  padded  \"\n").unwrap();
//! assert_eq!(text.get("group", "name"), Some("  padded  "));
//! ```

use thiserror::Error;

/// Parse failure, with the 1-based line it occurred on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ConfigTextError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    subsection: Option<String>,
    values: Vec<(String, Option<String>)>,
}

/// A parsed git-config document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigText {
    sections: Vec<Section>,
}

impl ConfigText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse git-config text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigTextError`] for malformed headers, lines that are
    /// not `key = value`, keys outside a section, unterminated quotes and
    /// unknown escapes.
    pub fn parse(text: &str) -> Result<Self, ConfigTextError> {
        Parser::new(text).parse()
    }

    /// Value of `section.key` outside any subsection.
    ///
    /// When the key repeats, the last value wins. A key written without
    /// `=` reads as the empty string.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let section = section.to_ascii_lowercase();
        let key = key.to_ascii_lowercase();
        self.sections
            .iter()
            .filter(|s| s.name == section && s.subsection.is_none())
            .flat_map(|s| s.values.iter())
            .filter(|(k, _)| *k == key)
            .last()
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    /// Set `section.key`, replacing every existing value.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let section = section.to_ascii_lowercase();
        let key = key.to_ascii_lowercase();
        for s in self
            .sections
            .iter_mut()
            .filter(|s| s.name == section && s.subsection.is_none())
        {
            s.values.retain(|(k, _)| *k != key);
        }
        let target = match self
            .sections
            .iter_mut()
            .position(|s| s.name == section && s.subsection.is_none())
        {
            Some(index) => &mut self.sections[index],
            None => {
                self.sections.push(Section {
                    name: section,
                    subsection: None,
                    values: Vec::new(),
                });
                let last = self.sections.len() - 1;
                &mut self.sections[last]
            }
        };
        target.values.push((key, Some(value.to_string())));
    }

    /// Render as git-config text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            match &section.subsection {
                Some(sub) => out.push_str(&format!(
                    "[{} \"{}\"]\n",
                    section.name,
                    escape_subsection(sub)
                )),
                None => out.push_str(&format!("[{}]\n", section.name)),
            }
            for (key, value) in &section.values {
                match value {
                    Some(v) => out.push_str(&format!("\t{} = {}\n", key, escape_value(v))),
                    None => out.push_str(&format!("\t{}\n", key)),
                }
            }
        }
        out
    }
}

/// Escape a value so that parsing it yields the same string.
fn escape_value(value: &str) -> String {
    let needs_quotes = value.starts_with([' ', '\t'])
        || value.ends_with([' ', '\t'])
        || value.contains(['#', ';']);

    let mut out = String::with_capacity(value.len() + 2);
    if needs_quotes {
        out.push('"');
    }
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            c => out.push(c),
        }
    }
    if needs_quotes {
        out.push('"');
    }
    out
}

fn escape_subsection(sub: &str) -> String {
    sub.replace('\\', "\\\\").replace('"', "\\\"")
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> ConfigTextError {
        ConfigTextError {
            line: self.line,
            message: message.into(),
        }
    }

    fn next(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.next() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_blanks(&mut self) {
        while matches!(self.chars.peek(), Some(' ' | '\t' | '\r')) {
            self.next();
        }
    }

    fn parse(mut self) -> Result<ConfigText, ConfigTextError> {
        let mut doc = ConfigText::new();
        loop {
            while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
                self.next();
            }
            match self.chars.peek().copied() {
                None => break,
                Some('#' | ';') => self.skip_line(),
                Some('[') => {
                    let section = self.parse_header()?;
                    doc.sections.push(section);
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    let (key, value) = self.parse_entry()?;
                    let section = doc
                        .sections
                        .last_mut()
                        .ok_or_else(|| self.error(format!("key '{}' outside of a section", key)))?;
                    section.values.push((key, value));
                }
                Some(c) => return Err(self.error(format!("unexpected character '{}'", c))),
            }
        }
        Ok(doc)
    }

    fn parse_header(&mut self) -> Result<Section, ConfigTextError> {
        self.next(); // '['
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                name.push(c.to_ascii_lowercase());
                self.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error("empty section name"));
        }
        self.skip_blanks();

        let mut subsection = None;
        if self.chars.peek() == Some(&'"') {
            self.next();
            let mut sub = String::new();
            loop {
                match self.next() {
                    Some('"') => break,
                    Some('\\') => match self.next() {
                        Some('\n') | None => return Err(self.error("unterminated subsection")),
                        Some(c) => sub.push(c),
                    },
                    Some('\n') | None => return Err(self.error("unterminated subsection")),
                    Some(c) => sub.push(c),
                }
            }
            subsection = Some(sub);
            self.skip_blanks();
        }

        if self.next() != Some(']') {
            return Err(self.error(format!("bad section header for '{}'", name)));
        }
        Ok(Section {
            name,
            subsection,
            values: Vec::new(),
        })
    }

    fn parse_entry(&mut self) -> Result<(String, Option<String>), ConfigTextError> {
        let mut key = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '-' {
                key.push(c.to_ascii_lowercase());
                self.next();
            } else {
                break;
            }
        }
        self.skip_blanks();

        match self.chars.peek().copied() {
            None => Ok((key, None)),
            Some('\n') => {
                self.next();
                Ok((key, None))
            }
            Some('#' | ';') => {
                self.skip_line();
                Ok((key, None))
            }
            Some('=') => {
                self.next();
                let value = self.parse_value()?;
                Ok((key, Some(value)))
            }
            Some(c) => Err(self.error(format!("expected '=' after '{}', found '{}'", key, c))),
        }
    }

    fn parse_value(&mut self) -> Result<String, ConfigTextError> {
        self.skip_blanks();
        let mut value = String::new();
        let mut blanks = String::new();
        let mut quoted = false;

        loop {
            let c = match self.next() {
                Some(c) => c,
                None if quoted => return Err(self.error("unterminated quoted value")),
                None => break,
            };
            match c {
                '\n' if quoted => return Err(self.error("newline in quoted value")),
                '\n' => break,
                '\r' => {}
                ' ' | '\t' if !quoted => blanks.push(c),
                '#' | ';' if !quoted => {
                    self.skip_line();
                    break;
                }
                '"' => {
                    value.push_str(&blanks);
                    blanks.clear();
                    quoted = !quoted;
                }
                '\\' => {
                    let escaped = match self.next() {
                        Some('\n') => continue,
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('b') => '\u{8}',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some(other) => {
                            return Err(self.error(format!("invalid escape '\\{}'", other)))
                        }
                        None => return Err(self.error("dangling escape at end of input")),
                    };
                    value.push_str(&blanks);
                    blanks.clear();
                    value.push(escaped);
                }
                c => {
                    value.push_str(&blanks);
                    blanks.clear();
                    value.push(c);
                }
            }
        }
        Ok(value)
    }
}
