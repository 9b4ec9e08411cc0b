//! Recursive-descent parser for the XML-RPC document subset.
//!
//! Supported: elements (with attributes, which are skipped), character
//! data with named and numeric entity references, self-closing tags, XML
//! declarations / processing instructions, and comments. Not supported:
//! DOCTYPE, CDATA sections, namespaces. GBXRemote peers emit none of those.

use crate::error::{Result, XmlError};
use crate::node::XmlNode;

pub(crate) fn parse_document(input: &str) -> Result<XmlNode> {
    let mut parser = Parser { src: input, pos: 0 };
    parser.skip_misc()?;
    if parser.rest().is_empty() {
        return Err(XmlError::UnexpectedEof);
    }
    let root = parser.parse_element()?;
    parser.skip_misc()?;
    if !parser.rest().is_empty() {
        return Err(XmlError::TrailingContent);
    }
    Ok(root)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Result<char> {
        let ch = self.peek().ok_or(XmlError::UnexpectedEof)?;
        self.pos += ch.len_utf8();
        Ok(ch)
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char) -> Result<()> {
        match self.peek() {
            Some(found) if found == ch => {
                self.pos += ch.len_utf8();
                Ok(())
            }
            Some(_) => Err(XmlError::Unexpected(self.pos)),
            None => Err(XmlError::UnexpectedEof),
        }
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    /// Skip whitespace, XML declarations / processing instructions, and
    /// comments. Used before the root element and after it closes.
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            if self.rest().starts_with("<?") {
                self.skip_until("?>")?;
            } else if self.rest().starts_with("<!--") {
                self.skip_until("-->")?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_until(&mut self, terminator: &str) -> Result<()> {
        match self.rest().find(terminator) {
            Some(offset) => {
                self.pos += offset + terminator.len();
                Ok(())
            }
            None => Err(XmlError::UnexpectedEof),
        }
    }

    fn parse_element(&mut self) -> Result<XmlNode> {
        self.expect('<')?;
        let name = self.parse_name()?;
        let self_closing = self.skip_attributes()?;
        if self_closing {
            return Ok(XmlNode::from_parts(name, String::new(), Vec::new()));
        }

        let mut text = String::new();
        let mut children = Vec::new();

        loop {
            if self.rest().is_empty() {
                return Err(XmlError::UnexpectedEof);
            }
            if self.eat("</") {
                let close = self.parse_name()?;
                self.skip_whitespace();
                self.expect('>')?;
                if close != name {
                    return Err(XmlError::MismatchedTag {
                        expected: name,
                        got: close,
                    });
                }
                break;
            }
            if self.rest().starts_with("<!--") {
                self.skip_until("-->")?;
                continue;
            }
            if self.peek() == Some('<') {
                children.push(self.parse_element()?);
            } else {
                self.parse_text_run(&mut text)?;
            }
        }

        if !children.is_empty() {
            // Structural whitespace between child elements carries no data.
            if !text.trim().is_empty() {
                return Err(XmlError::MixedContent(name));
            }
            text.clear();
        }

        Ok(XmlNode::from_parts(name, text, children))
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | ':' | '_' | '-') {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(XmlError::Unexpected(start));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    /// Skip attributes up to the closing `>` of a start tag.
    ///
    /// Returns true if the tag was self-closing.
    fn skip_attributes(&mut self) -> Result<bool> {
        loop {
            self.skip_whitespace();
            if self.eat("/>") {
                return Ok(true);
            }
            if self.eat(">") {
                return Ok(false);
            }
            self.parse_name()?;
            self.skip_whitespace();
            self.expect('=')?;
            self.skip_whitespace();
            let quote = self.bump()?;
            if quote != '"' && quote != '\'' {
                return Err(XmlError::Unexpected(self.pos));
            }
            match self.rest().find(quote) {
                Some(offset) => self.pos += offset + 1,
                None => return Err(XmlError::UnexpectedEof),
            }
        }
    }

    /// Consume character data up to the next `<`, resolving entities.
    fn parse_text_run(&mut self, text: &mut String) -> Result<()> {
        while let Some(ch) = self.peek() {
            match ch {
                '<' => return Ok(()),
                '&' => {
                    self.pos += 1;
                    text.push(self.parse_entity()?);
                }
                other => {
                    self.pos += other.len_utf8();
                    text.push(other);
                }
            }
        }
        Ok(())
    }

    fn parse_entity(&mut self) -> Result<char> {
        let rest = self.rest();
        let end = rest.find(';').ok_or(XmlError::UnexpectedEof)?;
        let entity = &rest[..end];
        self.pos += end + 1;

        let resolved = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
                    .ok_or_else(|| XmlError::UnknownEntity(entity.to_string()))?
            }
        };
        Ok(resolved)
    }
}
