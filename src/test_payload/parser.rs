//! Test payload parser implementation.

use super::TestPayload;

pub fn parse_payload(text: &str) -> Result<TestPayload, String> {
    let parser = Parser::new(text);
    parser.parse()
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
    payload: TestPayload,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
            payload: TestPayload::new(),
        }
    }

    fn parse(mut self) -> Result<TestPayload, String> {
        self.skip_whitespace();

        while !self.is_eof() {
            self.parse_op().map_err(|e| format!("line {}: {}", self.line, e))?;
            self.skip_whitespace();
        }

        Ok(self.payload)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            if c == '\n' {
                self.line += 1;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Skip whitespace, newlines and `;` comments.
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if c == ';' {
                while let Some(c) = self.current_char() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip spaces and tabs, staying on the current line.
    fn skip_inline_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if c == ' ' || c == '\t' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn parse_identifier(&mut self) -> Result<&'a str, String> {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                self.advance();
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(format!(
                "expected identifier, found {:?}",
                self.current_char().unwrap_or('\0')
            ));
        }
        let text = self.text;
        Ok(&text[start..self.pos])
    }

    fn expect_char(&mut self, expected: char) -> Result<(), String> {
        match self.current_char() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            other => Err(format!("expected '{}', found {:?}", expected, other)),
        }
    }

    /// `%result = op.name` or `op.name`, ending the line.
    fn parse_op(&mut self) -> Result<(), String> {
        let mut result = None;
        if self.current_char() == Some('%') {
            self.advance();
            let name = self.parse_identifier()?;
            if self.payload.find(name).is_some() {
                return Err(format!("redefinition of %{}", name));
            }
            result = Some(name);
            self.skip_inline_whitespace();
            self.expect_char('=')?;
            self.skip_inline_whitespace();
        }

        let op_name = self.parse_identifier()?;
        self.skip_inline_whitespace();
        match self.current_char() {
            None | Some('\n') | Some(';') | Some('\r') => {}
            Some(c) => return Err(format!("unexpected {:?} after {}", c, op_name)),
        }

        self.payload.push_op(result, op_name);
        Ok(())
    }
}
