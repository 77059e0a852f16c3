use super::error::SelectionMapParseError;
use super::{
    Path, PathSegment, PathSelection, SelectedObjectField, SelectedObjectValue, SelectedValue,
    SelectedValueEntry, SelectionMap,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Name(String),
    Dot,
    Pipe,
    Colon,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    LeftAngle,
    RightAngle,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Name(name) => format!("name \"{}\"", name),
            Token::Dot => "\".\"".to_string(),
            Token::Pipe => "\"|\"".to_string(),
            Token::Colon => "\":\"".to_string(),
            Token::LeftBrace => "\"{\"".to_string(),
            Token::RightBrace => "\"}\"".to_string(),
            Token::LeftBracket => "\"[\"".to_string(),
            Token::RightBracket => "\"]\"".to_string(),
            Token::LeftAngle => "\"<\"".to_string(),
            Token::RightAngle => "\">\"".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, SelectionMapParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((offset, character)) = chars.next() {
        let token = match character {
            c if c.is_whitespace() || c == ',' => continue,
            '.' => Token::Dot,
            '|' => Token::Pipe,
            ':' => Token::Colon,
            '{' => Token::LeftBrace,
            '}' => Token::RightBrace,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            '<' => Token::LeftAngle,
            '>' => Token::RightAngle,
            c if c == '_' || c.is_ascii_alphabetic() => {
                let mut name = String::from(c);
                while let Some((_, next)) = chars.peek() {
                    if *next == '_' || next.is_ascii_alphanumeric() {
                        name.push(*next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                Token::Name(name)
            }
            c => {
                return Err(SelectionMapParseError::UnexpectedCharacter {
                    character: c,
                    offset,
                })
            }
        };
        tokens.push((token, offset));
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(token, _)| token)
    }

    fn peek_second(&self) -> Option<&Token> {
        self.tokens.get(self.position + 1).map(|(token, _)| token)
    }

    fn unexpected(&self, expected: &'static str) -> SelectionMapParseError {
        match self.tokens.get(self.position) {
            Some((token, offset)) => SelectionMapParseError::UnexpectedToken {
                expected,
                found: token.describe(),
                offset: *offset,
            },
            None => SelectionMapParseError::UnexpectedEnd { expected },
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), SelectionMapParseError> {
        if self.peek() == Some(&token) {
            self.position += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn name(&mut self) -> Result<String, SelectionMapParseError> {
        match self.peek() {
            Some(Token::Name(name)) => {
                let name = name.clone();
                self.position += 1;
                Ok(name)
            }
            _ => Err(self.unexpected("a name")),
        }
    }

    fn type_condition(&mut self) -> Result<Option<String>, SelectionMapParseError> {
        if !self.eat(&Token::LeftAngle) {
            return Ok(None);
        }
        let name = self.name()?;
        self.expect(Token::RightAngle, "\">\"")?;
        Ok(Some(name))
    }

    fn selected_value(&mut self) -> Result<SelectedValue, SelectionMapParseError> {
        let mut entries = vec![self.selected_value_entry()?];
        while self.eat(&Token::Pipe) {
            entries.push(self.selected_value_entry()?);
        }
        Ok(SelectedValue { entries })
    }

    fn selected_value_entry(&mut self) -> Result<SelectedValueEntry, SelectionMapParseError> {
        match self.peek() {
            Some(Token::LeftBrace) => Ok(SelectedValueEntry::Object(self.selected_object()?)),
            Some(Token::Name(_)) | Some(Token::LeftAngle) => {
                let path = self.path()?;
                let selection = match (self.peek(), self.peek_second()) {
                    (Some(Token::Dot), Some(Token::LeftBrace)) => {
                        self.position += 1;
                        Some(PathSelection::Object(self.selected_object()?))
                    }
                    (Some(Token::LeftBracket), _) => {
                        self.position += 1;
                        let inner = self.selected_value()?;
                        self.expect(Token::RightBracket, "\"]\"")?;
                        Some(PathSelection::List(Box::new(inner)))
                    }
                    _ => None,
                };
                Ok(SelectedValueEntry::Path { path, selection })
            }
            _ => Err(self.unexpected("a path or an object selection")),
        }
    }

    fn path(&mut self) -> Result<Path, SelectionMapParseError> {
        let type_condition = self.type_condition()?;
        if type_condition.is_some() {
            self.expect(Token::Dot, "\".\" after a type condition")?;
        }
        Ok(Path {
            type_condition,
            segment: self.path_segment()?,
        })
    }

    fn path_segment(&mut self) -> Result<PathSegment, SelectionMapParseError> {
        let field = self.name()?;
        let type_condition = self.type_condition()?;
        let next = match (self.peek(), self.peek_second()) {
            (Some(Token::Dot), Some(Token::Name(_))) => {
                self.position += 1;
                Some(Box::new(self.path_segment()?))
            }
            _ => None,
        };
        Ok(PathSegment {
            field,
            type_condition,
            next,
        })
    }

    fn selected_object(&mut self) -> Result<SelectedObjectValue, SelectionMapParseError> {
        self.expect(Token::LeftBrace, "\"{\"")?;
        let mut fields = Vec::new();
        loop {
            if self.eat(&Token::RightBrace) {
                break;
            }
            let name = self.name()?;
            let value = if self.eat(&Token::Colon) {
                Some(self.selected_value()?)
            } else {
                None
            };
            fields.push(SelectedObjectField { name, value });
        }
        if fields.is_empty() {
            return Err(self.unexpected_previous("at least one object field"));
        }
        Ok(SelectedObjectValue { fields })
    }

    fn unexpected_previous(&self, expected: &'static str) -> SelectionMapParseError {
        let (token, offset) = &self.tokens[self.position - 1];
        SelectionMapParseError::UnexpectedToken {
            expected,
            found: token.describe(),
            offset: *offset,
        }
    }
}

/// Parses a selection map. Parsing is all-or-nothing: any syntax error rejects the whole map.
pub fn parse_selection_map(input: &str) -> Result<SelectionMap, SelectionMapParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(SelectionMapParseError::Empty);
    }

    let mut parser = Parser {
        tokens,
        position: 0,
    };
    let value = parser.selected_value()?;
    if parser.peek().is_some() {
        return Err(parser.unexpected("end of input"));
    }

    Ok(SelectionMap { value })
}
