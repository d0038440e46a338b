use std::str::Chars;

use crate::document::Document;
use crate::error::{ParseError, Position};

/// Where the machine is within the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    Comment,
    /// Just after `[`, nothing accepted yet.
    SectionStart,
    SectionName,
    /// After `]`, only the newline may follow.
    SectionEnd,
    Key,
    EqualSign,
    SpaceBeforeValue,
    Value,
}

/// Side effect attached to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Skip,
    Push,
    CommitSection,
    CommitKey,
    CommitValue,
}

/// Represents an on-going parse.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    chars: Chars<'a>,
    state: State,
    buf: String,
    key: String,
    /// `(section, record)` index of the record receiving key lines.
    current: Option<(usize, usize)>,
    document: Document,
    at: Position,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
            state: State::Init,
            buf: String::with_capacity(512),
            key: String::new(),
            current: None,
            document: Document::default(),
            at: Position { line: 1, column: 1 },
        }
    }
}

impl Parser<'_> {
    /// Consume the whole input, one character at a time.
    pub fn into_document(mut self) -> Result<Document, ParseError> {
        while let Some(c) = self.chars.next() {
            let (next, action) = transition(self.state, c, self.current.is_some(), self.at)?;
            self.apply(action, c);
            self.state = next;

            if c == '\n' {
                self.at.line += 1;
                self.at.column = 1;
            } else {
                self.at.column += 1;
            }
        }

        if self.state != State::Init {
            return Err(ParseError::UnexpectedEof { at: self.at });
        }

        tracing::debug!(
            sections = self.document.sections().len(),
            "parsed document"
        );

        Ok(self.document)
    }

    fn apply(&mut self, action: Action, c: char) {
        match action {
            Action::Skip => {}
            Action::Push => self.buf.push(c),
            Action::CommitSection => {
                let name = std::mem::take(&mut self.buf);
                tracing::trace!(section = %name, line = self.at.line, "open record");
                self.current = Some(self.document.open_record(name));
            }
            Action::CommitKey => {
                self.key.clear();
                self.key.push_str(&self.buf);
                self.buf.clear();
            }
            Action::CommitValue => {
                let value = std::mem::take(&mut self.buf);
                tracing::trace!(key = %self.key, value = %value, "commit value");
                // `Key` is only entered while a record is open.
                if let Some(current) = self.current {
                    self.document.record_mut(current).push(&self.key, value);
                }
            }
        }
    }
}

/// The grammar: next state and side effect for `c` read in `state`.
fn transition(
    state: State,
    c: char,
    section_open: bool,
    at: Position,
) -> Result<(State, Action), ParseError> {
    let next = match state {
        State::Init => match c {
            '#' => (State::Comment, Action::Skip),
            '[' => (State::SectionStart, Action::Skip),
            '\n' => (State::Init, Action::Skip),
            c if is_var_start(c) => {
                if !section_open {
                    return Err(ParseError::RootSectionExpected { at });
                }
                (State::Key, Action::Push)
            }
            c if c.is_whitespace() => return Err(ParseError::LeadingSpace { at }),
            found => return Err(ParseError::InvalidChar { at, found }),
        },
        State::Comment => match c {
            '\n' => (State::Init, Action::Skip),
            _ => (State::Comment, Action::Skip),
        },
        State::SectionStart => match c {
            c if is_var_start(c) => (State::SectionName, Action::Push),
            found => return Err(ParseError::InvalidSection { at, found }),
        },
        State::SectionName => match c {
            ']' => (State::SectionEnd, Action::Skip),
            c if is_var_continue(c) => (State::SectionName, Action::Push),
            found => return Err(ParseError::InvalidSection { at, found }),
        },
        State::SectionEnd => match c {
            '\n' => (State::Init, Action::CommitSection),
            found => return Err(ParseError::ExpectedNewLine { at, found }),
        },
        State::Key => match c {
            ' ' => (State::EqualSign, Action::CommitKey),
            c if is_var_continue(c) => (State::Key, Action::Push),
            found => return Err(ParseError::InvalidKey { at, found }),
        },
        State::EqualSign => match c {
            '=' => (State::SpaceBeforeValue, Action::Skip),
            found => return Err(ParseError::ExpectedEqual { at, found }),
        },
        State::SpaceBeforeValue => match c {
            ' ' => (State::Value, Action::Skip),
            found => return Err(ParseError::ExpectedSpace { at, found }),
        },
        State::Value => match c {
            '\n' => (State::Init, Action::CommitValue),
            _ => (State::Value, Action::Push),
        },
    };

    Ok(next)
}

fn is_var_start(c: char) -> bool {
    c == '_' || c.is_ascii_lowercase()
}

fn is_var_continue(c: char) -> bool {
    is_var_start(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    const AT: Position = Position { line: 1, column: 1 };

    #[test]
    fn key_requires_open_section() {
        assert_eq!(
            transition(State::Init, 'k', false, AT),
            Err(ParseError::RootSectionExpected { at: AT })
        );
        assert_eq!(
            transition(State::Init, 'k', true, AT),
            Ok((State::Key, Action::Push))
        );
    }

    #[test]
    fn digits_only_continue_names() {
        assert!(!is_var_start('1'));
        assert!(is_var_continue('1'));
        assert!(!is_var_start('A'));
        assert!(!is_var_continue('-'));
        assert!(!is_var_start('é'));
    }

    #[test]
    fn value_accepts_anything_but_newline() {
        for c in [' ', '=', '[', '#', '🦍', '\t'] {
            assert_eq!(
                transition(State::Value, c, true, AT),
                Ok((State::Value, Action::Push))
            );
        }
        assert_eq!(
            transition(State::Value, '\n', true, AT),
            Ok((State::Init, Action::CommitValue))
        );
    }

    #[test]
    fn empty_section_name_is_rejected() {
        assert_eq!(
            transition(State::SectionStart, ']', false, AT),
            Err(ParseError::InvalidSection { at: AT, found: ']' })
        );
    }

    #[test]
    fn tracks_positions() {
        let err = Parser::new("[html]\nkey=value\n")
            .into_document()
            .expect_err("missing space before equal sign");

        assert_eq!(
            err,
            ParseError::InvalidKey {
                at: Position { line: 2, column: 4 },
                found: '=',
            }
        );
    }

    #[test]
    fn eof_position_points_past_input() {
        let err = Parser::new("[html]\nkey = value")
            .into_document()
            .expect_err("missing trailing newline");

        assert_eq!(
            err,
            ParseError::UnexpectedEof {
                at: Position { line: 2, column: 12 },
            }
        );
    }

    #[test]
    fn values_keep_spaces_and_equal_signs() {
        let doc = Parser::new("[rune]\nkey = [section]\nexpr = a = b \n")
            .into_document()
            .expect("failed to parse hardcoded input");

        let record = &doc.records("rune")[0];
        assert_eq!(record.values("key"), ["[section]"]);
        assert_eq!(record.values("expr"), ["a = b "]);
    }

    #[test]
    fn empty_value_is_kept() {
        let doc = Parser::new("[s]\nkey = \n")
            .into_document()
            .expect("failed to parse hardcoded input");

        assert_eq!(doc.records("s")[0].values("key"), [""]);
    }
}
