//! Statement text → [`Command`]
//!
//! Grammar (keywords case-insensitive, values case-preserving):
//!
//! ```text
//! SHOW ACTIVE OPERATIONS   [FOR <session>]
//! SHOW REVOKED OPERATIONS  [FOR <session>]
//! SHOW OPERATION HISTORY   [FOR <session>]
//! SHOW HISTORY             [FOR <session>]
//! SHOW FUSION TIMELINE     [FOR <session>]
//! SHOW LINEAGE AT "<ts>"   [FOR <session>]
//! SHOW SNAPSHOTS           [FOR <session>]
//! SHOW LAST SNAPSHOT       [FOR <session>]
//! AUDIT [SESSION]          [FOR <session>]
//! AUDIT SESSION <session>
//! SNAPSHOT [LINEAGE]       [FOR <session>] [NOTE "<text>"]
//! REVOKE <hash>            [FOR <session>] [NOTE "<reason>"]
//! ```
//!
//! `OPERATIONS` may be spelled `BRAIDS`. Clauses may appear in any order.
//! Quoted values (single or double quotes) are one token, whitespace and
//! non-ASCII included. A trailing `;` is ignored.
//!
//! Parsing is pure: it never touches the ledger, so a parse error can
//! never leave a partial write behind.

use lineage_core::{ParseError, SessionId, Timestamp};

use crate::command::Command;

const FOR: &str = "FOR";
const AT: &str = "AT";
const NOTE: &str = "NOTE";
const CLAUSES: [&str; 3] = [FOR, AT, NOTE];

/// One lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text with quotes removed
    pub text: String,
    /// Whether the token was quoted (quoted text is never a keyword)
    pub quoted: bool,
}

impl Token {
    fn is(&self, keyword: &str) -> bool {
        !self.quoted && self.text.eq_ignore_ascii_case(keyword)
    }

    fn is_clause_keyword(&self) -> bool {
        CLAUSES.iter().any(|kw| self.is(kw))
    }
}

/// Split statement text into tokens.
///
/// Whitespace separates tokens outside quotes. Inside double quotes `\"`
/// and `\\` are escapes.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.char_indices().peekable();

    let flush = |current: &mut String, tokens: &mut Vec<Token>| {
        if !current.is_empty() {
            tokens.push(Token {
                text: std::mem::take(current),
                quoted: false,
            });
        }
    };

    while let Some((start, c)) = chars.next() {
        match c {
            '"' | '\'' => {
                flush(&mut current, &mut tokens);
                let quote = c;
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    if c == quote {
                        closed = true;
                        break;
                    }
                    if c == '\\' && quote == '"' {
                        if let Some(&(_, escaped)) = chars.peek() {
                            if escaped == '"' || escaped == '\\' {
                                text.push(escaped);
                                chars.next();
                                continue;
                            }
                        }
                    }
                    text.push(c);
                }
                if !closed {
                    return Err(ParseError::UnterminatedQuote(start));
                }
                tokens.push(Token { text, quoted: true });
            }
            c if c.is_whitespace() => flush(&mut current, &mut tokens),
            c => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);
    Ok(tokens)
}

/// Parse one statement.
pub fn parse(input: &str) -> Result<Command, ParseError> {
    let input = input.trim().trim_end_matches(';');
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let verb = parser.next().ok_or(ParseError::Empty)?;

    let command = if verb.is("SHOW") {
        parser.show()?
    } else if verb.is("AUDIT") {
        parser.audit()?
    } else if verb.is("SNAPSHOT") {
        parser.snapshot()?
    } else if verb.is("REVOKE") {
        parser.revoke()?
    } else {
        return Err(ParseError::UnknownVerb(verb.text));
    };
    Ok(command)
}

#[derive(Default)]
struct Clauses {
    session: Option<SessionId>,
    at: Option<String>,
    note: Option<String>,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, keyword: &str) -> bool {
        if self.peek().map_or(false, |t| t.is(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Require one of `keywords` as the next token.
    fn expect(&mut self, verb: &str, keywords: &[&str]) -> Result<(), ParseError> {
        match self.next() {
            Some(token) if keywords.iter().any(|kw| token.is(kw)) => Ok(()),
            Some(token) => Err(ParseError::UnknownSubject {
                verb: verb.to_string(),
                subject: token.text,
            }),
            None => Err(ParseError::UnknownSubject {
                verb: verb.to_string(),
                subject: String::new(),
            }),
        }
    }

    /// Value following a clause keyword.
    fn value(&mut self, clause: &'static str) -> Result<String, ParseError> {
        match self.peek() {
            Some(token) if !token.is_clause_keyword() => {}
            _ => return Err(ParseError::MissingArgument { clause }),
        }
        self.next()
            .map(|t| t.text)
            .ok_or(ParseError::MissingArgument { clause })
    }

    /// Trailing clauses, in any order, restricted to `allowed`.
    fn clauses(&mut self, allowed: &[&'static str]) -> Result<Clauses, ParseError> {
        let mut clauses = Clauses::default();
        while let Some(token) = self.next() {
            let clause = allowed
                .iter()
                .copied()
                .find(|kw| token.is(kw))
                .ok_or_else(|| ParseError::UnexpectedToken(token.text.clone()))?;
            let value = self.value(clause)?;
            let slot_taken = match clause {
                FOR => clauses.session.replace(SessionId::from(value)).is_some(),
                AT => clauses.at.replace(value).is_some(),
                _ => clauses.note.replace(value).is_some(),
            };
            if slot_taken {
                return Err(ParseError::DuplicateClause(clause));
            }
        }
        Ok(clauses)
    }

    fn show(&mut self) -> Result<Command, ParseError> {
        let subject = self.next().ok_or(ParseError::MissingArgument { clause: "SHOW" })?;

        if subject.is("LINEAGE") {
            let clauses = self.clauses(&[AT, FOR])?;
            let at = clauses.at.ok_or_else(|| ParseError::MissingClause {
                verb: "SHOW LINEAGE".to_string(),
                clause: AT,
            })?;
            return Ok(Command::LineageAt {
                session: clauses.session,
                at: Timestamp::parse(&at)?,
            });
        }

        let build: fn(Option<SessionId>) -> Command = if subject.is("ACTIVE") {
            self.expect("SHOW ACTIVE", &["OPERATIONS", "BRAIDS"])?;
            |session| Command::ActiveOperations { session }
        } else if subject.is("REVOKED") {
            self.expect("SHOW REVOKED", &["OPERATIONS", "BRAIDS"])?;
            |session| Command::RevokedOperations { session }
        } else if subject.is("OPERATION") || subject.is("BRAID") {
            self.expect("SHOW OPERATION", &["HISTORY"])?;
            |session| Command::OperationHistory { session }
        } else if subject.is("HISTORY") {
            |session| Command::OperationHistory { session }
        } else if subject.is("FUSION") {
            self.expect("SHOW FUSION", &["TIMELINE"])?;
            |session| Command::FusionTimeline { session }
        } else if subject.is("SNAPSHOTS") {
            |session| Command::Snapshots { session }
        } else if subject.is("LAST") {
            self.expect("SHOW LAST", &["SNAPSHOT"])?;
            |session| Command::LastSnapshot { session }
        } else {
            return Err(ParseError::UnknownSubject {
                verb: "SHOW".to_string(),
                subject: subject.text,
            });
        };

        let clauses = self.clauses(&[FOR])?;
        Ok(build(clauses.session))
    }

    fn audit(&mut self) -> Result<Command, ParseError> {
        let mut bare = None;
        if self.eat("SESSION") && self.peek().map_or(false, |t| !t.is_clause_keyword()) {
            bare = self.next().map(|t| SessionId::from(t.text));
        }
        let clauses = self.clauses(&[FOR])?;
        let session = match (bare, clauses.session) {
            (Some(_), Some(_)) => return Err(ParseError::DuplicateClause(FOR)),
            (bare, named) => bare.or(named),
        };
        Ok(Command::Audit { session })
    }

    fn snapshot(&mut self) -> Result<Command, ParseError> {
        self.eat("LINEAGE");
        let clauses = self.clauses(&[FOR, NOTE])?;
        Ok(Command::Snapshot {
            session: clauses.session,
            note: clauses.note,
        })
    }

    fn revoke(&mut self) -> Result<Command, ParseError> {
        let hash = self.value("REVOKE")?;
        let clauses = self.clauses(&[FOR, NOTE])?;
        Ok(Command::Revoke {
            session: clauses.session,
            hash,
            reason: clauses.note,
        })
    }
}
