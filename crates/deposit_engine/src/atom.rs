use deposit_core::{
    AtomCategory, AtomDocument, AtomEntry, AtomFeed, AtomLink, ProtocolViolation,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtomParseError {
    #[error("malformed xml: {0}")]
    Xml(String),
    #[error("document has no root element")]
    Empty,
    #[error("unsupported root element <{0}>")]
    UnsupportedRoot(String),
    #[error("document ended inside <{0}>")]
    Unterminated(String),
}

/// A parsed deposit receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositReceipt {
    /// Entry id of the receipt (Bag-ID equivalent).
    pub bag_id: Option<String>,
    /// Statement resource (Stat-IRI), resolved against the receipt location.
    pub statement_uri: Url,
    pub entry: AtomEntry,
}

/// Parses an Atom feed or entry. Elements are matched by local name, so any
/// namespace prefix is accepted.
pub fn parse_atom(text: &str) -> Result<AtomDocument, AtomParseError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut builder = DocumentBuilder::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => builder.open(&element, false)?,
            Ok(Event::Empty(element)) => builder.open(&element, true)?,
            Ok(Event::End(_)) => builder.close()?,
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|err| AtomParseError::Xml(err.to_string()))?;
                builder.text(&text);
            }
            Ok(Event::CData(data)) => builder.text(&String::from_utf8_lossy(&data)),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(AtomParseError::Xml(err.to_string())),
        }
    }

    builder.finish()
}

/// Parses a statement feed.
pub fn parse_statement(body: &str) -> Result<AtomFeed, ProtocolViolation> {
    let document = parse_atom(body).map_err(|err| unparsable("statement", err))?;
    match document {
        AtomDocument::Feed(feed) => Ok(feed),
        other => Err(ProtocolViolation::UnexpectedRoot {
            expected: "feed",
            found: other.root_name().to_string(),
        }),
    }
}

/// Parses a deposit receipt and locates its single statement link.
pub fn parse_receipt(body: &str, location: &Url) -> Result<DepositReceipt, ProtocolViolation> {
    let document = parse_atom(body).map_err(|err| unparsable("deposit receipt", err))?;
    let entry = match document {
        AtomDocument::Entry(entry) => entry,
        other => {
            return Err(ProtocolViolation::UnexpectedRoot {
                expected: "entry",
                found: other.root_name().to_string(),
            })
        }
    };

    let links: Vec<&AtomLink> = entry.statement_links().collect();
    let href = match links.as_slice() {
        [] => return Err(ProtocolViolation::MissingStatementLink),
        [only] => only.href.trim(),
        many => {
            return Err(ProtocolViolation::DuplicateStatementLink { count: many.len() })
        }
    };
    let statement_uri =
        location
            .join(href)
            .map_err(|err| ProtocolViolation::InvalidStatementUri {
                href: href.to_string(),
                message: err.to_string(),
            })?;

    Ok(DepositReceipt {
        bag_id: entry.id.clone(),
        statement_uri,
        entry,
    })
}

fn unparsable(document: &'static str, err: AtomParseError) -> ProtocolViolation {
    ProtocolViolation::Unparsable {
        document,
        message: err.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    Feed,
    Entry,
}

#[derive(Default)]
struct DocumentBuilder {
    stack: Vec<String>,
    root: Option<Root>,
    feed: AtomFeed,
    entry: Option<AtomEntry>,
    category: Option<AtomCategory>,
    text: String,
}

impl DocumentBuilder {
    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> Result<(), AtomParseError> {
        let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
        let parent = self.stack.last().cloned();

        match (parent.as_deref(), name.as_str()) {
            (None, _) if self.root.is_some() => {
                return Err(AtomParseError::Xml(format!(
                    "second root element <{name}>"
                )))
            }
            (None, "feed") => self.root = Some(Root::Feed),
            (None, "entry") => {
                self.root = Some(Root::Entry);
                self.entry = Some(AtomEntry::default());
            }
            (None, other) => return Err(AtomParseError::UnsupportedRoot(other.to_string())),
            (Some("feed"), "entry") => self.entry = Some(AtomEntry::default()),
            (Some(owner), "link") => {
                let link = read_link(element)?;
                match owner {
                    "entry" => self.current_entry().links.push(link),
                    "feed" => self.feed.links.push(link),
                    _ => {}
                }
            }
            (Some(_), "category") => self.category = Some(read_category(element)?),
            (Some(_), "id" | "title") => self.text.clear(),
            _ => {}
        }

        self.stack.push(name);
        if empty {
            self.close()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), AtomParseError> {
        let name = self
            .stack
            .pop()
            .ok_or_else(|| AtomParseError::Xml("unbalanced end tag".into()))?;
        let parent = self.stack.last().cloned();

        match (parent.as_deref(), name.as_str()) {
            (Some("feed"), "entry") => {
                if let Some(entry) = self.entry.take() {
                    self.feed.entries.push(entry);
                }
            }
            (Some(owner), "category") => {
                if let Some(category) = self.category.take() {
                    match owner {
                        "entry" => self.current_entry().categories.push(category),
                        "feed" => self.feed.categories.push(category),
                        _ => {}
                    }
                }
            }
            (Some(owner), field @ ("id" | "title")) => {
                let value = self.text.trim().to_string();
                self.text.clear();
                self.set_text_field(owner, field, value);
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(category) = self.category.as_mut() {
            category.text.push_str(text);
            return;
        }
        if matches!(self.stack.last().map(String::as_str), Some("id" | "title")) {
            self.text.push_str(text);
        }
    }

    fn set_text_field(&mut self, owner: &str, field: &str, value: String) {
        let (id, title) = match owner {
            "entry" => {
                let entry = self.current_entry();
                (&mut entry.id, &mut entry.title)
            }
            "feed" => (&mut self.feed.id, &mut self.feed.title),
            _ => return,
        };
        match field {
            "id" => *id = Some(value),
            _ => *title = Some(value),
        }
    }

    fn current_entry(&mut self) -> &mut AtomEntry {
        self.entry.get_or_insert_with(AtomEntry::default)
    }

    fn finish(mut self) -> Result<AtomDocument, AtomParseError> {
        if let Some(open) = self.stack.pop() {
            return Err(AtomParseError::Unterminated(open));
        }
        match self.root {
            None => Err(AtomParseError::Empty),
            Some(Root::Feed) => Ok(AtomDocument::Feed(self.feed)),
            Some(Root::Entry) => Ok(AtomDocument::Entry(self.entry.unwrap_or_default())),
        }
    }
}

fn read_attributes(element: &BytesStart<'_>) -> Result<Vec<(String, String)>, AtomParseError> {
    element
        .attributes()
        .map(|attribute| {
            let attribute = attribute.map_err(|err| AtomParseError::Xml(err.to_string()))?;
            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|err| AtomParseError::Xml(err.to_string()))?
                .into_owned();
            Ok((key, value))
        })
        .collect()
}

fn read_link(element: &BytesStart<'_>) -> Result<AtomLink, AtomParseError> {
    let mut link = AtomLink {
        rel: "alternate".to_string(),
        ..AtomLink::default()
    };
    for (key, value) in read_attributes(element)? {
        match key.as_str() {
            "rel" => link.rel = value,
            "href" => link.href = value,
            "type" => link.media_type = Some(value),
            _ => {}
        }
    }
    Ok(link)
}

fn read_category(element: &BytesStart<'_>) -> Result<AtomCategory, AtomParseError> {
    let mut category = AtomCategory::default();
    for (key, value) in read_attributes(element)? {
        match key.as_str() {
            "scheme" => category.scheme = Some(value),
            "term" => category.term = value,
            "label" => category.label = Some(value),
            _ => {}
        }
    }
    Ok(category)
}
