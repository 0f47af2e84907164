/// Relation of the link pointing from a deposit receipt to its statement (Stat-IRI).
pub const REL_STATEMENT: &str = "http://purl.org/net/sword/terms/statement";

/// Category scheme carrying the deposit state in a statement feed.
pub const SCHEME_STATE: &str = "http://purl.org/net/sword/terms/state";

pub const REL_SELF: &str = "self";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AtomLink {
    /// Link relation; `alternate` when the attribute is absent.
    pub rel: String,
    pub href: String,
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AtomCategory {
    pub scheme: Option<String>,
    pub term: String,
    pub label: Option<String>,
    /// Text content of the element. Statement feeds put the state description here.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AtomEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub links: Vec<AtomLink>,
    pub categories: Vec<AtomCategory>,
}

impl AtomEntry {
    /// Links with the given relation, in document order.
    pub fn links_with_rel<'a>(&'a self, rel: &'a str) -> impl Iterator<Item = &'a AtomLink> + 'a {
        self.links.iter().filter(move |link| link.rel == rel)
    }

    pub fn self_links(&self) -> impl Iterator<Item = &AtomLink> + '_ {
        self.links_with_rel(REL_SELF)
    }

    pub fn statement_links(&self) -> impl Iterator<Item = &AtomLink> + '_ {
        self.links_with_rel(REL_STATEMENT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AtomFeed {
    pub id: Option<String>,
    pub title: Option<String>,
    pub links: Vec<AtomLink>,
    /// Feed-level categories only; entry categories stay on their entries.
    pub categories: Vec<AtomCategory>,
    pub entries: Vec<AtomEntry>,
}

impl AtomFeed {
    pub fn categories_with_scheme<'a>(
        &'a self,
        scheme: &'a str,
    ) -> impl Iterator<Item = &'a AtomCategory> + 'a {
        self.categories
            .iter()
            .filter(move |category| category.scheme.as_deref() == Some(scheme))
    }

    pub fn state_categories(&self) -> Vec<&AtomCategory> {
        self.categories_with_scheme(SCHEME_STATE).collect()
    }
}

/// A parsed Atom document: a statement feed or a single entry such as a deposit receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomDocument {
    Feed(AtomFeed),
    Entry(AtomEntry),
}

impl AtomDocument {
    pub fn into_feed(self) -> Option<AtomFeed> {
        match self {
            AtomDocument::Feed(feed) => Some(feed),
            AtomDocument::Entry(_) => None,
        }
    }

    pub fn into_entry(self) -> Option<AtomEntry> {
        match self {
            AtomDocument::Entry(entry) => Some(entry),
            AtomDocument::Feed(_) => None,
        }
    }

    pub fn root_name(&self) -> &'static str {
        match self {
            AtomDocument::Feed(_) => "feed",
            AtomDocument::Entry(_) => "entry",
        }
    }
}
