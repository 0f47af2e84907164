use url::Url;

use crate::AtomEntry;

pub const DOI_AUTHORITY_HOST: &str = "doi.org";
pub const NBN_AUTHORITY_HOST: &str = "www.persistent-identifier.nl";

const AUTHORITIES: &[(&str, IdentifierKind)] = &[
    (DOI_AUTHORITY_HOST, IdentifierKind::Doi),
    (NBN_AUTHORITY_HOST, IdentifierKind::Nbn),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    Doi,
    Nbn,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub kind: IdentifierKind,
    pub uri: String,
}

/// Identifiers found on one entry, split by authority, each in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentifierSet {
    pub dois: Vec<Identifier>,
    pub nbns: Vec<Identifier>,
}

impl IdentifierSet {
    pub fn single_doi(&self) -> Option<&Identifier> {
        match self.dois.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn single_nbn(&self) -> Option<&Identifier> {
        match self.nbns.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

/// Exact, case-insensitive host match against the authority table.
pub fn classify_host(host: &str) -> IdentifierKind {
    AUTHORITIES
        .iter()
        .find(|(authority, _)| authority.eq_ignore_ascii_case(host))
        .map(|(_, kind)| *kind)
        .unwrap_or(IdentifierKind::Other)
}

/// Collects DOI and NBN identifiers from the entry's `self` links.
///
/// Hrefs that are not absolute URIs are skipped.
pub fn extract_identifiers(entry: &AtomEntry) -> IdentifierSet {
    let mut set = IdentifierSet::default();
    for link in entry.self_links() {
        let Ok(url) = Url::parse(link.href.trim()) else {
            continue;
        };
        let Some(host) = url.host_str() else {
            continue;
        };
        let kind = classify_host(host);
        let identifier = Identifier {
            kind,
            uri: url.to_string(),
        };
        match kind {
            IdentifierKind::Doi => set.dois.push(identifier),
            IdentifierKind::Nbn => set.nbns.push(identifier),
            IdentifierKind::Other => {}
        }
    }
    set
}
