#![allow(dead_code)]

use std::time::Duration;

use deposit_engine::{DepositSettings, PollSettings};

pub const ATOM: &str = "application/atom+xml";

pub fn receipt(statement_href: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<entry xmlns="http://www.w3.org/2005/Atom" xmlns:sword="http://purl.org/net/sword/terms/">
  <id>urn:uuid:bag-1</id>
  <title>Deposit receipt</title>
  <link rel="edit" href="/container/1"/>
  <link rel="http://purl.org/net/sword/terms/statement" type="application/atom+xml; type=feed" href="{statement_href}"/>
  <sword:packaging>http://purl.org/net/sword/package/BagIt</sword:packaging>
</entry>"#
    )
}

pub fn statement(term: &str) -> String {
    statement_with_links(
        term,
        &[
            "https://doi.org/10.1/xyz",
            "https://www.persistent-identifier.nl/urn:nbn:1",
        ],
    )
}

pub fn statement_with_links(term: &str, self_links: &[&str]) -> String {
    let links: String = self_links
        .iter()
        .map(|href| format!(r#"<link rel="self" href="{href}"/>"#))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>urn:uuid:statement-1</id>
  <title type="text">Deposit statement</title>
  <category term="{term}" scheme="http://purl.org/net/sword/terms/state" label="State">The deposit is {term}</category>
  <entry>
    <id>urn:uuid:bag-1</id>
    {links}
  </entry>
</feed>"#
    )
}

pub fn fast_settings() -> DepositSettings {
    DepositSettings {
        poll: PollSettings {
            interval: Duration::from_millis(5),
            max_attempts: Some(10),
        },
        ..DepositSettings::default()
    }
}
