pub mod codec;

use chrono::{DateTime, Utc};

/// RFC 822 layout with a two-digit year: `02 Jan 06 15:04 UTC`.
pub const PUB_DATE_FORMAT: &str = "%d %b %y %H:%M %Z";

pub const DEFAULT_TITLE: &str = "rss-keeper";
pub const DEFAULT_LINK: &str = "https://github.com/rss-keeper/rss-keeper";
pub const DEFAULT_DESCRIPTION: &str = "This feed is generated by rss-keeper";

/// Channel metadata plus the ordered list of items, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub title: String,
    pub link: String,
    pub description: String,
    pub author: String,
    pub pub_date: String,
}

impl Feed {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Feed {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE, DEFAULT_LINK, DEFAULT_DESCRIPTION)
    }
}

impl Item {
    /// Build an item whose link is `host + "/" + relative_path`.
    ///
    /// Neither part is validated or normalised; a trailing slash on `host`
    /// ends up doubled in the link.
    pub fn new(
        host: &str,
        author: &str,
        title: &str,
        description: &str,
        relative_path: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.to_string(),
            link: format!("{}/{}", host, relative_path),
            description: description.to_string(),
            author: author.to_string(),
            pub_date: format_pub_date(created_at),
        }
    }
}

pub fn format_pub_date(created_at: DateTime<Utc>) -> String {
    created_at.format(PUB_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_pub_date_uses_rfc822_layout() {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 42).unwrap();
        assert_eq!(format_pub_date(created), "05 Mar 24 09:07 UTC");
    }

    #[test]
    fn test_item_link_is_literal_concatenation() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let item = Item::new("https://example.com", "alice", "Hello", "desc", "p/1.png", created);
        assert_eq!(item.link, "https://example.com/p/1.png");
        assert_eq!(item.author, "alice");

        let item = Item::new("https://example.com/", "alice", "Hello", "desc", "p/1.png", created);
        assert_eq!(item.link, "https://example.com//p/1.png");
    }

    #[test]
    fn test_default_feed_has_no_items() {
        let feed = Feed::default();
        assert_eq!(feed.title, DEFAULT_TITLE);
        assert_eq!(feed.link, DEFAULT_LINK);
        assert_eq!(feed.description, DEFAULT_DESCRIPTION);
        assert!(feed.is_empty());
    }
}
