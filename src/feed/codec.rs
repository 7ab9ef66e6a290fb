use std::io::{BufRead, Write};

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use rss::Channel;
use thiserror::Error;

use crate::feed::{Feed, Item};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{0}")]
    Rss(#[from] rss::Error),

    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed feed document: {0}")]
    Malformed(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Encode/decode capability for the persisted and served feed document.
pub trait FeedCodec: Send + Sync {
    fn encode(&self, feed: &Feed, writer: &mut dyn Write) -> Result<(), CodecError>;

    fn decode(&self, reader: &mut dyn BufRead) -> Result<Feed, CodecError>;

    /// Short format name used in log lines.
    fn name(&self) -> &'static str;
}

/// RSS 2.0 codec.
///
/// Documents are written by the `rss` crate. Reading goes through a
/// quick-xml event reader with text trimming off, so field values come back
/// exactly as they were written, surrounding whitespace included.
#[derive(Debug, Clone, Default)]
pub struct RssCodec {
    indent: usize,
}

impl RssCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-print with `indent` spaces per level. Zero writes compact XML.
    pub fn with_indent(indent: usize) -> Self {
        Self { indent }
    }
}

impl FeedCodec for RssCodec {
    fn encode(&self, feed: &Feed, writer: &mut dyn Write) -> Result<(), CodecError> {
        let channel = Channel::from(feed);
        if self.indent > 0 {
            channel.pretty_write_to(&mut *writer, b' ', self.indent)?;
        } else {
            channel.write_to(&mut *writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn decode(&self, reader: &mut dyn BufRead) -> Result<Feed, CodecError> {
        let mut xml = Reader::from_reader(reader);
        xml.config_mut().trim_text(false);

        let mut decoder = ChannelDecoder::default();
        let mut buf = Vec::new();
        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(e) => decoder.start(e.local_name().as_ref()),
                Event::Empty(e) => {
                    decoder.start(e.local_name().as_ref());
                    decoder.end();
                }
                Event::End(_) => decoder.end(),
                Event::Text(e) => {
                    decoder.text.push_str(&e.decode().map_err(quick_xml::Error::from)?)
                }
                Event::CData(e) => {
                    decoder.text.push_str(&e.decode().map_err(quick_xml::Error::from)?)
                }
                Event::GeneralRef(e) => {
                    if let Some(ch) = e.resolve_char_ref()? {
                        decoder.text.push(ch);
                    } else {
                        let name = e.decode().map_err(quick_xml::Error::from)?;
                        let value = resolve_predefined_entity(&name).ok_or_else(|| {
                            CodecError::Malformed(format!("unknown entity &{};", name))
                        })?;
                        decoder.text.push_str(value);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        decoder.finish()
    }

    fn name(&self) -> &'static str {
        "rss"
    }
}

/// Collects `<rss><channel>` metadata and `<item>` fields from reader events.
/// Unknown elements are skipped.
#[derive(Default)]
struct ChannelDecoder {
    path: Vec<Vec<u8>>,
    text: String,
    feed: Option<Feed>,
    item: Option<Item>,
}

impl ChannelDecoder {
    fn start(&mut self, name: &[u8]) {
        match (self.parent(), name) {
            (Some(b"rss"), b"channel") if self.path.len() == 1 => {
                self.feed = Some(Feed::new("", "", ""));
            }
            (Some(b"channel"), b"item") if self.feed.is_some() => {
                self.item = Some(empty_item());
            }
            _ => {}
        }
        self.path.push(name.to_vec());
        self.text.clear();
    }

    fn end(&mut self) {
        let name = self.path.pop().unwrap_or_default();
        let text = std::mem::take(&mut self.text);

        match (self.parent(), name.as_slice()) {
            (Some(b"channel"), b"item") => {
                if let (Some(feed), Some(item)) = (self.feed.as_mut(), self.item.take()) {
                    feed.push(item);
                }
            }
            (Some(b"channel"), field) => {
                if let Some(feed) = self.feed.as_mut() {
                    match field {
                        b"title" => feed.title = text,
                        b"link" => feed.link = text,
                        b"description" => feed.description = text,
                        _ => {}
                    }
                }
            }
            (Some(b"item"), field) => {
                if let Some(item) = self.item.as_mut() {
                    match field {
                        b"title" => item.title = text,
                        b"link" => item.link = text,
                        b"description" => item.description = text,
                        b"author" => item.author = text,
                        b"pubDate" => item.pub_date = text,
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn parent(&self) -> Option<&[u8]> {
        self.path.last().map(Vec::as_slice)
    }

    fn finish(self) -> Result<Feed, CodecError> {
        self.feed
            .ok_or_else(|| CodecError::Malformed("missing <rss><channel> element".to_string()))
    }
}

fn empty_item() -> Item {
    Item {
        title: String::new(),
        link: String::new(),
        description: String::new(),
        author: String::new(),
        pub_date: String::new(),
    }
}

impl From<&Feed> for Channel {
    fn from(feed: &Feed) -> Self {
        let mut channel = Channel::default();
        channel.set_title(feed.title.clone());
        channel.set_link(feed.link.clone());
        channel.set_description(feed.description.clone());
        channel.set_items(feed.items.iter().map(rss::Item::from).collect::<Vec<_>>());
        channel
    }
}

impl From<&Item> for rss::Item {
    fn from(item: &Item) -> Self {
        let mut rss_item = rss::Item::default();
        rss_item.set_title(Some(item.title.clone()));
        rss_item.set_link(Some(item.link.clone()));
        rss_item.set_description(Some(item.description.clone()));
        rss_item.set_author(Some(item.author.clone()));
        rss_item.set_pub_date(Some(item.pub_date.clone()));
        rss_item
    }
}
