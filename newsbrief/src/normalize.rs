use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A normalized feed entry. Title and link are always non-empty; items that
/// fail that invariant are dropped during normalization, never surfaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    pub title: String,
    pub link: String,
    /// Raw publication date string as found in the feed (RFC 2822 for RSS,
    /// RFC 3339 for Atom). Parsed later, at filtering time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
}

#[derive(Debug, Error)]
pub enum FeedFormatError {
    #[error("invalid feed XML: {0}")]
    Xml(String),
    #[error("invalid or unrecognized feed structure")]
    Unrecognized,
}

/// Generic attribute/text tree built from the XML event stream. Both
/// attributes and text must be inspectable: Atom expresses links as an
/// `href` attribute rather than element text.
#[derive(Debug, Default)]
struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse raw feed markup (RSS 2.0 or Atom) into a uniform list of headlines.
///
/// Tolerates a leading byte-order mark and surrounding whitespace. Fails with
/// [`FeedFormatError::Unrecognized`] when neither an `rss > channel > item`
/// nor a `feed > entry` structure is present. Individual malformed items are
/// dropped silently rather than failing the whole batch.
pub fn parse_feed(raw: &str) -> Result<Vec<Headline>, FeedFormatError> {
    let cleaned = raw.trim_start_matches('\u{feff}').trim();
    let root = build_tree(cleaned)?;

    let items: Vec<&XmlNode> = if let Some(channel) =
        root.child("rss").and_then(|rss| rss.child("channel"))
    {
        channel.children_named("item").collect()
    } else if let Some(feed) = root.child("feed") {
        feed.children_named("entry").collect()
    } else {
        Vec::new()
    };

    if items.is_empty() {
        return Err(FeedFormatError::Unrecognized);
    }

    Ok(items
        .into_iter()
        .filter_map(extract_headline)
        .collect())
}

/// Fold the event stream into a tree. Namespace prefixes are dropped so that
/// `atom:link` and `link` normalize to the same node name.
fn build_tree(xml: &str) -> Result<XmlNode, FeedFormatError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlNode> = vec![XmlNode::default()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(element_node(&e));
            }
            Ok(Event::Empty(e)) => {
                let node = element_node(&e);
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Ok(Event::End(_)) => {
                // The synthetic document root never has a matching End tag.
                if stack.len() > 1 {
                    if let Some(node) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(node);
                        }
                    }
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| FeedFormatError::Xml(e.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(t)) => {
                let bytes = t.into_inner();
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&bytes));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // declarations, comments, processing instructions
            Err(e) => return Err(FeedFormatError::Xml(e.to_string())),
        }
    }

    // Unbalanced documents leave dangling nodes; fold them down so the root
    // still reflects everything parsed so far.
    while stack.len() > 1 {
        if let Some(node) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
            }
        }
    }

    Ok(stack.pop().unwrap_or_default())
}

fn element_node(e: &quick_xml::events::BytesStart<'_>) -> XmlNode {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let attributes = e
        .attributes()
        .flatten()
        .filter_map(|attr| {
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value().ok()?.into_owned();
            Some((key, value))
        })
        .collect();
    XmlNode {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    }
}

/// Shape-aware extraction of one headline from a raw item/entry node.
/// Returns None when the resulting title or link would be empty.
fn extract_headline(item: &XmlNode) -> Option<Headline> {
    let title = item
        .child("title")
        .map(|n| n.text.trim().to_string())
        .unwrap_or_default();

    let link = item
        .children_named("link")
        .find(|n| matches!(n.attr("rel"), None | Some("alternate")))
        .or_else(|| item.child("link"))
        .map(extract_link)
        .unwrap_or_default();

    if title.is_empty() || link.is_empty() {
        return None;
    }

    // RSS uses pubDate; Atom entries carry published (or only updated).
    let pub_date = ["pubDate", "published", "updated"]
        .into_iter()
        .filter_map(|name| item.child(name))
        .filter(|n| n.children.is_empty())
        .map(|n| n.text.trim().to_string())
        .find(|s| !s.is_empty());

    Some(Headline {
        title,
        link,
        pub_date,
    })
}

/// A bare `<link>text</link>` yields its text; Atom's `<link href="..."/>`
/// yields the href attribute; structured nodes without href fall back to text.
fn extract_link(node: &XmlNode) -> String {
    if node.attributes.is_empty() {
        return node.text.trim().to_string();
    }
    if let Some(href) = node.attr("href") {
        return href.trim().to_string();
    }
    node.text.trim().to_string()
}
