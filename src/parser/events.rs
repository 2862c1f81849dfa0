//! Start/end element events, decoupled from the XML library.
//!
//! The tree builder only consumes [`XmlEvent`]s, so it can be driven by
//! [`XmlEvents`] over real file content or by a hand-written sequence in tests.

use anyhow::{Context, Result, anyhow};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, QName, ResolveResult};

/// Standard namespace URI of the `xsi` prefix.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// An attribute with its namespace prefix already resolved to a URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub namespace: Option<String>,
    pub local_name: String,
    pub value: String,
}

impl XmlAttribute {
    pub fn new(local_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
            value: value.into(),
        }
    }

    pub fn namespaced(
        namespace: impl Into<String>,
        local_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    Start {
        local_name: String,
        attributes: Vec<XmlAttribute>,
        /// URI the `xsi` prefix is bound to at this element, if any.
        xsi_namespace: Option<String>,
    },
    End,
}

impl XmlEvent {
    pub fn start(
        local_name: impl Into<String>,
        attributes: impl IntoIterator<Item = XmlAttribute>,
    ) -> Self {
        XmlEvent::Start {
            local_name: local_name.into(),
            attributes: attributes.into_iter().collect(),
            xsi_namespace: None,
        }
    }

    /// Set the URI the `xsi` prefix is bound to on a start event.
    pub fn with_xsi_namespace(mut self, uri: impl Into<String>) -> Self {
        if let XmlEvent::Start { xsi_namespace, .. } = &mut self {
            *xsi_namespace = Some(uri.into());
        }
        self
    }
}

fn namespace_uri(ns: ResolveResult<'_>) -> Result<Option<String>> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => Ok(Some(
            std::str::from_utf8(uri)
                .context("Non-UTF8 namespace URI")?
                .to_string(),
        )),
        _ => Ok(None),
    }
}

/// Lazy event stream over XML text. Self-closing elements are reported as a
/// start event followed by an end event. After the first error the stream ends.
pub struct XmlEvents<'i> {
    reader: NsReader<&'i [u8]>,
    pending_end: bool,
    done: bool,
}

impl<'i> XmlEvents<'i> {
    pub fn new(text: &'i str) -> Self {
        Self {
            reader: NsReader::from_str(text),
            pending_end: false,
            done: false,
        }
    }

    fn start_event(&self, e: &BytesStart<'_>) -> Result<XmlEvent> {
        let local_name = std::str::from_utf8(e.local_name().as_ref())
            .context("Non-UTF8 element name")?
            .to_string();
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.with_context(|| format!("Malformed attribute on <{}>", local_name))?;
            let key = attr.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                continue;
            }
            let (ns, local) = self.reader.resolve_attribute(attr.key);
            let namespace = namespace_uri(ns)?;
            let local_name = std::str::from_utf8(local.as_ref())
                .context("Non-UTF8 attribute name")?
                .to_string();
            let value = attr
                .unescape_value()
                .with_context(|| format!("Bad value for attribute {}", local_name))?
                .into_owned();
            attributes.push(XmlAttribute {
                namespace,
                local_name,
                value,
            });
        }
        let (xsi, _) = self.reader.resolve_attribute(QName(b"xsi:type"));
        Ok(XmlEvent::Start {
            local_name,
            attributes,
            xsi_namespace: namespace_uri(xsi)?,
        })
    }

    fn fail(&mut self, err: anyhow::Error) -> Option<Result<XmlEvent>> {
        self.done = true;
        self.pending_end = false;
        Some(Err(err))
    }
}

impl Iterator for XmlEvents<'_> {
    type Item = Result<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending_end {
            self.pending_end = false;
            return Some(Ok(XmlEvent::End));
        }
        if self.done {
            return None;
        }
        loop {
            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    return match self.start_event(&e) {
                        Ok(ev) => Some(Ok(ev)),
                        Err(err) => self.fail(err),
                    };
                }
                Ok(Event::Empty(e)) => {
                    return match self.start_event(&e) {
                        Ok(ev) => {
                            self.pending_end = true;
                            Some(Ok(ev))
                        }
                        Err(err) => self.fail(err),
                    };
                }
                Ok(Event::End(_)) => return Some(Ok(XmlEvent::End)),
                Ok(Event::Eof) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(err) => {
                    let position = self.reader.error_position();
                    return self.fail(anyhow!("XML error at position {}: {}", position, err));
                }
            }
        }
    }
}
