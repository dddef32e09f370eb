// src/store/codec.rs
//! XML wire codec for the log document
//!
//! Document shape:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <entries>
//!   <entry msg="a" timestamp="1200" type="KeyEvent">
//!     <event type="typed" keycode="30" char="97"/>
//!   </entry>
//! </entries>
//! ```
//!
//! The `type` attribute on `<entry>` selects the event kind; `<event>`
//! attributes are kind-specific. Decoding is tolerant per entry: an entry
//! with an unknown kind or an unreadable field is skipped and counted,
//! while structural damage fails the whole read.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io;
use std::str::FromStr;
use tracing::warn;

use crate::errors::{Error, Result};
use crate::event::{KeyPhase, LogEntry, LogEvent};

/// Serialize a full document
pub(crate) fn write_document<W: io::Write>(out: W, entries: &[LogEntry]) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("entries")))?;
    for entry in entries {
        encode_entry(&mut writer, entry)?;
    }
    writer.write_event(Event::End(BytesEnd::new("entries")))?;

    Ok(())
}

/// Parse a full document, returning the readable entries and the count of
/// entries skipped for per-entry reasons
pub(crate) fn read_document(text: &str) -> Result<(Vec<LogEntry>, usize)> {
    let mut reader = Reader::from_str(text);
    let mut entries = Vec::new();
    let mut skipped = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(element) => match element.name().as_ref() {
                b"entries" if !saw_root => saw_root = true,
                b"entry" if saw_root => match read_entry(&mut reader, &element)? {
                    Some(entry) => entries.push(entry),
                    None => skipped += 1,
                },
                other => {
                    return Err(Error::MalformedDocument(format!(
                        "unexpected element <{}>",
                        String::from_utf8_lossy(other)
                    )));
                }
            },
            // An empty <entries/> is a valid, empty document.
            Event::Empty(element) if element.name().as_ref() == b"entries" && !saw_root => {
                saw_root = true;
            }
            Event::Empty(element) => {
                return Err(Error::MalformedDocument(format!(
                    "unexpected element <{}/>",
                    String::from_utf8_lossy(element.name().as_ref())
                )));
            }
            Event::End(_) => {}
            Event::Eof => break,
            // Declarations, indentation text and comments carry nothing.
            _ => {}
        }
    }

    if !saw_root {
        return Err(Error::MalformedDocument(
            "missing <entries> root element".to_string(),
        ));
    }

    Ok((entries, skipped))
}

/// Serialize one entry element
fn encode_entry<W: io::Write>(writer: &mut Writer<W>, entry: &LogEntry) -> Result<()> {
    let mut element = BytesStart::new("entry");
    element.push_attribute(("msg", entry.message()));
    element.push_attribute(("timestamp", entry.timestamp().to_string().as_str()));
    element.push_attribute(("type", entry.event().kind_name()));

    writer.write_event(Event::Start(element))?;
    writer.write_event(Event::Empty(event_element(entry.event())))?;
    writer.write_event(Event::End(BytesEnd::new("entry")))?;

    Ok(())
}

/// Build the kind-specific `<event>` element
fn event_element(event: &LogEvent) -> BytesStart<'static> {
    let mut element = BytesStart::new("event");

    match *event {
        LogEvent::Key {
            phase,
            key_code,
            character,
        } => {
            element.push_attribute(("type", phase.as_str()));
            element.push_attribute(("keycode", key_code.to_string().as_str()));
            element.push_attribute(("char", (character as u32).to_string().as_str()));
        }
        LogEvent::MouseClicked {
            x,
            y,
            button,
            ref button_name,
            clicks,
        } => {
            push_position(&mut element, x, y);
            element.push_attribute(("bcode", button.to_string().as_str()));
            element.push_attribute(("bname", button_name.as_str()));
            element.push_attribute(("clicks", clicks.to_string().as_str()));
        }
        LogEvent::MousePressed {
            x,
            y,
            button,
            ref button_name,
        }
        | LogEvent::MouseReleased {
            x,
            y,
            button,
            ref button_name,
        } => {
            push_position(&mut element, x, y);
            element.push_attribute(("bcode", button.to_string().as_str()));
            element.push_attribute(("bname", button_name.as_str()));
        }
        LogEvent::MouseMoved { x, y } => push_position(&mut element, x, y),
        LogEvent::MouseDragged { x, y, button } => {
            push_position(&mut element, x, y);
            element.push_attribute(("bcode", button.to_string().as_str()));
        }
        LogEvent::MouseWheelMoved { x, y, rotation } => {
            push_position(&mut element, x, y);
            element.push_attribute(("rotation", rotation.to_string().as_str()));
        }
    }

    element
}

fn push_position(element: &mut BytesStart<'_>, x: i32, y: i32) {
    element.push_attribute(("x", x.to_string().as_str()));
    element.push_attribute(("y", y.to_string().as_str()));
}

/// Read one `<entry>` subtree
///
/// `Ok(None)` means the entry was skipped for a per-entry reason, already
/// logged; structural problems propagate as errors.
fn read_entry(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Option<LogEntry>> {
    let entry_attrs = attr_pairs(start)?;
    let mut event_attrs: Option<Vec<(String, String)>> = None;

    loop {
        match reader.read_event()? {
            Event::Empty(element) if element.name().as_ref() == b"event" => {
                if event_attrs.is_none() {
                    event_attrs = Some(attr_pairs(&element)?);
                }
            }
            Event::Start(element) if element.name().as_ref() == b"event" => {
                if event_attrs.is_none() {
                    event_attrs = Some(attr_pairs(&element)?);
                }
                let end = element.to_end().into_owned();
                reader.read_to_end(end.name())?;
            }
            // Unknown children are tolerated, their subtrees skipped.
            Event::Start(element) => {
                let end = element.to_end().into_owned();
                reader.read_to_end(end.name())?;
            }
            Event::Empty(_) => {}
            Event::End(element) if element.name().as_ref() == b"entry" => break,
            Event::Eof => {
                return Err(Error::MalformedDocument(
                    "unexpected end of document inside <entry>".to_string(),
                ));
            }
            _ => {}
        }
    }

    match build_entry(&entry_attrs, event_attrs.as_deref()) {
        Ok(entry) => Ok(Some(entry)),
        Err(error) => {
            warn!(error = %error, "skipping unreadable log entry");
            Ok(None)
        }
    }
}

/// Assemble a `LogEntry` from collected attributes
fn build_entry(
    entry_attrs: &[(String, String)],
    event_attrs: Option<&[(String, String)]>,
) -> Result<LogEntry> {
    let message = required(entry_attrs, "entry", "msg")?;
    if message.is_empty() {
        return Err(Error::InvalidAttribute {
            element: "entry",
            attribute: "msg",
            value: String::new(),
        });
    }

    let timestamp: i64 = parse_attr(entry_attrs, "entry", "timestamp")?;
    if timestamp < 0 {
        return Err(Error::InvalidAttribute {
            element: "entry",
            attribute: "timestamp",
            value: timestamp.to_string(),
        });
    }

    let kind = required(entry_attrs, "entry", "type")?;
    let event_attrs = event_attrs.ok_or_else(|| {
        Error::MalformedDocument("<entry> is missing its <event> child".to_string())
    })?;
    let event = decode_event(kind, event_attrs)?;

    Ok(LogEntry::with_timestamp(None, message, event, timestamp))
}

/// Decode the kind-specific event fields
fn decode_event(kind: &str, attrs: &[(String, String)]) -> Result<LogEvent> {
    match kind {
        "KeyEvent" => {
            let phase = KeyPhase::parse(required(attrs, "event", "type")?)?;
            let key_code = parse_attr(attrs, "event", "keycode")?;
            let code: u32 = parse_attr(attrs, "event", "char")?;
            let character = char::from_u32(code).ok_or_else(|| Error::InvalidAttribute {
                element: "event",
                attribute: "char",
                value: code.to_string(),
            })?;
            Ok(LogEvent::Key {
                phase,
                key_code,
                character,
            })
        }
        "MouseClicked" => Ok(LogEvent::MouseClicked {
            x: parse_attr(attrs, "event", "x")?,
            y: parse_attr(attrs, "event", "y")?,
            button: parse_attr(attrs, "event", "bcode")?,
            button_name: required(attrs, "event", "bname")?.to_string(),
            clicks: parse_attr(attrs, "event", "clicks")?,
        }),
        "MousePressed" => Ok(LogEvent::MousePressed {
            x: parse_attr(attrs, "event", "x")?,
            y: parse_attr(attrs, "event", "y")?,
            button: parse_attr(attrs, "event", "bcode")?,
            button_name: required(attrs, "event", "bname")?.to_string(),
        }),
        "MouseReleased" => Ok(LogEvent::MouseReleased {
            x: parse_attr(attrs, "event", "x")?,
            y: parse_attr(attrs, "event", "y")?,
            button: parse_attr(attrs, "event", "bcode")?,
            button_name: required(attrs, "event", "bname")?.to_string(),
        }),
        "MouseMoved" => Ok(LogEvent::MouseMoved {
            x: parse_attr(attrs, "event", "x")?,
            y: parse_attr(attrs, "event", "y")?,
        }),
        "MouseDragged" => Ok(LogEvent::MouseDragged {
            x: parse_attr(attrs, "event", "x")?,
            y: parse_attr(attrs, "event", "y")?,
            button: parse_attr(attrs, "event", "bcode")?,
        }),
        "MouseWheelMoved" => Ok(LogEvent::MouseWheelMoved {
            x: parse_attr(attrs, "event", "x")?,
            y: parse_attr(attrs, "event", "y")?,
            rotation: parse_attr(attrs, "event", "rotation")?,
        }),
        other => Err(Error::UnknownEventKind(other.to_string())),
    }
}

/// Collect an element's attributes as owned key/value pairs
fn attr_pairs(element: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.to_string();
        pairs.push((key, value));
    }
    Ok(pairs)
}

fn required<'a>(
    attrs: &'a [(String, String)],
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == attribute)
        .map(|(_, value)| value.as_str())
        .ok_or(Error::MissingAttribute { element, attribute })
}

fn parse_attr<T: FromStr>(
    attrs: &[(String, String)],
    element: &'static str,
    attribute: &'static str,
) -> Result<T> {
    let raw = required(attrs, element, attribute)?;
    raw.parse().map_err(|_| Error::InvalidAttribute {
        element,
        attribute,
        value: raw.to_string(),
    })
}
