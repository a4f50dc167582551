use super::{DocumentError, Element};
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Indentation used when no configuration overrides it.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Parse a complete document from text.
///
/// Element text is kept verbatim; text made only of whitespace is layout and
/// is dropped.
pub fn parse_str(input: &str) -> Result<Element, DocumentError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(false);

    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => open.push(element_from_start(&start)?),
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut open, &mut root, element)?;
            }
            Event::End(end) => {
                let element = match open.pop() {
                    Some(element) => element,
                    None => {
                        return Err(DocumentError::UnexpectedEnd {
                            tag: std::str::from_utf8(end.name().as_ref())?.to_string(),
                        })
                    }
                };
                attach(&mut open, &mut root, element)?;
            }
            Event::Text(text) => {
                let value = text.unescape()?;
                append_text(&mut open, &value)?;
            }
            Event::CData(data) => {
                let value = std::str::from_utf8(&data)?;
                append_text(&mut open, value)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(DocumentError::Unclosed {
            tag: unclosed.tag().to_string(),
        });
    }
    root.ok_or(DocumentError::NoRoot)
}

/// Read and parse a document from disk.
pub fn parse_file(path: &Path) -> Result<Element, DocumentError> {
    let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&content)
}

/// Serialize with an XML declaration header.
pub fn to_string(root: &Element, indent_width: usize) -> Result<String, DocumentError> {
    let mut writer = if indent_width > 0 {
        Writer::new_with_indent(Vec::new(), b' ', indent_width)
    } else {
        Writer::new(Vec::new())
    };
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)?;
    let mut output = String::from_utf8(writer.into_inner())?;
    output.push('\n');
    Ok(output)
}

/// Serialize to `path`, creating missing parent directories.
pub fn write_file(path: &Path, root: &Element, indent_width: usize) -> Result<(), DocumentError> {
    let content = to_string(root, indent_width)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| DocumentError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            tracing::info!("created output directory {}", parent.display());
        }
    }
    fs::write(path, content).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, DocumentError> {
    let tag = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut element = Element::new(tag);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = std::str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        element.set_attr(key, value);
    }
    Ok(element)
}

fn attach(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DocumentError> {
    if let Some(parent) = open.last_mut() {
        parent.push_child(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(DocumentError::MultipleRoots {
            tag: element.tag().to_string(),
        });
    }
    *root = Some(element);
    Ok(())
}

fn append_text(open: &mut [Element], text: &str) -> Result<(), DocumentError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    match open.last_mut() {
        Some(element) => {
            element.append_text(text);
            Ok(())
        }
        None => Err(DocumentError::TextOutsideRoot),
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), DocumentError> {
    let mut start = BytesStart::new(element.tag());
    for (key, value) in element.attributes() {
        start.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: escape_attribute(value),
        });
    }

    if element.children().is_empty() && element.text().is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = element.text() {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in element.children() {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.tag())))?;
    Ok(())
}

/// Escapes markup characters plus tab, CR and LF, which a reader would
/// otherwise normalize to spaces.
fn escape_attribute(value: &str) -> Cow<'_, [u8]> {
    let escaped = escape(value);
    if !escaped.contains(['\t', '\n', '\r']) {
        return match escaped {
            Cow::Borrowed(text) => Cow::Borrowed(text.as_bytes()),
            Cow::Owned(text) => Cow::Owned(text.into_bytes()),
        };
    }
    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out.into_bytes())
}
