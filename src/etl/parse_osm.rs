//! Streaming reader for .osm documents.
//!
//! `OsmElements` pulls events from quick-xml and hands out one `RawElement` per
//! `<node>` or `<way>`. Only the element under construction is held in memory.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str;

use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use xz::bufread::XzDecoder;

use crate::data::osm::{ElementKind, RawElement, RawTag};
use crate::errors::Result;

/// Opens an .osm file for reading, decompressing it on the fly when it ends in `.xz`.
pub fn open_osm_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = fs::File::open(path)
        .map_err(|err| format!("Could not open {}: {}", path.display(), err))?;
    let file_reader = BufReader::new(file);
    if path.extension().is_some_and(|ext| ext == "xz") {
        Ok(Box::new(BufReader::new(XzDecoder::new(file_reader))))
    } else {
        Ok(Box::new(file_reader))
    }
}

fn element_kind(name: &[u8]) -> Option<ElementKind> {
    match name {
        b"node" => Some(ElementKind::Point),
        b"way" => Some(ElementKind::Way),
        _ => None,
    }
}

fn parse_element(kind: ElementKind, el: &BytesStart) -> Result<RawElement> {
    let mut element = RawElement::new(kind);
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        let key = str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.insert(key, value);
    }
    Ok(element)
}

/// Reads the `k`/`v` pair of a `<tag>`. Tags without a key are dropped.
fn parse_tag(el: &BytesStart) -> Result<Option<RawTag>> {
    let mut key: Option<String> = None;
    let mut value = String::new();

    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        match attribute.key.as_ref() {
            b"k" => key = Some(attribute.unescape_value()?.into_owned()),
            b"v" => value = attribute.unescape_value()?.into_owned(),
            _ => (),
        }
    }

    if key.is_none() {
        warn!(value = value.as_str(); "Skipping tag without a key");
    }
    Ok(key.map(|key| RawTag::new(key, value)))
}

fn parse_member_ref(el: &BytesStart) -> Result<Option<String>> {
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        if attribute.key.as_ref() == b"ref" {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Adds a `<tag>` or `<nd>` child to the element being built. Children of anything
/// else (relations, the document root) are ignored.
fn add_child(current: &mut Option<RawElement>, el: &BytesStart) -> Result<()> {
    let Some(element) = current.as_mut() else {
        return Ok(());
    };
    match el.name().as_ref() {
        b"tag" => {
            if let Some(tag) = parse_tag(el)? {
                element.tags.push(tag);
            }
        }
        b"nd" if element.kind == ElementKind::Way => {
            match parse_member_ref(el)? {
                Some(node_ref) => element.member_refs.push(node_ref),
                None => return Err("Found <nd> without a ref attribute.".into()),
            }
        }
        _ => (),
    }
    Ok(())
}

/// Forward-only iterator over the points and ways of an .osm document.
///
/// Yields an error at most once; the iterator is finished afterwards.
pub struct OsmElements<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    current: Option<RawElement>,
    finished: bool,
}

impl<R: BufRead> OsmElements<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(true);

        OsmElements {
            reader,
            buf: Vec::new(),
            current: None,
            finished: false,
        }
    }

    fn next_element(&mut self) -> Result<Option<RawElement>> {
        loop {
            // if we don't keep a borrow elsewhere, we can clear the buffer to keep memory usage low
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Eof => {
                    if self.current.is_some() {
                        return Err("Unexpected end of OSM file inside an element.".into());
                    }
                    return Ok(None);
                }
                Event::Start(e) => match element_kind(e.name().as_ref()) {
                    Some(kind) => self.current = Some(parse_element(kind, &e)?),
                    None => add_child(&mut self.current, &e)?,
                },
                Event::Empty(e) => match element_kind(e.name().as_ref()) {
                    Some(kind) => return Ok(Some(parse_element(kind, &e)?)),
                    None => add_child(&mut self.current, &e)?,
                },
                Event::End(e) => {
                    if element_kind(e.name().as_ref()).is_some() {
                        if let Some(element) = self.current.take() {
                            return Ok(Some(element));
                        }
                    }
                }
                Event::Text(_) => return Err("Didn't expect to see Text in OSM file.".into()),
                _ => (),
            }
        }
    }
}

impl<R: BufRead> Iterator for OsmElements<R> {
    type Item = Result<RawElement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for OsmElements<R> {}
