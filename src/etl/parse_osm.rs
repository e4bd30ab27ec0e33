use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use xz::bufread::XzDecoder;

use crate::data::osm::{ElementKind, RawElement, Tag};
use crate::errors::{Error, Result};

/// Streams the top-level elements (nodes, ways, relations, bounds, ...) of an .osm
/// document one at a time. Only the element being built is held in memory.
pub struct OsmReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    depth: usize,
    current: Option<RawElement>,
    finished: bool,
}

fn element_name(el: &BytesStart) -> Result<String> {
    Ok(str::from_utf8(el.name().as_ref())?.to_string())
}

fn read_attributes(el: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        let key = str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

fn find_attribute(attributes: &mut Vec<(String, String)>, name: &str) -> Option<String> {
    let idx = attributes.iter().position(|(key, _)| key == name)?;
    Some(attributes.swap_remove(idx).1)
}

impl<R: BufRead> OsmReader<R> {
    pub fn from_reader(inner: R) -> OsmReader<R> {
        let mut reader = Reader::from_reader(inner);
        reader.trim_text(true);
        OsmReader {
            reader,
            buf: Vec::new(),
            depth: 0,
            current: None,
            finished: false,
        }
    }

    fn begin_element(el: &BytesStart) -> Result<RawElement> {
        let mut element = RawElement::new(ElementKind::from_name(&element_name(el)?));
        element.attributes = read_attributes(el)?;
        Ok(element)
    }

    fn add_child(element: &mut RawElement, el: &BytesStart) -> Result<()> {
        match el.name().as_ref() {
            b"nd" => {
                let mut attributes = read_attributes(el)?;
                let node_ref = find_attribute(&mut attributes, "ref")
                    .ok_or("nd element without ref attribute")?;
                element.node_refs.push(node_ref);
            },
            b"tag" => {
                let mut attributes = read_attributes(el)?;
                let key = find_attribute(&mut attributes, "k").ok_or("tag element without k attribute")?;
                let value = find_attribute(&mut attributes, "v").unwrap_or_default();
                element.tags.push(Tag { key, value });
            },
            // relation members and anything else don't take part in the cleaning
            _ => (),
        }
        Ok(())
    }

    fn next_element(&mut self) -> Result<Option<RawElement>> {
        loop {
            let event = self.reader.read_event_into(&mut self.buf)?;
            let done = match event {
                Event::Eof => {
                    if self.depth > 0 || self.current.is_some() {
                        return Err("Unexpected end of OSM document".into());
                    }
                    return Ok(None);
                },
                Event::Start(e) => {
                    let mut done = None;
                    if self.depth == 1 {
                        self.current = Some(Self::begin_element(&e)?);
                    } else if let (2, Some(current)) = (self.depth, self.current.as_mut()) {
                        Self::add_child(current, &e)?;
                    }
                    self.depth += 1;
                    if self.depth == 1 && e.name().as_ref() != b"osm" {
                        done = Some(Err(Error::from(format!(
                            "Unexpected root element {:?}", element_name(&e)?
                        ))));
                    }
                    done
                },
                Event::Empty(e) => {
                    if self.depth == 1 {
                        Some(Ok(Self::begin_element(&e)?))
                    } else {
                        if let (2, Some(current)) = (self.depth, self.current.as_mut()) {
                            Self::add_child(current, &e)?;
                        }
                        None
                    }
                },
                Event::End(_e) => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 1 {
                        self.current.take().map(Ok)
                    } else {
                        None
                    }
                },
                Event::Text(_) | Event::CData(_) | Event::Comment(_) | Event::Decl(_)
                | Event::PI(_) | Event::DocType(_) => None,
            };
            self.buf.clear();
            if let Some(element) = done {
                return element.map(Some);
            }
        }
    }
}

impl<R: BufRead> Iterator for OsmReader<R> {
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
            },
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            },
        }
    }
}

/// Opens an .osm file, decompressing it on the fly when it ends in `.xz`.
pub fn open_osm_reader(path: &Path) -> Result<OsmReader<Box<dyn BufRead + Send>>> {
    let file_reader = BufReader::new(fs::File::open(path)?);
    let inner: Box<dyn BufRead + Send> = if path.extension().is_some_and(|ext| ext == "xz") {
        Box::new(BufReader::new(XzDecoder::new(file_reader)))
    } else {
        Box::new(file_reader)
    };
    Ok(OsmReader::from_reader(inner))
}
