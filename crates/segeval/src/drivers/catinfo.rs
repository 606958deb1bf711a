// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! `cat_info.xml` driver.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <coins>
//!     <coin>
//!         <image face="avert" x="817" y="180" w="256" h="254" id="9"/>
//!         <image face="revert" x="1113" y="175" w="255" h="255" id="6"/>
//!         <label x="1071" y="408" w="43" h="25" id="1"/>
//!     </coin>
//! </coins>
//! ```
//!
//! Every `image` element becomes a `coin` annotation and every `label`
//! element a `label` annotation, both with rectangular shapes. The `id`
//! attribute of the file is not used: all annotations of a `coin` element
//! share a generated id `_autogen_NNNN`. Unknown elements are skipped along
//! with their content, including any `image` or `label` nested inside them.

use super::{InputDriver, has_extension};
use crate::{Error, annotation::Annotation, geometry::Shape};
use log::debug;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

const SUFFIX: &str = "xml";

const TAG_COINS: &str = "coins";
const TAG_COIN: &str = "coin";
const TAG_IMAGE: &str = "image";
const TAG_LABEL: &str = "label";

/// Driver for `cat_info.xml` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatInfoDriver;

impl CatInfoDriver {
    /// Map a `face` attribute to a coin side.
    ///
    /// Note: `face` is matched on its first three characters (`ave`, `rev`),
    /// so sides differ from tools that always report `isolated` here.
    pub fn parse_coin_side(face: &str) -> &'static str {
        if face.starts_with("ave") {
            "avers"
        } else if face.starts_with("rev") {
            "revers"
        } else {
            "isolated"
        }
    }
}

impl InputDriver for CatInfoDriver {
    fn name(&self) -> &'static str {
        "cat_info"
    }

    fn load(&self, path: &Path) -> Result<Vec<Annotation>, Error> {
        if !has_extension(path, SUFFIX) {
            return Err(Error::UnsupportedFile(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.trim_text(true);

        let mut parser = CatInfoParser::default();
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(element) => parser.start(&element)?,
                Event::Empty(element) => {
                    parser.start(&element)?;
                    parser.end(&tag_name(&element))?;
                }
                Event::End(element) => {
                    parser.end(&String::from_utf8_lossy(element.name().as_ref()))?
                }
                Event::Text(text) => {
                    debug!("Ignoring text content: {} byte(s) skipped.", text.len())
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        parser.finish()
    }
}

fn tag_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

#[derive(Debug, Default)]
struct CatInfoParser {
    stack: Vec<String>,
    annotations: Vec<Annotation>,
    current: Option<Annotation>,
    coin_count: usize,
    /// Stack depth of the unknown element being skipped.
    skip_depth: Option<usize>,
}

impl CatInfoParser {
    fn start(&mut self, element: &BytesStart<'_>) -> Result<(), Error> {
        let name = tag_name(element);
        self.stack.push(name.clone());
        if self.skip_depth.is_some() {
            return Ok(());
        }

        match name.as_str() {
            TAG_COINS => debug!("Beginning parsing document."),
            TAG_COIN => self.coin_count += 1,
            TAG_LABEL => {
                let attributes = read_attributes(element)?;
                self.current = Some(
                    Annotation::new(parse_shape(&name, &attributes)?, "label")
                        .with_attribute("id", self.auto_id()),
                );
            }
            TAG_IMAGE => {
                let attributes = read_attributes(element)?;
                let face = attributes.get("face").map(String::as_str).unwrap_or_default();
                self.current = Some(
                    Annotation::new(parse_shape(&name, &attributes)?, "coin")
                        .with_attribute("id", self.auto_id())
                        .with_attribute("side", CatInfoDriver::parse_coin_side(face)),
                );
            }
            _ => {
                debug!("Got unknown opening tag '{}'. Will ignore its content.", name);
                self.skip_depth = Some(self.stack.len());
            }
        }
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<(), Error> {
        let Some(open) = self.stack.pop() else {
            return Err(Error::XmlError(format!(
                "got unexpected element end: '{}'. Expected start of document",
                name
            )));
        };
        if open != name {
            return Err(Error::XmlError(format!(
                "got unexpected element end: '{}'. Expected closing '{}'",
                name, open
            )));
        }

        if let Some(depth) = self.skip_depth {
            if self.stack.len() < depth {
                debug!("Finished ignoring content of unknown tag '{}'.", name);
                self.skip_depth = None;
            }
            return Ok(());
        }

        match name {
            TAG_LABEL | TAG_IMAGE => {
                if let Some(annotation) = self.current.take() {
                    debug!("Finished parsing {} info: shape={}", name, annotation.shape);
                    self.annotations.push(annotation);
                }
            }
            TAG_COINS => debug!("Finished parsing document."),
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<Vec<Annotation>, Error> {
        match self.stack.last() {
            Some(open) => Err(Error::XmlError(format!(
                "unexpected end of document inside '{}'",
                open
            ))),
            None => Ok(self.annotations),
        }
    }

    fn auto_id(&self) -> String {
        format!("_autogen_{:04}", self.coin_count)
    }
}

fn read_attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>, Error> {
    let mut attributes = HashMap::new();
    for attribute in element.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}

fn parse_shape(tag: &str, attributes: &HashMap<String, String>) -> Result<Shape, Error> {
    let number = |key: &str| -> Result<f64, Error> {
        let value = attributes.get(key).ok_or_else(|| {
            Error::XmlError(format!("missing attribute '{}' on <{}>", key, tag))
        })?;
        value.trim().parse::<f64>().map_err(|_| {
            Error::XmlError(format!(
                "invalid value '{}' for attribute '{}' on <{}>",
                value, key, tag
            ))
        })
    };
    let (x, y, w, h) = (number("x")?, number("y")?, number("w")?, number("h")?);
    Shape::from_contour([(x, y), (x, y + h), (x + w, y + h), (x + w, y)])
}
