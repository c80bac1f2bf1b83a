//! # GPX Emission
//!
//! Serializes fused trackpoints as a GPX 1.1 document with one track and one
//! segment. Heart rate travels in Garmin's TrackPointExtension:
//!
//! ```xml
//! <trkpt lat="52.1" lon="4.3">
//!   <ele>3.5</ele>
//!   <time>2020-05-01T07:30:00.000Z</time>
//!   <extensions>
//!     <gpxtpx:TrackPointExtension>
//!       <gpxtpx:hr>142</gpxtpx:hr>
//!     </gpxtpx:TrackPointExtension>
//!   </extensions>
//! </trkpt>
//! ```
//!
//! Downstream tools key on the exact namespace URI, prefix and element name,
//! so those are fixed constants.

use crate::track::Trackpoint;
use crate::{ExportError, Result};
use chrono::SecondsFormat;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt::Display;

pub const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";
pub const GPX_SCHEMA_LOCATION: &str =
    "http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const TRACKPOINT_EXTENSION_NAMESPACE: &str =
    "http://www.garmin.com/xmlschemas/TrackPointExtension/v1";
pub const TRACKPOINT_EXTENSION_PREFIX: &str = "gpxtpx";

/// A single-track, single-segment GPX document.
#[derive(Clone, Debug)]
pub struct TrackDocument {
    pub creator: String,
    pub name: String,
    pub points: Vec<Trackpoint>,
}

type XmlWriter = Writer<Vec<u8>>;

fn xml_error(err: impl Display) -> ExportError {
    ExportError::Xml(err.to_string())
}

impl TrackDocument {
    pub fn new(creator: &str, name: &str, points: Vec<Trackpoint>) -> Self {
        TrackDocument {
            creator: creator.to_string(),
            name: name.to_string(),
            points,
        }
    }

    /// Serialize the document to GPX text.
    pub fn to_xml(&self) -> Result<String> {
        let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
        w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;

        let xmlns_ext = format!("xmlns:{TRACKPOINT_EXTENSION_PREFIX}");
        let mut gpx = BytesStart::new("gpx");
        gpx.push_attribute(("version", "1.1"));
        gpx.push_attribute(("creator", xml_chars(&self.creator).as_str()));
        gpx.push_attribute(("xmlns", GPX_NAMESPACE));
        gpx.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
        gpx.push_attribute(("xsi:schemaLocation", GPX_SCHEMA_LOCATION));
        gpx.push_attribute((xmlns_ext.as_str(), TRACKPOINT_EXTENSION_NAMESPACE));
        w.write_event(Event::Start(gpx)).map_err(xml_error)?;

        w.write_event(Event::Start(BytesStart::new("trk")))
            .map_err(xml_error)?;
        text_element(&mut w, "name", &self.name)?;
        w.write_event(Event::Start(BytesStart::new("trkseg")))
            .map_err(xml_error)?;

        for point in &self.points {
            write_point(&mut w, point)?;
        }

        w.write_event(Event::End(BytesEnd::new("trkseg")))
            .map_err(xml_error)?;
        w.write_event(Event::End(BytesEnd::new("trk")))
            .map_err(xml_error)?;
        w.write_event(Event::End(BytesEnd::new("gpx")))
            .map_err(xml_error)?;

        String::from_utf8(w.into_inner()).map_err(xml_error)
    }
}

fn write_point(w: &mut XmlWriter, p: &Trackpoint) -> Result<()> {
    let mut trkpt = BytesStart::new("trkpt");
    trkpt.push_attribute(("lat", p.latitude.to_string().as_str()));
    trkpt.push_attribute(("lon", p.longitude.to_string().as_str()));
    w.write_event(Event::Start(trkpt)).map_err(xml_error)?;

    if let Some(ele) = p.elevation {
        text_element(w, "ele", &ele.to_string())?;
    }
    text_element(
        w,
        "time",
        &p.time.to_rfc3339_opts(SecondsFormat::Millis, true),
    )?;

    if let Some(hr) = p.heart_rate {
        let ext = format!("{TRACKPOINT_EXTENSION_PREFIX}:TrackPointExtension");
        w.write_event(Event::Start(BytesStart::new("extensions")))
            .map_err(xml_error)?;
        w.write_event(Event::Start(BytesStart::new(ext.as_str())))
            .map_err(xml_error)?;
        text_element(
            w,
            &format!("{TRACKPOINT_EXTENSION_PREFIX}:hr"),
            &hr.to_string(),
        )?;
        w.write_event(Event::End(BytesEnd::new(ext.as_str())))
            .map_err(xml_error)?;
        w.write_event(Event::End(BytesEnd::new("extensions")))
            .map_err(xml_error)?;
    }

    w.write_event(Event::End(BytesEnd::new("trkpt")))
        .map_err(xml_error)?;
    Ok(())
}

/// Drop characters XML 1.0 does not allow in documents, such as the C0
/// controls other than tab, newline and carriage return. Escaping cannot
/// represent them, so strict parsers reject any document containing them.
fn xml_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || ('\u{20}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || c >= '\u{10000}'
        })
        .collect()
}

fn text_element(w: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_error)?;
    w.write_event(Event::Text(BytesText::new(&xml_chars(text))))
        .map_err(xml_error)?;
    w.write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)?;
    Ok(())
}
