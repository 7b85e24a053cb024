//! Manifest template rendering
//!
//! A template is the project's `addon.xml` with a version placeholder. The
//! rendered fragment has its XML prolog removed so that fragments can be
//! concatenated inside a single `<addons>` document.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::config::TemplateConfig;
use crate::repo::error::TemplateError;

/// Identity attributes read from the root `<addon>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonHeader {
    pub id: String,
    pub version: String,
}

/// Renders manifest templates with a fixed byte layout
pub struct TemplateRenderer {
    placeholder: String,
    line_separator: String,
}

impl TemplateRenderer {
    pub fn new(config: &TemplateConfig) -> Self {
        Self {
            placeholder: config.placeholder.clone(),
            line_separator: config.line_separator.clone(),
        }
    }

    /// Render a template for the given version
    ///
    /// Every line is emitted as `separator + line`, followed by one trailing
    /// separator. A leading XML declaration line is dropped and the first
    /// placeholder occurrence on each line is replaced.
    pub fn render(&self, template: &[u8], version: &str) -> Result<String, TemplateError> {
        let text = String::from_utf8(template.to_vec())?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

        let mut lines = text.lines().peekable();
        if lines
            .peek()
            .is_some_and(|first| first.trim_start().starts_with("<?xml"))
        {
            lines.next();
        }

        let mut rendered = String::with_capacity(text.len() + version.len());
        for line in lines {
            rendered.push_str(&self.line_separator);
            if self.placeholder.is_empty() {
                rendered.push_str(line);
            } else {
                rendered.push_str(&line.replacen(&self.placeholder, version, 1));
            }
        }
        rendered.push_str(&self.line_separator);

        Ok(rendered)
    }

    /// Read `id` and `version` from the first `<addon>` element
    ///
    /// Comments, processing instructions and an enclosing `<addons>` element
    /// are skipped. Attribute values are returned with entities decoded.
    pub fn parse_header(&self, xml: &str) -> Result<AddonHeader, TemplateError> {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Start(tag)) | Ok(Event::Empty(tag))
                    if tag.name().as_ref() == b"addon" =>
                {
                    return addon_header(&tag);
                }
                Ok(Event::Eof) => {
                    return Err(TemplateError::Malformed(
                        "missing <addon> element".to_string(),
                    ));
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(TemplateError::Malformed(format!(
                        "invalid XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            }
        }
    }
}

fn addon_header(tag: &BytesStart<'_>) -> Result<AddonHeader, TemplateError> {
    let mut id = None;
    let mut version = None;
    for attr in tag.attributes() {
        let attr =
            attr.map_err(|e| TemplateError::Malformed(format!("<addon> attribute: {}", e)))?;
        let slot = match attr.key.as_ref() {
            b"id" => &mut id,
            b"version" => &mut version,
            _ => continue,
        };
        let value = attr
            .unescape_value()
            .map_err(|e| TemplateError::Malformed(format!("<addon> attribute: {}", e)))?;
        *slot = Some(value.into_owned());
    }

    let id = id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| TemplateError::Malformed("<addon> has no id attribute".to_string()))?;
    let version = version.ok_or_else(|| {
        TemplateError::Malformed(format!("<addon id=\"{}\"> has no version attribute", id))
    })?;

    Ok(AddonHeader { id, version })
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(&TemplateConfig::default())
    }
}
