//! Styled text runs (`w:r`)

use crate::output::docx::markup::XmlElement;

/// Character formatting applied to a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStyle {
    pub font: Option<&'static str>,
    /// Size in half-points, as `w:sz` expects
    pub half_points: Option<u32>,
    pub underline: Option<&'static str>,
    /// Hex RGB without `#`
    pub color: Option<&'static str>,
}

impl RunStyle {
    /// Blue underlined Calibri 13.5pt
    pub const HYPERLINK: RunStyle = RunStyle {
        font: Some("Calibri"),
        half_points: Some(27),
        underline: Some("single"),
        color: Some("0000FF"),
    };

    pub const PLAIN: RunStyle = RunStyle {
        font: None,
        half_points: None,
        underline: None,
        color: None,
    };

    fn is_plain(&self) -> bool {
        *self == Self::PLAIN
    }

    /// `w:rPr` element, children in schema order
    fn to_xml(self) -> XmlElement {
        let mut props = XmlElement::new("w:rPr");

        if let Some(font) = self.font {
            props.push(
                XmlElement::new("w:rFonts")
                    .attr("w:ascii", font)
                    .attr("w:hAnsi", font),
            );
        }
        if let Some(color) = self.color {
            props.push(XmlElement::new("w:color").attr("w:val", color));
        }
        if let Some(size) = self.half_points {
            props.push(XmlElement::new("w:sz").attr("w:val", size.to_string()));
        }
        if let Some(underline) = self.underline {
            props.push(XmlElement::new("w:u").attr("w:val", underline));
        }

        props
    }
}

/// Builds a `w:r` element with text and optional formatting
#[derive(Debug, Clone)]
pub struct RunBuilder {
    text: String,
    style: RunStyle,
}

impl RunBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::PLAIN,
        }
    }

    pub fn style(mut self, style: RunStyle) -> Self {
        self.style = style;
        self
    }

    pub fn build(self) -> XmlElement {
        let mut run = XmlElement::new("w:r");
        if !self.style.is_plain() {
            run.push(self.style.to_xml());
        }
        run.push(
            XmlElement::new("w:t")
                .attr("xml:space", "preserve")
                .text(self.text),
        );
        run
    }
}
