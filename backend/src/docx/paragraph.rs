//! Paragraphs, runs and the text-container view the substitution works on.

use crate::docx::xml::{self, TagKind};

/// Character formatting carried over when a paragraph is rebuilt.
///
/// `None` means "inherit from the style", matching what Word does when the
/// property is absent from `<w:rPr>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFormat {
    pub font_name: Option<String>,
    /// Size in half-points, as stored in `<w:sz w:val>`.
    pub size_half_points: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Underline style, e.g. `single` or `double`.
    pub underline: Option<String>,
    /// `RRGGBB` hex color.
    pub color: Option<String>,
}

impl RunFormat {
    /// Reads the supported properties from a `<w:rPr>` element.
    pub fn parse(properties: &str) -> Self {
        let mut format = RunFormat::default();
        for tag in xml::tags(properties).filter(|t| t.kind != TagKind::Close) {
            match tag.name {
                "w:rFonts" if format.font_name.is_none() => {
                    format.font_name = tag
                        .attribute("w:ascii")
                        .or_else(|| tag.attribute("w:hAnsi"))
                        .map(|name| name.into_owned());
                }
                "w:sz" if format.size_half_points.is_none() => {
                    format.size_half_points =
                        tag.attribute("w:val").and_then(|v| v.parse().ok());
                }
                "w:b" if format.bold.is_none() => {
                    format.bold = Some(toggle(tag.attribute("w:val").as_deref()));
                }
                "w:i" if format.italic.is_none() => {
                    format.italic = Some(toggle(tag.attribute("w:val").as_deref()));
                }
                "w:u" if format.underline.is_none() => {
                    format.underline = Some(
                        tag.attribute("w:val")
                            .map_or_else(|| "single".to_string(), |v| v.into_owned()),
                    );
                }
                "w:color" if format.color.is_none() => {
                    format.color = tag
                        .attribute("w:val")
                        .filter(|v| !v.eq_ignore_ascii_case("auto"))
                        .map(|v| v.into_owned());
                }
                _ => {}
            }
        }
        format
    }

    pub fn is_empty(&self) -> bool {
        *self == RunFormat::default()
    }

    /// `<w:rPr>` element in schema order, or nothing when no property is set.
    pub fn to_xml(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut out = String::from("<w:rPr>");
        if let Some(font) = &self.font_name {
            let font = xml::escape(font);
            out.push_str(&format!(r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}"/>"#));
        }
        if let Some(bold) = self.bold {
            out.push_str(if bold { "<w:b/>" } else { r#"<w:b w:val="0"/>"# });
        }
        if let Some(italic) = self.italic {
            out.push_str(if italic { "<w:i/>" } else { r#"<w:i w:val="0"/>"# });
        }
        if let Some(color) = &self.color {
            out.push_str(&format!(r#"<w:color w:val="{}"/>"#, xml::escape(color)));
        }
        if let Some(size) = self.size_half_points {
            out.push_str(&format!(r#"<w:sz w:val="{size}"/>"#));
        }
        if let Some(underline) = &self.underline {
            out.push_str(&format!(r#"<w:u w:val="{}"/>"#, xml::escape(underline)));
        }
        out.push_str("</w:rPr>");
        out
    }
}

/// On/off properties: absent value or anything but `0`/`false`/`off` is on.
fn toggle(value: Option<&str>) -> bool {
    !matches!(value, Some("0" | "false" | "off"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub format: RunFormat,
}

impl Run {
    pub fn new(text: impl Into<String>, format: RunFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    /// Reads a `<w:r>` element. Tabs and breaks become `\t` and `\n`.
    fn parse(run: &str) -> Self {
        let format = xml::element_ranges(run, "w:rPr")
            .first()
            .map(|range| RunFormat::parse(&run[range.clone()]))
            .unwrap_or_default();

        let mut text = String::new();
        let mut text_start = None;
        for tag in xml::tags(run) {
            match (tag.name, tag.kind) {
                ("w:t", TagKind::Open) => text_start = Some(tag.range.end),
                ("w:t", TagKind::Close) => {
                    if let Some(start) = text_start.take() {
                        text.push_str(&xml::unescape(&run[start..tag.range.start]));
                    }
                }
                ("w:tab", TagKind::Empty) => text.push('\t'),
                ("w:br" | "w:cr", TagKind::Empty) => text.push('\n'),
                _ => {}
            }
        }
        Self { text, format }
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::from("<w:r>");
        out.push_str(&self.format.to_xml());

        let mut pending = String::new();
        let flush = |pending: &mut String, out: &mut String| {
            if !pending.is_empty() {
                out.push_str(r#"<w:t xml:space="preserve">"#);
                out.push_str(&xml::escape(pending));
                out.push_str("</w:t>");
                pending.clear();
            }
        };
        for ch in self.text.chars() {
            match ch {
                '\t' => {
                    flush(&mut pending, &mut out);
                    out.push_str("<w:tab/>");
                }
                '\n' => {
                    flush(&mut pending, &mut out);
                    out.push_str("<w:br/>");
                }
                _ => pending.push(ch),
            }
        }
        flush(&mut pending, &mut out);

        out.push_str("</w:r>");
        out
    }
}

/// A `<w:p>` element that can be rebuilt from a new list of runs.
///
/// Until `set_runs` is called `to_xml` returns the source bytes unchanged.
/// A rebuilt paragraph keeps its opening tag and `<w:pPr>`; every other child
/// (runs, hyperlinks, bookmarks, proofing marks) is replaced by the new runs.
#[derive(Debug, Clone)]
pub struct Paragraph {
    source: String,
    open_tag: String,
    properties: Option<String>,
    runs: Vec<Run>,
    rebuilt: bool,
}

impl Paragraph {
    pub fn parse(source: &str) -> Self {
        let open_end = source.find('>').map_or(source.len(), |i| i + 1);
        let open_tag = source[..open_end].to_string();
        let inner_end = source.rfind("</").filter(|&i| i >= open_end).unwrap_or(source.len());
        let inner = &source[open_end..inner_end];

        let properties = xml::element_ranges(inner, "w:pPr")
            .first()
            .map(|range| inner[range.clone()].to_string());
        let runs = xml::element_ranges(inner, "w:r")
            .into_iter()
            .map(|range| Run::parse(&inner[range]))
            .collect();

        Self {
            source: source.to_string(),
            open_tag,
            properties,
            runs,
            rebuilt: false,
        }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn set_runs(&mut self, runs: Vec<Run>) {
        self.runs = runs;
        self.rebuilt = true;
    }

    pub fn to_xml(&self) -> String {
        if !self.rebuilt {
            return self.source.clone();
        }
        let mut out = self.open_tag.clone();
        if let Some(properties) = &self.properties {
            out.push_str(properties);
        }
        for run in &self.runs {
            out.push_str(&run.to_xml());
        }
        out.push_str("</w:p>");
        out
    }
}

/// The text-bearing unit the substitution algorithm is written against.
pub trait TextContainer {
    fn text(&self) -> String;
    fn runs(&self) -> &[Run];
    /// Replaces every run, marking the container as rewritten.
    fn set_runs(&mut self, runs: Vec<Run>);
    fn to_xml(&self) -> String;
}

/// Paragraph directly in the document body.
#[derive(Debug, Clone)]
pub struct BodyParagraph(Paragraph);

impl BodyParagraph {
    pub fn parse(source: &str) -> Self {
        Self(Paragraph::parse(source))
    }
}

impl TextContainer for BodyParagraph {
    fn text(&self) -> String {
        self.0.text()
    }

    fn runs(&self) -> &[Run] {
        self.0.runs()
    }

    fn set_runs(&mut self, runs: Vec<Run>) {
        self.0.set_runs(runs);
    }

    fn to_xml(&self) -> String {
        self.0.to_xml()
    }
}

/// Paragraph inside a table cell; `cell` is the cell's ordinal in the part.
#[derive(Debug, Clone)]
pub struct CellParagraph {
    pub cell: usize,
    paragraph: Paragraph,
}

impl CellParagraph {
    pub fn parse(source: &str, cell: usize) -> Self {
        Self {
            cell,
            paragraph: Paragraph::parse(source),
        }
    }
}

impl TextContainer for CellParagraph {
    fn text(&self) -> String {
        self.paragraph.text()
    }

    fn runs(&self) -> &[Run] {
        self.paragraph.runs()
    }

    fn set_runs(&mut self, runs: Vec<Run>) {
        self.paragraph.set_runs(runs);
    }

    fn to_xml(&self) -> String {
        self.paragraph.to_xml()
    }
}

/// Adjacent runs of a paragraph that also hosts a text box.
///
/// Only the runs themselves are rewritten so the text box between groups is
/// left in place.
#[derive(Debug, Clone)]
pub struct RunGroup {
    source: String,
    runs: Vec<Run>,
    rebuilt: bool,
}

impl RunGroup {
    pub fn parse(source: &str) -> Self {
        let runs = xml::element_ranges(source, "w:r")
            .into_iter()
            .map(|range| Run::parse(&source[range]))
            .collect();
        Self {
            source: source.to_string(),
            runs,
            rebuilt: false,
        }
    }
}

impl TextContainer for RunGroup {
    fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    fn runs(&self) -> &[Run] {
        &self.runs
    }

    fn set_runs(&mut self, runs: Vec<Run>) {
        self.runs = runs;
        self.rebuilt = true;
    }

    fn to_xml(&self) -> String {
        if !self.rebuilt {
            return self.source.clone();
        }
        self.runs.iter().map(Run::to_xml).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLED: &str = concat!(
        r#"<w:p w:rsidR="00AB"><w:pPr><w:jc w:val="center"/><w:rPr><w:b/></w:rPr></w:pPr>"#,
        r#"<w:r><w:rPr><w:rFonts w:ascii="Bookman Old Style" w:hAnsi="Bookman Old Style"/>"#,
        r#"<w:b/><w:i w:val="0"/><w:color w:val="1F3864"/><w:sz w:val="24"/><w:u w:val="single"/></w:rPr>"#,
        r#"<w:t xml:space="preserve">District: </w:t></w:r>"#,
        r#"<w:r><w:rPr><w:i/></w:rPr><w:t>(DISTRICT)</w:t><w:tab/><w:t>A &amp; B</w:t></w:r>"#,
        r#"</w:p>"#
    );

    #[test]
    fn runs_and_text_are_read() {
        let paragraph = Paragraph::parse(STYLED);
        assert_eq!(paragraph.runs().len(), 2);
        assert_eq!(paragraph.text(), "District: (DISTRICT)\tA & B");

        let first = &paragraph.runs()[0].format;
        assert_eq!(first.font_name.as_deref(), Some("Bookman Old Style"));
        assert_eq!(first.size_half_points, Some(24));
        assert_eq!(first.bold, Some(true));
        assert_eq!(first.italic, Some(false));
        assert_eq!(first.underline.as_deref(), Some("single"));
        assert_eq!(first.color.as_deref(), Some("1F3864"));

        let second = &paragraph.runs()[1].format;
        assert_eq!(second.italic, Some(true));
        assert_eq!(second.bold, None);
    }

    #[test]
    fn untouched_paragraph_serializes_to_source() {
        let paragraph = Paragraph::parse(STYLED);
        assert_eq!(paragraph.to_xml(), STYLED);
    }

    #[test]
    fn rebuilt_paragraph_keeps_properties() {
        let mut paragraph = Paragraph::parse(STYLED);
        let format = paragraph.runs()[0].format.clone();
        paragraph.set_runs(vec![Run::new("Line one\nA < B\tend", format)]);

        let xml = paragraph.to_xml();
        assert!(xml.starts_with(r#"<w:p w:rsidR="00AB"><w:pPr><w:jc w:val="center"/>"#));
        assert!(xml.ends_with("</w:p>"));
        assert!(xml.contains(r#"<w:rFonts w:ascii="Bookman Old Style" w:hAnsi="Bookman Old Style"/>"#));
        assert!(xml.contains(r#"<w:t xml:space="preserve">Line one</w:t><w:br/>"#));
        assert!(xml.contains("A &lt; B</w:t><w:tab/>"));

        let reparsed = Paragraph::parse(&xml);
        assert_eq!(reparsed.text(), "Line one\nA < B\tend");
        assert_eq!(reparsed.runs()[0].format, paragraph.runs()[0].format);
    }

    #[test]
    fn paragraph_without_runs() {
        let paragraph = Paragraph::parse(r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr></w:p>"#);
        assert!(paragraph.runs().is_empty());
        assert_eq!(paragraph.text(), "");
    }

    #[test]
    fn color_auto_and_bare_underline() {
        let format =
            RunFormat::parse(r#"<w:rPr><w:color w:val="auto"/><w:u/><w:b w:val="false"/></w:rPr>"#);
        assert_eq!(format.color, None);
        assert_eq!(format.underline.as_deref(), Some("single"));
        assert_eq!(format.bold, Some(false));
        assert_eq!(RunFormat::default().to_xml(), "");
    }

    #[test]
    fn run_group_rebuilds_only_its_runs() {
        let source = r#"<w:r><w:rPr><w:b/></w:rPr><w:t>(DIS</w:t></w:r><w:r><w:t>TRICT)</w:t></w:r>"#;
        let mut group = RunGroup::parse(source);
        assert_eq!(group.text(), "(DISTRICT)");
        assert_eq!(group.to_xml(), source);

        let format = group.runs()[0].format.clone();
        group.set_runs(vec![Run::new("KOLLAM", format)]);
        assert_eq!(
            group.to_xml(),
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">KOLLAM</w:t></w:r>"#
        );
    }
}
