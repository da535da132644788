use crate::docx::package::DocxPackage;
use crate::docx::paragraph::{BodyParagraph, CellParagraph, Run, RunGroup, TextContainer};
use crate::docx::xml::{self, TagKind};
use crate::docx::DocxError;
use crate::replacements::ReplacementMap;
use log::{debug, warn};
use regex::{Captures, Regex};
use std::fs;
use std::io::ErrorKind;
use std::ops::Range;
use std::path::Path;

/// Where a located paragraph sits in the document part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Body,
    /// Inside the table cell with this ordinal.
    TableCell(usize),
}

/// What a located span holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// A whole leaf `<w:p>` element.
    Paragraph,
    /// Adjacent `<w:r>` elements of a paragraph that hosts a text box.
    HostRuns,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphSpan {
    pub range: Range<usize>,
    pub location: Location,
    pub kind: SpanKind,
}

/// Reads the template at `path` and fills it with `replacements`.
pub fn render_template(path: &Path, replacements: &ReplacementMap) -> Result<Vec<u8>, DocxError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(DocxError::TemplateNotFound(path.to_path_buf()))
        }
        Err(source) => {
            return Err(DocxError::TemplateIo {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    substitute(&bytes, replacements)
}

/// Fills `template` (the bytes of a `.docx`) and returns the new package.
pub fn substitute(template: &[u8], replacements: &ReplacementMap) -> Result<Vec<u8>, DocxError> {
    let mut package = DocxPackage::from_bytes(template)?;
    let document = package.document_xml()?;

    let (updated, rewritten) = substitute_document_xml(&document, replacements);
    debug!(
        "Rewrote {} paragraphs using {} replacements",
        rewritten,
        replacements.len()
    );
    if rewritten > 0 {
        package.set_document_xml(updated);
    }
    package.to_bytes()
}

/// Applies `replacements` to every paragraph of a `word/document.xml` part.
///
/// Returns the new part and the number of paragraphs (or run groups) that
/// were rebuilt.
pub fn substitute_document_xml(document: &str, replacements: &ReplacementMap) -> (String, usize) {
    let mut out = String::with_capacity(document.len());
    let mut cursor = 0;
    let mut rewritten = 0;

    for span in locate_paragraphs(document) {
        out.push_str(&document[cursor..span.range.start]);
        let source = &document[span.range.clone()];

        let replaced = match (span.kind, span.location) {
            (SpanKind::HostRuns, _) => replace_in(&mut RunGroup::parse(source), replacements),
            (SpanKind::Paragraph, Location::Body) => {
                replace_in(&mut BodyParagraph::parse(source), replacements)
            }
            (SpanKind::Paragraph, Location::TableCell(cell)) => {
                let mut paragraph = CellParagraph::parse(source, cell);
                let xml = replace_in(&mut paragraph, replacements);
                if xml.is_some() {
                    debug!("Filled placeholders in table cell {}", paragraph.cell);
                }
                xml
            }
        };
        match replaced {
            Some(xml) => {
                out.push_str(&xml);
                rewritten += 1;
            }
            None => out.push_str(source),
        }
        cursor = span.range.end;
    }

    out.push_str(&document[cursor..]);
    (out, rewritten)
}

/// Runs the replacement on one container and returns its new XML, or `None`
/// when the container was left as it was.
fn replace_in<C: TextContainer>(container: &mut C, replacements: &ReplacementMap) -> Option<String> {
    apply_replacements(container, replacements).then(|| container.to_xml())
}

/// Replaces every placeholder found in the container's text in one pass.
///
/// Inserted values are never scanned again, and where two placeholders could
/// match at the same position the longer one wins. The container is rebuilt
/// as a single run with the first run's formatting. Returns `false`, leaving
/// the container untouched, when its text holds no placeholder.
pub fn apply_replacements<C: TextContainer>(
    container: &mut C,
    replacements: &ReplacementMap,
) -> bool {
    let original = container.text();
    let mut present: Vec<&str> = replacements
        .iter()
        .map(|(placeholder, _)| placeholder)
        .filter(|placeholder| !placeholder.is_empty() && original.contains(*placeholder))
        .collect();
    if present.is_empty() {
        return false;
    }
    present.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let pattern = present
        .iter()
        .map(|placeholder| regex::escape(placeholder))
        .collect::<Vec<_>>()
        .join("|");
    let matcher = match Regex::new(&pattern) {
        Ok(matcher) => matcher,
        Err(e) => {
            warn!("Skipping paragraph, placeholder pattern rejected: {}", e);
            return false;
        }
    };
    let updated = matcher
        .replace_all(&original, |caps: &Captures| {
            replacements.value_or(&caps[0], &caps[0]).to_string()
        })
        .into_owned();

    let Some(first) = container.runs().first() else {
        container.set_runs(vec![Run::new(updated, Default::default())]);
        return true;
    };
    if updated == original {
        return false;
    }
    let format = first.format.clone();
    container.set_runs(vec![Run::new(updated, format)]);
    true
}

/// Finds every leaf paragraph in document order.
///
/// A paragraph that contains other paragraphs (a text box host) is not
/// returned whole; its own runs outside the text box are returned as
/// `SpanKind::HostRuns` groups instead.
pub fn locate_paragraphs(document: &str) -> Vec<ParagraphSpan> {
    // (start, has nested paragraph, location)
    let mut open: Vec<(usize, bool, Location)> = Vec::new();
    let mut cells: Vec<usize> = Vec::new();
    let mut next_cell = 0usize;
    let mut spans = Vec::new();

    for tag in xml::tags(document) {
        match (tag.name, tag.kind) {
            ("w:tc", TagKind::Open) => {
                cells.push(next_cell);
                next_cell += 1;
            }
            ("w:tc", TagKind::Close) => {
                cells.pop();
            }
            ("w:p", TagKind::Open) => {
                if let Some(parent) = open.last_mut() {
                    parent.1 = true;
                }
                let location = match cells.last() {
                    Some(&cell) => Location::TableCell(cell),
                    None => Location::Body,
                };
                open.push((tag.range.start, false, location));
            }
            ("w:p", TagKind::Close) => {
                if let Some((start, nested, location)) = open.pop() {
                    let range = start..tag.range.end;
                    if nested {
                        spans.extend(host_run_groups(document, range, location));
                    } else {
                        spans.push(ParagraphSpan {
                            range,
                            location,
                            kind: SpanKind::Paragraph,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    spans.sort_by_key(|span| span.range.start);
    spans
}

/// Groups the runs of a text box host that carry no paragraph of their own.
///
/// Runs only join a group when nothing but whitespace separates them, so
/// every group can be rewritten without touching the markup around it.
fn host_run_groups(
    document: &str,
    paragraph: Range<usize>,
    location: Location,
) -> Vec<ParagraphSpan> {
    let source = &document[paragraph.clone()];
    let mut groups: Vec<Range<usize>> = Vec::new();
    let mut previous_plain = false;

    for run in xml::element_ranges(source, "w:r") {
        let hosts_paragraph = xml::tags(&source[run.clone()]).any(|tag| tag.name == "w:p");
        if hosts_paragraph {
            previous_plain = false;
            continue;
        }
        match groups.last_mut() {
            Some(group)
                if previous_plain && source[group.end..run.start].trim().is_empty() =>
            {
                group.end = run.end;
            }
            _ => groups.push(run),
        }
        previous_plain = true;
    }

    groups
        .into_iter()
        .map(|group| ParagraphSpan {
            range: paragraph.start + group.start..paragraph.start + group.end,
            location,
            kind: SpanKind::HostRuns,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::docx::package::{write_archive, DOCUMENT_PART};

    pub(crate) fn document(body: &str) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
                r#"<w:body>{}<w:sectPr/></w:body></w:document>"#
            ),
            body
        )
    }

    pub(crate) fn docx(body: &str) -> Vec<u8> {
        write_archive(&[
            (
                "[Content_Types].xml".to_string(),
                br#"<?xml version="1.0"?><Types/>"#.to_vec(),
            ),
            (DOCUMENT_PART.to_string(), document(body).into_bytes()),
        ])
        .unwrap()
    }

    pub(crate) fn paragraph_texts(docx: &[u8]) -> Vec<String> {
        let xml = DocxPackage::from_bytes(docx).unwrap().document_xml().unwrap();
        locate_paragraphs(&xml)
            .into_iter()
            .filter(|span| span.kind == SpanKind::Paragraph)
            .map(|span| BodyParagraph::parse(&xml[span.range]).text())
            .collect()
    }

    fn map(pairs: &[(&str, &str)]) -> ReplacementMap {
        pairs.iter().copied().collect()
    }

    const BOLD_RUN: &str = r#"<w:rPr><w:rFonts w:ascii="Arial"/><w:b/><w:sz w:val="28"/></w:rPr>"#;

    #[test]
    fn end_to_end_substitution() {
        let body = format!(
            r#"<w:p><w:r>{BOLD_RUN}<w:t xml:space="preserve">District: (DISTRICT), </w:t></w:r><w:r><w:t>Date: (DATE1)</w:t></w:r></w:p>"#
        );
        let output = substitute(
            &docx(&body),
            &map(&[("(DISTRICT)", "ERNAKULAM"), ("(DATE1)", "01/02/2024")]),
        )
        .unwrap();

        assert_eq!(
            paragraph_texts(&output),
            vec!["District: ERNAKULAM, Date: 01/02/2024".to_string()]
        );

        let xml = DocxPackage::from_bytes(&output).unwrap().document_xml().unwrap();
        let span = &locate_paragraphs(&xml)[0];
        let paragraph = BodyParagraph::parse(&xml[span.range.clone()]);
        assert_eq!(paragraph.runs().len(), 1);
        let format = &paragraph.runs()[0].format;
        assert_eq!(format.font_name.as_deref(), Some("Arial"));
        assert_eq!(format.bold, Some(true));
        assert_eq!(format.size_half_points, Some(28));
    }

    #[test]
    fn paragraphs_without_placeholders_are_untouched() {
        let plain = r#"<w:p w:rsidR="0012"><w:r><w:rPr><w:b/></w:rPr><w:t>Bold</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve"> italic</w:t></w:r><w:proofErr w:type="spellStart"/></w:p>"#;
        let filled = r#"<w:p><w:r><w:t>(PETITIONER)</w:t></w:r></w:p>"#;
        let doc = document(&format!("{plain}{filled}"));

        let (updated, rewritten) =
            substitute_document_xml(&doc, &map(&[("(PETITIONER)", "Ravi")]));
        assert_eq!(rewritten, 1);
        assert!(updated.contains(plain));
        assert!(!updated.contains("(PETITIONER)"));
        assert!(updated.contains(r#"<w:t xml:space="preserve">Ravi</w:t>"#));
    }

    #[test]
    fn nothing_to_replace_leaves_part_identical() {
        let doc = document(r#"<w:p><w:r><w:t>(UNKNOWN) stays</w:t></w:r></w:p>"#);
        let (updated, rewritten) = substitute_document_xml(&doc, &map(&[("(DISTRICT)", "X")]));
        assert_eq!(rewritten, 0);
        assert_eq!(updated, doc);
    }

    #[test]
    fn unmatched_placeholders_remain_verbatim() {
        let doc = document(r#"<w:p><w:r><w:t>(DISTRICT) and (MISSING)</w:t></w:r></w:p>"#);
        let (updated, _) = substitute_document_xml(&doc, &map(&[("(DISTRICT)", "KOLLAM")]));
        assert!(updated.contains("KOLLAM and (MISSING)"));
    }

    #[test]
    fn table_cell_paragraphs_are_replaced() {
        let body = concat!(
            r#"<w:tbl><w:tblPr/><w:tr><w:tc><w:tcPr><w:tcW w:w="100"/></w:tcPr>"#,
            r#"<w:p><w:r><w:t>Petitioner: (PETITIONER)</w:t></w:r></w:p></w:tc>"#,
            r#"<w:tc><w:p><w:r><w:t>Amount: (TOTAL_AMOUNT)</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#
        );
        let doc = document(body);

        let spans = locate_paragraphs(&doc);
        let locations: Vec<Location> = spans.iter().map(|s| s.location).collect();
        assert_eq!(
            locations,
            vec![Location::TableCell(0), Location::TableCell(1)]
        );

        let output = substitute(
            &docx(body),
            &map(&[("(PETITIONER)", "Ravi"), ("(TOTAL_AMOUNT)", "1,00,000")]),
        )
        .unwrap();
        assert_eq!(
            paragraph_texts(&output),
            vec!["Petitioner: Ravi".to_string(), "Amount: 1,00,000".to_string()]
        );
    }

    #[test]
    fn placeholder_split_across_runs_is_found() {
        let doc = document(r#"<w:p><w:r><w:t>(DIS</w:t></w:r><w:r><w:t>TRICT)</w:t></w:r></w:p>"#);
        let (updated, rewritten) = substitute_document_xml(&doc, &map(&[("(DISTRICT)", "IDUKKI")]));
        assert_eq!(rewritten, 1);
        assert!(updated.contains(">IDUKKI</w:t>"));
    }

    #[test]
    fn replacement_values_are_escaped() {
        let doc = document(r#"<w:p><w:r><w:t>(ADVOCATE)</w:t></w:r></w:p>"#);
        let (updated, _) = substitute_document_xml(&doc, &map(&[("(ADVOCATE)", "Nair & Co <Kochi>")]));
        assert!(updated.contains("Nair &amp; Co &lt;Kochi&gt;"));
    }

    #[test]
    fn text_box_paragraphs_are_handled_individually() {
        let body = concat!(
            r#"<w:p><w:r><w:t>Outer (DIS</w:t></w:r> <w:r><w:t>TRICT)</w:t></w:r><w:r><w:pict><w:txbxContent>"#,
            r#"<w:p><w:r><w:t>Inner (DISTRICT)</w:t></w:r></w:p>"#,
            r#"</w:txbxContent></w:pict></w:r><w:r><w:t xml:space="preserve"> near (TOWN)</w:t></w:r></w:p>"#
        );
        let doc = document(body);
        let kinds: Vec<SpanKind> = locate_paragraphs(&doc).iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SpanKind::HostRuns, SpanKind::Paragraph, SpanKind::HostRuns]
        );

        let (updated, rewritten) = substitute_document_xml(
            &doc,
            &map(&[("(DISTRICT)", "WAYANAD"), ("(TOWN)", "Kalpetta")]),
        );
        assert_eq!(rewritten, 3);
        let outer = updated.find("Outer WAYANAD").unwrap();
        let inner = updated.find("Inner WAYANAD").unwrap();
        let near = updated.find(" near Kalpetta").unwrap();
        assert!(outer < inner && inner < near);
        assert!(updated.contains("<w:pict><w:txbxContent><w:p>"));
        assert!(!updated.contains("(DIS"));
    }

    #[test]
    fn inserted_values_are_not_rescanned() {
        let doc = document(r#"<w:p><w:r><w:t>(PETITIONER) of (DISTRICT)</w:t></w:r></w:p>"#);
        for _ in 0..50 {
            let replacements = map(&[("(PETITIONER)", "(DISTRICT) Ravi"), ("(DISTRICT)", "KOLLAM")]);
            let (updated, rewritten) = substitute_document_xml(&doc, &replacements);
            assert_eq!(rewritten, 1);
            assert!(updated.contains(">(DISTRICT) Ravi of KOLLAM</w:t>"));
        }
    }

    #[test]
    fn longer_placeholder_wins_at_the_same_position() {
        let doc = document(r#"<w:p><w:r><w:t>(DATE)(TIME) and (DATE)</w:t></w:r></w:p>"#);
        let (updated, _) =
            substitute_document_xml(&doc, &map(&[("(DATE)", "today"), ("(DATE)(TIME)", "now")]));
        assert!(updated.contains(">now and today</w:t>"));
    }

    #[test]
    fn missing_template_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_template(&dir.path().join("absent.docx"), &ReplacementMap::new())
            .unwrap_err();
        assert!(matches!(err, DocxError::TemplateNotFound(_)));
    }

    #[test]
    fn corrupt_template_is_a_substitution_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"PK not really").unwrap();
        let err = render_template(&path, &ReplacementMap::new()).unwrap_err();
        assert!(matches!(err, DocxError::Archive(_)));
    }

    #[test]
    fn other_entries_survive_substitution() {
        let template = write_archive(&[
            ("[Content_Types].xml".to_string(), b"<Types/>".to_vec()),
            (
                DOCUMENT_PART.to_string(),
                document(r#"<w:p><w:r><w:t>(TOWN)</w:t></w:r></w:p>"#).into_bytes(),
            ),
            ("word/styles.xml".to_string(), b"<w:styles/>".to_vec()),
        ])
        .unwrap();
        let output = substitute(&template, &map(&[("(TOWN)", "Aluva")])).unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(output)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["[Content_Types].xml", DOCUMENT_PART, "word/styles.xml"]
        );
    }
}
