use crate::docx::xml::escape;
use crate::replacements::computed::ADDRESS_FLAG;
use common::model::family::{FamilyProfile, TemplateEntry};
use common::model::field::{FieldDatatype, FieldDefinition};
use std::fmt::Write;

/// Full HTML page for `family`.
///
/// Families with templates get one button per `docType` and a zip button.
/// `legacy` adds the plain submit that posts to `/`.
pub fn form_page(family: &FamilyProfile, legacy: bool) -> String {
    let title = if family.title.is_empty() {
        &family.name
    } else {
        &family.title
    };
    let title = escape(title);
    let action = if legacy {
        "/"
    } else {
        "/download-all-documents-zip"
    };

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{title}</title>");
    html.push_str("<link rel=\"stylesheet\" href=\"/static/form.css\">\n</head>\n<body>\n<main>\n");
    let _ = writeln!(html, "<h1>{title}</h1>");
    let _ = writeln!(html, r#"<form method="post" action="{action}">"#);

    for field in &family.fields {
        field_html(&mut html, field);
    }
    let _ = writeln!(
        html,
        r#"<div class="field checkbox"><input type="checkbox" id="{ADDRESS_FLAG}" name="{ADDRESS_FLAG}"><label for="{ADDRESS_FLAG}">Include petitioner address</label></div>"#
    );

    html.push_str("<div class=\"actions\">\n");
    if legacy {
        html.push_str("<button type=\"submit\">Generate Document</button>\n");
    }
    for entry in &family.templates {
        let _ = writeln!(
            html,
            r#"<button type="submit" formaction="/download-document/{}">{}</button>"#,
            escape(&entry.doc_type),
            escape(&document_label(entry))
        );
    }
    if !family.templates.is_empty() {
        html.push_str(
            "<button type=\"submit\" class=\"secondary\" formaction=\"/download-all-documents-zip\">Download All (zip)</button>\n",
        );
    }
    html.push_str("</div>\n</form>\n</main>\n</body>\n</html>\n");
    html
}

fn field_html(html: &mut String, field: &FieldDefinition) {
    let name = escape(&field.name);
    let value = escape(field.default.as_deref().unwrap_or(""));
    let required = if field.required { " required" } else { "" };
    let label_class = if field.required { r#" class="required""# } else { "" };

    let _ = writeln!(html, r#"<div class="field">"#);
    let _ = writeln!(
        html,
        r#"<label for="{name}"{label_class}>{}</label>"#,
        escape(&field.label)
    );
    let _ = match field.datatype {
        FieldDatatype::TextArea => writeln!(
            html,
            r#"<textarea id="{name}" name="{name}"{required}>{value}</textarea>"#
        ),
        FieldDatatype::Text => writeln!(
            html,
            r#"<input type="text" id="{name}" name="{name}" value="{value}"{required}>"#
        ),
        FieldDatatype::Number => writeln!(
            html,
            r#"<input type="number" id="{name}" name="{name}" value="{value}" min="0" step="any"{required}>"#
        ),
        FieldDatatype::Date => writeln!(
            html,
            r#"<input type="date" id="{name}" name="{name}" value="{value}"{required}>"#
        ),
    };
    html.push_str("</div>\n");
}

/// `notice-to-all-respondants-template` → `Notice To All Respondants`.
fn document_label(entry: &TemplateEntry) -> String {
    entry
        .doc_type
        .trim_end_matches("-template")
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replacements::tests::family;

    #[test]
    fn inputs_follow_datatypes() {
        let html = form_page(&family(), true);
        assert!(html.contains(r#"<input type="text" id="district" name="district" value="" required>"#));
        assert!(html.contains(r#"<input type="date" id="date1" name="date1" value="">"#));
        assert!(html.contains(r#"<textarea id="details" name="details"></textarea>"#));
        assert!(html.contains(r#"type="number" id="market_value""#));
        assert!(html.contains(r#"<label for="district" class="required">district</label>"#));
        assert!(html.contains(r#"name="petitioner_address_checker""#));
        assert!(html.contains("Generate Document"));
        assert!(!html.contains("Download All"));
    }

    #[test]
    fn defaults_and_labels_are_escaped() {
        let mut family = family();
        family.title = "Claims & Petitions".to_string();
        family.fields[2].default = Some(r#"say "hi" <now>"#.to_string());
        family.templates = vec![TemplateEntry {
            doc_type: "notice-to-all-respondants-template".to_string(),
            file: "n.docx".to_string(),
        }];

        let html = form_page(&family, false);
        assert!(html.contains("<h1>Claims &amp; Petitions</h1>"));
        assert!(html.contains(r#"value="say &quot;hi&quot; &lt;now&gt;""#));
        assert!(html.contains(
            r#"formaction="/download-document/notice-to-all-respondants-template">Notice To All Respondants</button>"#
        ));
        assert!(html.contains("Download All (zip)"));
        assert!(!html.contains("Generate Document"));
    }
}
