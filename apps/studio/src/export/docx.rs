//! Structured DOCX export, built from the canonical document rather than any rendered surface.
//!
//! `build` produces a plain block tree (headings, paragraphs, runs); `package` serializes it
//! into an OOXML zip. Sections are always emitted in canonical order, empty or not.

use std::io::{Cursor, Write};

use chrono::{SecondsFormat, Utc};
use quick_xml::escape::escape;
use serde::Serialize;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::export::{Artifact, PackagingError};
use crate::models::resume::ResumeData;
use crate::templates::SectionKind;

/// Colour of the date lines.
const MUTED_HEX: &str = "888888";

// ────────────────────────────────────────────────────────────────────────────
// Block tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<&'static str>,
}

impl Run {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            color: None,
        }
    }

    fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    fn italic(text: impl Into<String>) -> Self {
        Self {
            italic: true,
            ..Self::plain(text)
        }
    }

    fn muted(text: impl Into<String>) -> Self {
        Self {
            color: Some(MUTED_HEX),
            ..Self::plain(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Level 0 is the document title, level 1 a section heading.
    Heading {
        level: u8,
        text: String,
        section: Option<SectionKind>,
        centered: bool,
        bottom_border: bool,
    },
    Paragraph {
        runs: Vec<Run>,
        centered: bool,
        bullet: bool,
    },
}

impl Block {
    fn paragraph(runs: Vec<Run>) -> Self {
        Block::Paragraph {
            runs,
            centered: false,
            bullet: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocxDocument {
    pub title: String,
    pub blocks: Vec<Block>,
}

#[cfg(test)]
impl DocxDocument {
    /// Section headings in emission order.
    pub fn sections(&self) -> Vec<SectionKind> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { section, .. } => *section,
                Block::Paragraph { .. } => None,
            })
            .collect()
    }

    /// All text in emission order, one entry per heading or paragraph.
    pub fn texts(&self) -> Vec<String> {
        self.blocks
            .iter()
            .map(|b| match b {
                Block::Heading { text, .. } => text.clone(),
                Block::Paragraph { runs, .. } => runs.iter().map(|r| r.text.as_str()).collect(),
            })
            .collect()
    }
}

pub fn build(doc: &ResumeData) -> DocxDocument {
    let info = &doc.personal_info;
    let mut blocks = vec![
        Block::Heading {
            level: 0,
            text: info.name.clone(),
            section: None,
            centered: true,
            bottom_border: false,
        },
        Block::Paragraph {
            runs: vec![Run::plain(info.contact_fields().join(" | "))],
            centered: true,
            bullet: false,
        },
    ];

    for kind in SectionKind::CANONICAL_ORDER {
        blocks.push(Block::Heading {
            level: 1,
            text: kind.title().to_string(),
            section: Some(kind),
            centered: false,
            bottom_border: true,
        });
        section_body(doc, kind, &mut blocks);
    }

    DocxDocument {
        title: info.name.clone(),
        blocks,
    }
}

fn section_body(doc: &ResumeData, kind: SectionKind, blocks: &mut Vec<Block>) {
    match kind {
        SectionKind::Summary => {
            if !doc.summary.trim().is_empty() {
                blocks.push(Block::paragraph(vec![Run::plain(&doc.summary)]));
            }
        }
        SectionKind::WorkExperience => {
            for job in doc.work_experience.iter() {
                let mut heading = vec![Run::bold(&job.job_title)];
                let employer = job.employer_line();
                if !employer.is_empty() {
                    heading.push(Run::italic(format!(" | {employer}")));
                }
                blocks.push(Block::paragraph(heading));
                blocks.push(Block::paragraph(vec![Run::muted(job.date_range())]));
                for bullet in job.bullets() {
                    blocks.push(Block::Paragraph {
                        runs: vec![Run::plain(bullet)],
                        centered: false,
                        bullet: true,
                    });
                }
            }
        }
        SectionKind::Education => {
            for edu in doc.education.iter() {
                let mut line = vec![Run::bold(edu.qualification())];
                if !edu.institution.trim().is_empty() {
                    line.push(Run::plain(format!(" | {}", edu.institution)));
                }
                blocks.push(Block::paragraph(line));
                blocks.push(Block::paragraph(vec![Run::muted(edu.date_range())]));
            }
        }
        SectionKind::Skills => {
            let names = doc.skill_names();
            if !names.is_empty() {
                blocks.push(Block::paragraph(vec![Run::plain(names.join(", "))]));
            }
        }
        SectionKind::Projects => {
            for p in doc.projects.iter() {
                let mut line = vec![Run::bold(&p.name)];
                if !p.url.trim().is_empty() {
                    line.push(Run::plain(format!(" | {}", p.url)));
                }
                blocks.push(Block::paragraph(line));
                if !p.description.trim().is_empty() {
                    blocks.push(Block::paragraph(vec![Run::plain(&p.description)]));
                }
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OOXML packaging
// ────────────────────────────────────────────────────────────────────────────

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="80"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:spacing w:after="120"/></w:pPr><w:rPr><w:b/><w:sz w:val="48"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="120" w:after="60"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="24"/></w:rPr></w:style></w:styles>"#;

const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

/// US letter with one-inch margins, in twentieths of a point.
const SECTION_PROPERTIES: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#;

pub fn document_xml(doc: &DocxDocument) -> String {
    let mut xml = String::with_capacity(8 * 1024);
    xml.push_str(XML_HEADER);
    xml.push_str(&format!(r#"<w:document xmlns:w="{W_NS}"><w:body>"#));

    for block in &doc.blocks {
        match block {
            Block::Heading {
                level,
                text,
                centered,
                bottom_border,
                ..
            } => {
                let style = if *level == 0 {
                    "Title".to_string()
                } else {
                    format!("Heading{level}")
                };
                xml.push_str("<w:p><w:pPr>");
                xml.push_str(&format!(r#"<w:pStyle w:val="{style}"/>"#));
                if *bottom_border {
                    xml.push_str(
                        r#"<w:pBdr><w:bottom w:val="single" w:sz="6" w:space="1" w:color="auto"/></w:pBdr>"#,
                    );
                }
                if *centered {
                    xml.push_str(r#"<w:jc w:val="center"/>"#);
                }
                xml.push_str("</w:pPr>");
                push_run(&mut xml, &Run::plain(text.as_str()));
                xml.push_str("</w:p>");
            }
            Block::Paragraph {
                runs,
                centered,
                bullet,
            } => {
                xml.push_str("<w:p>");
                if *centered || *bullet {
                    xml.push_str("<w:pPr>");
                    if *bullet {
                        xml.push_str(
                            r#"<w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr>"#,
                        );
                    }
                    if *centered {
                        xml.push_str(r#"<w:jc w:val="center"/>"#);
                    }
                    xml.push_str("</w:pPr>");
                }
                for run in runs {
                    push_run(&mut xml, run);
                }
                xml.push_str("</w:p>");
            }
        }
    }

    xml.push_str(SECTION_PROPERTIES);
    xml.push_str("</w:body></w:document>");
    xml
}

fn push_run(xml: &mut String, run: &Run) {
    xml.push_str("<w:r>");
    if run.bold || run.italic || run.color.is_some() {
        xml.push_str("<w:rPr>");
        if run.bold {
            xml.push_str("<w:b/>");
        }
        if run.italic {
            xml.push_str("<w:i/>");
        }
        if let Some(color) = run.color {
            xml.push_str(&format!(r#"<w:color w:val="{color}"/>"#));
        }
        xml.push_str("</w:rPr>");
    }
    xml.push_str(r#"<w:t xml:space="preserve">"#);
    xml.push_str(&escape_text(&run.text));
    xml.push_str("</w:t></w:r>");
}

/// Escapes markup and removes characters XML 1.0 cannot carry at all. Page and line
/// breaks left over from extracted PDF text become spaces; other controls are dropped.
fn escape_text(text: &str) -> String {
    let legal: String = text
        .chars()
        .filter_map(|c| match c {
            '\t' | '\n' | '\r' => Some(c),
            '\u{0B}' | '\u{0C}' => Some(' '),
            '\u{00}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}' => None,
            _ => Some(c),
        })
        .collect();
    escape(legal.as_str()).into_owned()
}

fn core_xml(title: &str) -> String {
    let created = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        r#"{XML_HEADER}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{title}</dc:title><dc:creator>resume-studio</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{created}</dcterms:modified></cp:coreProperties>"#,
        title = escape_text(title),
    )
}

/// Zips the block tree into a `.docx` package.
pub fn package(doc: &DocxDocument) -> Result<Vec<u8>, PackagingError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, String); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", ROOT_RELS_XML.to_string()),
        ("word/document.xml", document_xml(doc)),
        ("word/styles.xml", STYLES_XML.to_string()),
        ("word/numbering.xml", NUMBERING_XML.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.to_string()),
        ("docProps/core.xml", core_xml(&doc.title)),
    ];
    for (name, body) in parts {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Builds and packs a snapshot off the async runtime.
pub async fn export_docx(doc: ResumeData, base_name: &str) -> Result<Artifact, PackagingError> {
    let (bytes, blocks) = tokio::task::spawn_blocking(move || -> Result<_, PackagingError> {
        let tree = build(&doc);
        Ok((package(&tree)?, tree.blocks.len()))
    })
    .await??;

    let artifact = Artifact::docx(base_name, bytes);
    info!(
        file = %artifact.file_name,
        blocks,
        size = artifact.bytes.len(),
        "DOCX export complete"
    );
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::sync::Arc;

    use quick_xml::events::Event;
    use quick_xml::Reader;

    use super::*;
    use crate::models::resume::{PersonalInfo, WorkExperience};
    use crate::models::style::{StyleConfig, TemplateId};
    use crate::templates;

    fn extract_text(xml: &str) -> String {
        let mut reader = Reader::from_str(xml);
        let mut out = String::new();
        loop {
            match reader.read_event() {
                Ok(Event::Text(t)) => out.push_str(&t.unescape().unwrap()),
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed document.xml: {e}"),
            }
        }
        out
    }

    /// Every literal value a reader would look for.
    fn literal_values(doc: &ResumeData) -> Vec<String> {
        let mut v: Vec<String> = doc
            .personal_info
            .contact_fields()
            .into_iter()
            .map(str::to_string)
            .collect();
        v.push(doc.personal_info.name.clone());
        v.push(doc.summary.clone());
        for job in doc.work_experience.iter() {
            v.push(job.job_title.clone());
            v.push(job.company.clone());
            v.push(job.date_range());
            v.extend(job.bullets().map(str::to_string));
        }
        for edu in doc.education.iter() {
            v.push(edu.institution.clone());
            v.push(edu.degree.clone());
            v.push(edu.field_of_study.clone());
        }
        v.extend(doc.skill_names().into_iter().map(str::to_string));
        for p in doc.projects.iter() {
            v.push(p.name.clone());
            v.push(p.url.clone());
            v.push(p.description.clone());
        }
        v.retain(|s| !s.trim().is_empty());
        v
    }

    #[test]
    fn test_sections_always_in_canonical_order() {
        let empty = build(&ResumeData::default());
        assert_eq!(empty.sections(), SectionKind::CANONICAL_ORDER.to_vec());
        let sample = build(&ResumeData::sample());
        assert_eq!(sample.sections(), SectionKind::CANONICAL_ORDER.to_vec());
    }

    #[test]
    fn test_empty_section_has_heading_and_no_body() {
        let tree = build(&ResumeData::default());
        let skills_at = tree
            .blocks
            .iter()
            .position(|b| matches!(b, Block::Heading { section: Some(SectionKind::Skills), .. }))
            .unwrap();
        assert!(matches!(
            tree.blocks[skills_at + 1],
            Block::Heading { section: Some(SectionKind::Projects), .. }
        ));
    }

    #[test]
    fn test_contact_line_omits_empty_fields() {
        let doc = ResumeData {
            personal_info: Arc::new(PersonalInfo {
                name: "Sam".to_string(),
                email: "sam@x.io".to_string(),
                address: "Berlin".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let tree = build(&doc);
        assert_eq!(tree.texts()[1], "sam@x.io | Berlin");
    }

    #[test]
    fn test_work_entry_shape() {
        let doc = ResumeData {
            work_experience: Arc::new(vec![WorkExperience {
                id: "w".to_string(),
                job_title: "Engineer".to_string(),
                company: "Acme".to_string(),
                is_current: true,
                description: vec!["Built X".to_string(), "".to_string()],
                ..Default::default()
            }]),
            ..Default::default()
        };
        let tree = build(&doc);
        let at = tree
            .blocks
            .iter()
            .position(|b| matches!(b, Block::Heading { section: Some(SectionKind::WorkExperience), .. }))
            .unwrap();

        let Block::Paragraph { runs, .. } = &tree.blocks[at + 1] else {
            panic!("title line");
        };
        assert!(runs[0].bold && runs[0].text == "Engineer");
        assert!(runs[1].italic && runs[1].text == " | Acme");

        let Block::Paragraph { runs, .. } = &tree.blocks[at + 2] else {
            panic!("date line");
        };
        assert_eq!(runs[0].text, "Present");
        assert_eq!(runs[0].color, Some(MUTED_HEX));

        assert!(matches!(&tree.blocks[at + 3], Block::Paragraph { bullet: true, runs, .. } if runs[0].text == "Built X"));
        // One bulleted paragraph per line, blank ones included.
        assert!(matches!(&tree.blocks[at + 4], Block::Paragraph { bullet: true, runs, .. } if runs[0].text.is_empty()));
        assert!(matches!(&tree.blocks[at + 5], Block::Heading { section: Some(SectionKind::Education), .. }));
    }

    #[test]
    fn test_matches_rendered_templates() {
        let doc = ResumeData::sample();
        let style = StyleConfig::default();
        let docx = build(&doc);
        let docx_text = docx.texts().join("\n");

        // The single-column template shares the canonical section order exactly.
        let modern = templates::render(TemplateId::Modern, &doc, &style);
        assert_eq!(modern.sections(), docx.sections());

        for t in TemplateId::ALL {
            let tree = templates::render(t, &doc, &style);
            let rendered = tree.texts().join("\n");
            for value in literal_values(&doc) {
                assert!(docx_text.contains(&value), "docx is missing {value:?}");
                assert!(rendered.contains(&value), "{t:?} is missing {value:?}");
            }
        }
    }

    #[test]
    fn test_package_contains_all_parts_and_escaped_text() {
        let mut doc = ResumeData::sample();
        doc.summary = "R&D <lead> \"quoted\"".to_string();
        let bytes = package(&build(&doc)).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/numbering.xml",
            "word/_rels/document.xml.rels",
            "docProps/core.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing {name}");
        }

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        let text = extract_text(&xml);
        assert!(text.contains("R&D <lead> \"quoted\""));
        assert!(text.contains("Senior Software Engineer"));
        assert!(text.contains("SQL & NoSQL"));
    }

    #[test]
    fn test_control_characters_never_reach_the_package() {
        let mut doc = ResumeData::sample();
        doc.summary = "Page one\u{000C}Page two\u{0001}".to_string();
        Arc::make_mut(&mut doc.personal_info).name = "Jane\u{0007} Doe".to_string();
        let bytes = package(&build(&doc)).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in ["word/document.xml", "docProps/core.xml"] {
            let mut xml = String::new();
            archive
                .by_name(name)
                .unwrap()
                .read_to_string(&mut xml)
                .unwrap();
            assert!(
                !xml.chars().any(|c| c < ' ' && !matches!(c, '\t' | '\n' | '\r')),
                "{name} carries an illegal control character"
            );
            if name == "word/document.xml" {
                let text = extract_text(&xml);
                assert!(text.contains("Page one Page two"));
                assert!(text.contains("Jane Doe"));
            }
        }
    }

    #[tokio::test]
    async fn test_export_docx_artifact() {
        let artifact = export_docx(ResumeData::sample(), "Jane").await.unwrap();
        assert_eq!(artifact.file_name, "Jane.docx");
        assert!(artifact.bytes.starts_with(b"PK"));
    }
}
