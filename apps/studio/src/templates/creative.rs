//! Centred layout with ornamented headings, skill chips and a two-column footer grid.

use crate::models::resume::ResumeData;
use crate::models::style::{Rgb, StyleConfig, TemplateId};
use crate::templates::node::{
    Chips, Columns, Insets, LayoutNode, LayoutTree, Rule, SectionKind, Stack, Text, TextAlign,
    PAGE_MIN_HEIGHT_PX, PAGE_WIDTH_PX,
};

/// Chip fill: the accent at 0x20 alpha over white.
const CHIP_TINT: f32 = 32.0 / 255.0;

pub fn render(doc: &ResumeData, style: &StyleConfig) -> LayoutTree {
    let accent = style.accent();
    let info = &doc.personal_info;

    let header = Stack::new(vec![
        Text::new(&info.name, 48.0)
            .bold()
            .color(accent)
            .align(TextAlign::Center)
            .into(),
        Text::new(info.contact_fields().join(" | "), 12.0)
            .color(Rgb::MUTED)
            .align(TextAlign::Center)
            .into(),
    ])
    .gap(8.0);

    let summary = section(
        SectionKind::Summary,
        "Summary",
        accent,
        vec![Text::new(&doc.summary, 14.0)
            .align(TextAlign::Center)
            .into()],
    );

    let work = section(
        SectionKind::WorkExperience,
        "Experience",
        accent,
        doc.work_experience
            .iter()
            .map(|job| {
                let mut lines: Vec<LayoutNode> = vec![Columns::new(16.0)
                    .col(
                        3.0,
                        Stack::new(vec![
                            Text::new(&job.job_title, 16.0).bold().into(),
                            Text::new(job.employer_line(), 14.0)
                                .italic()
                                .color(Rgb::MUTED)
                                .into(),
                        ]),
                    )
                    .col(
                        1.0,
                        Text::new(job.date_range(), 12.0)
                            .color(Rgb::FAINT)
                            .align(TextAlign::Right),
                    )
                    .into()];
                lines.extend(job.bullets().map(|b| LayoutNode::from(Text::new(b, 14.0).bullet())));
                Stack::new(lines).gap(4.0).into()
            })
            .collect(),
    );

    let skills = section(
        SectionKind::Skills,
        "Skills",
        accent,
        vec![Chips {
            items: doc
                .skill_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            size: 12.0,
            color: accent,
            background: accent.over(Rgb::WHITE, CHIP_TINT),
            align: TextAlign::Center,
        }
        .into()],
    );

    let education = section(
        SectionKind::Education,
        "Education",
        accent,
        doc.education
            .iter()
            .map(|edu| {
                Stack::new(vec![
                    Text::new(&edu.institution, 16.0).bold().into(),
                    Text::new(&edu.degree, 14.0).into(),
                    Text::new(&edu.field_of_study, 14.0)
                        .italic()
                        .color(Rgb::MUTED)
                        .into(),
                    Text::new(edu.date_range(), 12.0).color(Rgb::FAINT).into(),
                ])
                .gap(2.0)
                .into()
            })
            .collect(),
    );

    let projects = section(
        SectionKind::Projects,
        "Projects",
        accent,
        doc.projects
            .iter()
            .map(|p| {
                Stack::new(vec![
                    Text::new(&p.name, 16.0).bold().color(accent).into(),
                    Text::new(&p.url, 12.0).color(Rgb::MUTED).into(),
                    Text::new(&p.description, 14.0).into(),
                ])
                .gap(2.0)
                .into()
            })
            .collect(),
    );

    let footer = Columns::new(48.0).col(1.0, education).col(1.0, projects);

    let root = Stack::new(vec![header.into(), summary, work, skills, footer.into()])
        .gap(28.0)
        .padding(Insets::all(40.0))
        .background(Rgb::WHITE)
        .min_height(PAGE_MIN_HEIGHT_PX);

    LayoutTree {
        template: TemplateId::Creative,
        font: style.font(),
        width: PAGE_WIDTH_PX,
        min_height: PAGE_MIN_HEIGHT_PX,
        root: root.into(),
    }
}

/// Heading flanked by two faded accent rules.
fn section(kind: SectionKind, title: &str, accent: Rgb, body: Vec<LayoutNode>) -> LayoutNode {
    let ornament = || Rule {
        color: accent.over(Rgb::WHITE, 0.5),
        thickness: 1.0,
        offset: 11.0,
    };
    let heading = Columns::new(12.0)
        .col(1.0, ornament())
        .col(
            1.0,
            Text::new(title, 20.0)
                .bold()
                .uppercase()
                .color(accent)
                .align(TextAlign::Center),
        )
        .col(1.0, ornament());

    let mut children: Vec<LayoutNode> = vec![heading.into()];
    children.extend(body);
    Stack::new(children).gap(12.0).section(kind).into()
}
