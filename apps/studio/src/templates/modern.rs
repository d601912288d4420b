//! Single-column chronological layout with an accent-coloured name and ruled headings.

use crate::models::resume::ResumeData;
use crate::models::style::{Rgb, StyleConfig, TemplateId};
use crate::templates::node::{
    Columns, Insets, LayoutNode, LayoutTree, Rule, SectionKind, Stack, Text, TextAlign,
    PAGE_MIN_HEIGHT_PX, PAGE_WIDTH_PX,
};

pub fn render(doc: &ResumeData, style: &StyleConfig) -> LayoutTree {
    let accent = style.accent();
    let info = &doc.personal_info;

    let header = Stack::new(vec![
        Text::new(&info.name, 36.0)
            .bold()
            .color(accent)
            .align(TextAlign::Center)
            .into(),
        Text::new(info.contact_fields().join(" • "), 14.0)
            .color(Rgb::MUTED)
            .align(TextAlign::Center)
            .into(),
    ])
    .gap(8.0);

    let summary = section(
        SectionKind::Summary,
        accent,
        vec![Text::new(&doc.summary, 14.0).into()],
    );

    let work = section(
        SectionKind::WorkExperience,
        accent,
        doc.work_experience
            .iter()
            .map(|job| {
                let mut lines: Vec<LayoutNode> = vec![
                    Columns::new(16.0)
                        .col(3.0, Text::new(&job.job_title, 16.0).bold())
                        .col(
                            1.0,
                            Text::new(job.date_range(), 14.0)
                                .color(Rgb::FAINT)
                                .align(TextAlign::Right),
                        )
                        .into(),
                    Text::new(job.employer_line(), 14.0)
                        .italic()
                        .color(Rgb::MUTED)
                        .into(),
                ];
                lines.extend(job.bullets().map(|b| LayoutNode::from(Text::new(b, 14.0).bullet())));
                Stack::new(lines).gap(4.0).into()
            })
            .collect(),
    );

    let education = section(
        SectionKind::Education,
        accent,
        doc.education
            .iter()
            .map(|edu| {
                Columns::new(16.0)
                    .col(
                        3.0,
                        Stack::new(vec![
                            Text::new(&edu.institution, 16.0).bold().into(),
                            Text::new(edu.qualification(), 14.0).into(),
                        ]),
                    )
                    .col(
                        1.0,
                        Text::new(edu.date_range(), 14.0)
                            .color(Rgb::FAINT)
                            .align(TextAlign::Right),
                    )
                    .into()
            })
            .collect(),
    );

    let skills = section(
        SectionKind::Skills,
        accent,
        vec![Text::new(doc.skill_names().join(" | "), 14.0).into()],
    );

    let projects = section(
        SectionKind::Projects,
        accent,
        doc.projects
            .iter()
            .map(|p| {
                Stack::new(vec![
                    Text::new(&p.name, 16.0).bold().into(),
                    Text::new(&p.url, 14.0).color(accent).into(),
                    Text::new(&p.description, 14.0).into(),
                ])
                .gap(2.0)
                .into()
            })
            .collect(),
    );

    let root = Stack::new(vec![
        header.into(),
        summary,
        work,
        education,
        skills,
        projects,
    ])
    .gap(24.0)
    .padding(Insets::all(32.0))
    .background(Rgb::WHITE)
    .min_height(PAGE_MIN_HEIGHT_PX);

    LayoutTree {
        template: TemplateId::Modern,
        font: style.font(),
        width: PAGE_WIDTH_PX,
        min_height: PAGE_MIN_HEIGHT_PX,
        root: root.into(),
    }
}

fn section(kind: SectionKind, accent: Rgb, body: Vec<LayoutNode>) -> LayoutNode {
    let heading = Stack::new(vec![
        Text::new(kind.title(), 18.0).bold().uppercase().into(),
        Rule {
            color: accent,
            thickness: 2.0,
            offset: 2.0,
        }
        .into(),
    ])
    .gap(2.0);

    let mut children: Vec<LayoutNode> = vec![heading.into()];
    children.extend(body);
    Stack::new(children).gap(12.0).section(kind).into()
}
