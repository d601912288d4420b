//! Two-column sidebar layout: contact, skills and education on an accent-filled sidebar;
//! summary, experience and projects in the main column.

use crate::models::resume::{join_non_empty, ResumeData};
use crate::models::style::{Rgb, StyleConfig, TemplateId};
use crate::templates::node::{
    Columns, Insets, LayoutNode, LayoutTree, Rule, SectionKind, Stack, Text,
    PAGE_MIN_HEIGHT_PX, PAGE_WIDTH_PX,
};

pub fn render(doc: &ResumeData, style: &StyleConfig) -> LayoutTree {
    let accent = style.accent();
    let soft = Rgb::WHITE.over(accent, 0.8);
    let info = &doc.personal_info;

    // ── Sidebar ─────────────────────────────────────────────────────────────

    let mut contact: Vec<LayoutNode> = vec![Text::new(&info.name, 30.0)
        .bold()
        .color(Rgb::WHITE)
        .into()];
    contact.extend(
        info.contact_fields()
            .into_iter()
            .map(|field| LayoutNode::from(Text::new(field, 14.0).color(Rgb::WHITE))),
    );

    let skills = sidebar_section(
        SectionKind::Skills,
        doc.skill_names()
            .into_iter()
            .map(|name| Text::new(name, 14.0).color(Rgb::WHITE).into())
            .collect(),
    );

    let education = sidebar_section(
        SectionKind::Education,
        doc.education
            .iter()
            .map(|edu| {
                Stack::new(vec![
                    Text::new(&edu.institution, 14.0)
                        .bold()
                        .color(Rgb::WHITE)
                        .into(),
                    Text::new(&edu.degree, 14.0).color(Rgb::WHITE).into(),
                    Text::new(&edu.field_of_study, 14.0)
                        .color(Rgb::WHITE)
                        .into(),
                    Text::new(edu.date_range(), 14.0).color(soft).into(),
                ])
                .gap(2.0)
                .into()
            })
            .collect(),
    );

    let sidebar = Stack::new(vec![
        Stack::new(contact).gap(6.0).into(),
        skills,
        education,
    ])
    .gap(28.0)
    .padding(Insets::all(24.0))
    .background(accent);

    // ── Main column ─────────────────────────────────────────────────────────

    let summary = main_section(
        SectionKind::Summary,
        accent,
        vec![Text::new(&doc.summary, 14.0).into()],
    );

    let work = main_section(
        SectionKind::WorkExperience,
        accent,
        doc.work_experience
            .iter()
            .map(|job| {
                let dates = job.date_range();
                let mut lines: Vec<LayoutNode> = vec![
                    Text::new(
                        join_non_empty(&[job.job_title.as_str(), job.company.as_str()], " | "),
                        16.0,
                    )
                    .bold()
                    .into(),
                    Text::new(
                        join_non_empty(&[job.location.as_str(), dates.as_str()], " | "),
                        14.0,
                    )
                    .italic()
                    .color(Rgb::MUTED)
                    .into(),
                ];
                lines.extend(job.bullets().map(|b| LayoutNode::from(Text::new(b, 14.0).bullet())));
                Stack::new(lines).gap(4.0).into()
            })
            .collect(),
    );

    let projects = main_section(
        SectionKind::Projects,
        accent,
        doc.projects
            .iter()
            .map(|p| {
                Stack::new(vec![
                    Text::new(join_non_empty(&[p.name.as_str(), p.url.as_str()], " | "), 16.0)
                        .bold()
                        .into(),
                    Text::new(&p.description, 14.0).into(),
                ])
                .gap(2.0)
                .into()
            })
            .collect(),
    );

    let main = Stack::new(vec![summary, work, projects])
        .gap(24.0)
        .padding(Insets::left(32.0));

    let root = Stack::new(vec![Columns::new(0.0)
        .col(1.0, sidebar)
        .col(2.0, main)
        .into()])
    .padding(Insets::all(32.0))
    .background(Rgb::WHITE)
    .min_height(PAGE_MIN_HEIGHT_PX);

    LayoutTree {
        template: TemplateId::Professional,
        font: style.font(),
        width: PAGE_WIDTH_PX,
        min_height: PAGE_MIN_HEIGHT_PX,
        root: root.into(),
    }
}

fn sidebar_section(kind: SectionKind, body: Vec<LayoutNode>) -> LayoutNode {
    let mut children: Vec<LayoutNode> = vec![
        Text::new(kind.title(), 18.0)
            .bold()
            .uppercase()
            .color(Rgb::WHITE)
            .into(),
        Rule {
            color: Rgb::WHITE.over(Rgb::INK, 0.5),
            thickness: 1.0,
            offset: 0.0,
        }
        .into(),
    ];
    children.extend(body);
    Stack::new(children).gap(8.0).section(kind).into()
}

fn main_section(kind: SectionKind, accent: Rgb, body: Vec<LayoutNode>) -> LayoutNode {
    let mut children: Vec<LayoutNode> = vec![
        Text::new(kind.title(), 20.0)
            .bold()
            .uppercase()
            .color(accent)
            .into(),
        Rule {
            color: accent,
            thickness: 2.0,
            offset: 0.0,
        }
        .into(),
    ];
    children.extend(body);
    Stack::new(children).gap(10.0).section(kind).into()
}
