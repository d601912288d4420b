//! Action-driven reducer over `ResumeData`.
//!
//! `apply` never mutates its input. It clones the top-level snapshot (reference clones for
//! every list) and copies only the branch an action edits via `Arc::make_mut`, so untouched
//! lists stay pointer-equal between the old and the new snapshot.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::document::ids::new_item_id;
use crate::models::resume::{Education, Project, ResumeData, Skill, WorkExperience};

// ────────────────────────────────────────────────────────────────────────────
// Action vocabulary
// ────────────────────────────────────────────────────────────────────────────

/// The repeatable lists of a résumé.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    WorkExperience,
    Education,
    Skills,
    Projects,
}

impl Section {
    pub fn key(&self) -> &'static str {
        match self {
            Section::WorkExperience => "workExperience",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Projects => "projects",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonalField {
    Name,
    Email,
    Phone,
    Linkedin,
    Website,
    Address,
}

/// Every editable field of a list item. Which ones apply depends on the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemField {
    JobTitle,
    Company,
    Location,
    StartDate,
    EndDate,
    IsCurrent,
    Description,
    Institution,
    Degree,
    FieldOfStudy,
    Name,
    Url,
}

impl ItemField {
    pub fn key(&self) -> &'static str {
        match self {
            ItemField::JobTitle => "jobTitle",
            ItemField::Company => "company",
            ItemField::Location => "location",
            ItemField::StartDate => "startDate",
            ItemField::EndDate => "endDate",
            ItemField::IsCurrent => "isCurrent",
            ItemField::Description => "description",
            ItemField::Institution => "institution",
            ItemField::Degree => "degree",
            ItemField::FieldOfStudy => "fieldOfStudy",
            ItemField::Name => "name",
            ItemField::Url => "url",
        }
    }
}

/// A field value. The expected shape is fixed by the field being written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
    Lines(Vec<String>),
}

impl FieldValue {
    fn text(&self, field: ItemField) -> Result<String, ValidationError> {
        match self {
            FieldValue::Text(s) => Ok(s.clone()),
            _ => Err(ValidationError::WrongValueType {
                field: field.key(),
                expected: "text",
            }),
        }
    }

    fn flag(&self, field: ItemField) -> Result<bool, ValidationError> {
        match self {
            FieldValue::Flag(b) => Ok(*b),
            _ => Err(ValidationError::WrongValueType {
                field: field.key(),
                expected: "boolean",
            }),
        }
    }

    fn lines(&self, field: ItemField) -> Result<Vec<String>, ValidationError> {
        match self {
            FieldValue::Lines(lines) => Ok(lines.clone()),
            _ => Err(ValidationError::WrongValueType {
                field: field.key(),
                expected: "list of strings",
            }),
        }
    }
}

/// Where an `UpdateField` writes. Each call site states its addressing mode explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum FieldUpdate {
    /// A field of the singular personal-info object.
    Personal { field: PersonalField, value: String },
    /// The scalar summary.
    Summary { value: String },
    /// A field of the list element at `index`.
    Item {
        section: Section,
        index: usize,
        field: ItemField,
        value: FieldValue,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    UpdateField {
        target: FieldUpdate,
    },
    UpdateBullet {
        work_index: usize,
        bullet_index: usize,
        value: String,
    },
    AddItem {
        section: Section,
    },
    RemoveItem {
        section: Section,
        id: String,
    },
    ReplaceDocument {
        document: ResumeData,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::UpdateField { .. } => "UPDATE_FIELD",
            Action::UpdateBullet { .. } => "UPDATE_BULLET",
            Action::AddItem { .. } => "ADD_ITEM",
            Action::RemoveItem { .. } => "REMOVE_ITEM",
            Action::ReplaceDocument { .. } => "REPLACE_DOCUMENT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("index {index} is out of range for {section} (len {len})")]
    IndexOutOfRange {
        section: &'static str,
        index: usize,
        len: usize,
    },

    #[error("bullet {bullet_index} is out of range for work entry {work_index} (len {len})")]
    BulletOutOfRange {
        work_index: usize,
        bullet_index: usize,
        len: usize,
    },

    #[error("{section} has no field '{field}'")]
    UnknownField {
        section: &'static str,
        field: &'static str,
    },

    #[error("field '{field}' expects {expected}")]
    WrongValueType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{field} {reason}")]
    OutOfBounds {
        field: &'static str,
        reason: &'static str,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Reducer
// ────────────────────────────────────────────────────────────────────────────

/// Applies an action, absorbing validation failures as a no-op.
///
/// The returned snapshot is equal to `doc` when the action is invalid.
pub fn apply(doc: &ResumeData, action: &Action) -> ResumeData {
    match try_apply(doc, action) {
        Ok(next) => next,
        Err(e) => {
            warn!(action = action.name(), "Ignoring invalid action: {e}");
            doc.clone()
        }
    }
}

/// Applies an action, reporting why an invalid one was rejected.
pub fn try_apply(doc: &ResumeData, action: &Action) -> Result<ResumeData, ValidationError> {
    let mut next = doc.clone();

    match action {
        Action::UpdateField { target } => update_field(&mut next, target)?,

        Action::UpdateBullet {
            work_index,
            bullet_index,
            value,
        } => {
            let job = next.work_experience.get(*work_index).ok_or(
                ValidationError::IndexOutOfRange {
                    section: Section::WorkExperience.key(),
                    index: *work_index,
                    len: next.work_experience.len(),
                },
            )?;
            if *bullet_index >= job.description.len() {
                return Err(ValidationError::BulletOutOfRange {
                    work_index: *work_index,
                    bullet_index: *bullet_index,
                    len: job.description.len(),
                });
            }
            Arc::make_mut(&mut next.work_experience)[*work_index].description[*bullet_index] =
                value.clone();
        }

        Action::AddItem { section } => {
            let id = new_item_id(*section);
            debug!(section = section.key(), %id, "Adding item");
            match section {
                Section::WorkExperience => {
                    Arc::make_mut(&mut next.work_experience).push(WorkExperience {
                        id,
                        description: vec![String::new()],
                        ..Default::default()
                    })
                }
                Section::Education => Arc::make_mut(&mut next.education).push(Education {
                    id,
                    ..Default::default()
                }),
                Section::Skills => Arc::make_mut(&mut next.skills).push(Skill {
                    id,
                    ..Default::default()
                }),
                Section::Projects => Arc::make_mut(&mut next.projects).push(Project {
                    id,
                    ..Default::default()
                }),
            }
        }

        Action::RemoveItem { section, id } => {
            let removed = match section {
                Section::WorkExperience => remove_by_id(&mut next.work_experience, id),
                Section::Education => remove_by_id(&mut next.education, id),
                Section::Skills => remove_by_id(&mut next.skills, id),
                Section::Projects => remove_by_id(&mut next.projects, id),
            };
            if !removed {
                debug!(section = section.key(), %id, "RemoveItem matched nothing");
            }
        }

        Action::ReplaceDocument { document } => {
            let mut replacement = document.clone();
            ensure_unique_ids(&mut replacement);
            return Ok(replacement);
        }
    }

    Ok(next)
}

fn update_field(next: &mut ResumeData, target: &FieldUpdate) -> Result<(), ValidationError> {
    match target {
        FieldUpdate::Personal { field, value } => {
            let info = Arc::make_mut(&mut next.personal_info);
            let slot = match field {
                PersonalField::Name => &mut info.name,
                PersonalField::Email => &mut info.email,
                PersonalField::Phone => &mut info.phone,
                PersonalField::Linkedin => &mut info.linkedin,
                PersonalField::Website => &mut info.website,
                PersonalField::Address => &mut info.address,
            };
            *slot = value.clone();
        }

        FieldUpdate::Summary { value } => next.summary = value.clone(),

        FieldUpdate::Item {
            section,
            index,
            field,
            value,
        } => match section {
            Section::WorkExperience => {
                let job = element_mut(&mut next.work_experience, *section, *index)?;
                set_work_field(job, *field, value)?
            }
            Section::Education => {
                let edu = element_mut(&mut next.education, *section, *index)?;
                set_education_field(edu, *field, value)?
            }
            Section::Skills => {
                let skill = element_mut(&mut next.skills, *section, *index)?;
                match field {
                    ItemField::Name => skill.name = value.text(*field)?,
                    other => return Err(unknown_field(*section, *other)),
                }
            }
            Section::Projects => {
                let project = element_mut(&mut next.projects, *section, *index)?;
                set_project_field(project, *field, value)?
            }
        },
    }
    Ok(())
}

fn set_work_field(
    job: &mut WorkExperience,
    field: ItemField,
    value: &FieldValue,
) -> Result<(), ValidationError> {
    match field {
        ItemField::JobTitle => job.job_title = value.text(field)?,
        ItemField::Company => job.company = value.text(field)?,
        ItemField::Location => job.location = value.text(field)?,
        ItemField::StartDate => job.start_date = value.text(field)?,
        ItemField::EndDate => job.end_date = value.text(field)?,
        ItemField::IsCurrent => job.is_current = value.flag(field)?,
        ItemField::Description => job.description = value.lines(field)?,
        other => return Err(unknown_field(Section::WorkExperience, other)),
    }
    Ok(())
}

fn set_education_field(
    edu: &mut Education,
    field: ItemField,
    value: &FieldValue,
) -> Result<(), ValidationError> {
    match field {
        ItemField::Institution => edu.institution = value.text(field)?,
        ItemField::Degree => edu.degree = value.text(field)?,
        ItemField::FieldOfStudy => edu.field_of_study = value.text(field)?,
        ItemField::StartDate => edu.start_date = value.text(field)?,
        ItemField::EndDate => edu.end_date = value.text(field)?,
        other => return Err(unknown_field(Section::Education, other)),
    }
    Ok(())
}

fn set_project_field(
    project: &mut Project,
    field: ItemField,
    value: &FieldValue,
) -> Result<(), ValidationError> {
    match field {
        ItemField::Name => project.name = value.text(field)?,
        ItemField::Description => project.description = value.text(field)?,
        ItemField::Url => project.url = value.text(field)?,
        other => return Err(unknown_field(Section::Projects, other)),
    }
    Ok(())
}

fn unknown_field(section: Section, field: ItemField) -> ValidationError {
    ValidationError::UnknownField {
        section: section.key(),
        field: field.key(),
    }
}

/// Bounds-checks before copying, so a rejected edit never clones the list.
fn element_mut<T: Clone>(
    list: &mut Arc<Vec<T>>,
    section: Section,
    index: usize,
) -> Result<&mut T, ValidationError> {
    let len = list.len();
    if index >= len {
        return Err(ValidationError::IndexOutOfRange {
            section: section.key(),
            index,
            len,
        });
    }
    Ok(&mut Arc::make_mut(list)[index])
}

// ────────────────────────────────────────────────────────────────────────────
// Identity helpers
// ────────────────────────────────────────────────────────────────────────────

/// List items addressable by their stable id.
pub trait Identified {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

macro_rules! impl_identified {
    ($($ty:ty),*) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        })*
    };
}

impl_identified!(WorkExperience, Education, Skill, Project);

/// Removes the item with `id`. The list is only copied when something matches.
fn remove_by_id<T: Identified + Clone>(list: &mut Arc<Vec<T>>, id: &str) -> bool {
    if !list.iter().any(|item| item.id() == id) {
        return false;
    }
    Arc::make_mut(list).retain(|item| item.id() != id);
    true
}

/// Re-stamps empty or duplicated ids so every list satisfies the uniqueness invariant.
pub fn ensure_unique_ids(doc: &mut ResumeData) {
    restamp(&mut doc.work_experience, Section::WorkExperience);
    restamp(&mut doc.education, Section::Education);
    restamp(&mut doc.skills, Section::Skills);
    restamp(&mut doc.projects, Section::Projects);
}

fn restamp<T: Identified + Clone>(list: &mut Arc<Vec<T>>, section: Section) {
    let mut seen = HashSet::new();
    let needs_fix = list
        .iter()
        .any(|item| item.id().is_empty() || !seen.insert(item.id().to_string()));
    if !needs_fix {
        return;
    }

    let mut seen = HashSet::new();
    for item in Arc::make_mut(list).iter_mut() {
        if item.id().is_empty() || !seen.insert(item.id().to_string()) {
            let id = new_item_id(section);
            seen.insert(id.clone());
            item.set_id(id);
        }
    }
    warn!(section = section.key(), "Re-stamped missing or duplicate item ids");
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
