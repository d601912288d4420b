//! Canonical résumé document.
//!
//! Every snapshot is immutable once published. Lists and the personal-info block sit behind
//! `Arc` so that a new snapshot can share every branch an edit did not touch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Label shown in place of an end date for the current position.
pub const PRESENT: &str = "Present";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub website: String,
    pub address: String,
}

impl PersonalInfo {
    /// Contact fields in display order, empty ones omitted.
    pub fn contact_fields(&self) -> Vec<&str> {
        [
            self.email.as_str(),
            self.phone.as_str(),
            self.linkedin.as_str(),
            self.website.as_str(),
            self.address.as_str(),
        ]
        .into_iter()
        .filter(|field| !field.trim().is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperience {
    pub id: String,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub is_current: bool,
    pub description: Vec<String>,
}

impl WorkExperience {
    /// `start - end`, with the end replaced by "Present" for the current job.
    /// The stored `end_date` is left untouched.
    pub fn date_range(&self) -> String {
        let end = if self.is_current {
            PRESENT
        } else {
            self.end_date.as_str()
        };
        join_range(&self.start_date, end)
    }

    /// "company, location" with empty parts dropped.
    pub fn employer_line(&self) -> String {
        join_non_empty(&[self.company.as_str(), self.location.as_str()], ", ")
    }

    /// Description lines in order. Blank lines are kept so each one still gets its bullet.
    pub fn bullets(&self) -> impl Iterator<Item = &str> {
        self.description.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    pub end_date: String,
}

impl Education {
    pub fn date_range(&self) -> String {
        join_range(&self.start_date, &self.end_date)
    }

    /// "degree, field of study" with empty parts dropped.
    pub fn qualification(&self) -> String {
        join_non_empty(&[self.degree.as_str(), self.field_of_study.as_str()], ", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
}

/// The résumé document. `Clone` is cheap: it copies five `Arc`s and the summary string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeData {
    pub personal_info: Arc<PersonalInfo>,
    pub summary: String,
    pub work_experience: Arc<Vec<WorkExperience>>,
    pub education: Arc<Vec<Education>>,
    pub skills: Arc<Vec<Skill>>,
    pub projects: Arc<Vec<Project>>,
}

impl ResumeData {
    /// The sample résumé every session starts from.
    pub fn sample() -> Self {
        Self {
            personal_info: Arc::new(PersonalInfo {
                name: "Jane Doe".to_string(),
                email: "jane.doe@example.com".to_string(),
                phone: "123-456-7890".to_string(),
                linkedin: "linkedin.com/in/janedoe".to_string(),
                website: "janedoe.dev".to_string(),
                address: "San Francisco, CA".to_string(),
            }),
            summary: "Highly motivated Senior Software Engineer with over 8 years of experience \
                      in building scalable web applications. Proficient in React, Node.js, and \
                      cloud technologies. Seeking to leverage expertise in a challenging role."
                .to_string(),
            work_experience: Arc::new(vec![
                WorkExperience {
                    id: "work1".to_string(),
                    job_title: "Senior Software Engineer".to_string(),
                    company: "Tech Solutions Inc.".to_string(),
                    location: "San Francisco, CA".to_string(),
                    start_date: "Jan 2018".to_string(),
                    end_date: PRESENT.to_string(),
                    is_current: true,
                    description: vec![
                        "Led a team of 5 engineers to develop and launch a new SaaS platform, \
                         resulting in a 30% increase in user engagement."
                            .to_string(),
                        "Architected and implemented a microservices-based backend using Node.js \
                         and Docker, improving system scalability and reducing latency by 40%."
                            .to_string(),
                        "Mentored junior developers and conducted code reviews to maintain high \
                         code quality standards."
                            .to_string(),
                    ],
                },
                WorkExperience {
                    id: "work2".to_string(),
                    job_title: "Software Engineer".to_string(),
                    company: "Innovate LLC".to_string(),
                    location: "Palo Alto, CA".to_string(),
                    start_date: "Jun 2015".to_string(),
                    end_date: "Dec 2017".to_string(),
                    is_current: false,
                    description: vec![
                        "Developed and maintained frontend components using React and Redux."
                            .to_string(),
                        "Collaborated with UX/UI designers to create intuitive and responsive \
                         user interfaces."
                            .to_string(),
                        "Wrote unit and integration tests, increasing code coverage by 25%."
                            .to_string(),
                    ],
                },
            ]),
            education: Arc::new(vec![Education {
                id: "edu1".to_string(),
                institution: "State University".to_string(),
                degree: "Master of Science".to_string(),
                field_of_study: "Computer Science".to_string(),
                start_date: "2013".to_string(),
                end_date: "2015".to_string(),
            }]),
            skills: Arc::new(
                [
                    ("skill1", "React"),
                    ("skill2", "TypeScript"),
                    ("skill3", "Node.js"),
                    ("skill4", "AWS"),
                    ("skill5", "Docker"),
                    ("skill6", "SQL & NoSQL"),
                ]
                .into_iter()
                .map(|(id, name)| Skill {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
            ),
            projects: Arc::new(vec![Project {
                id: "proj1".to_string(),
                name: "Portfolio Website".to_string(),
                description: "Personal portfolio built with Next.js and Tailwind CSS, deployed \
                              on Vercel."
                    .to_string(),
                url: "janedoe.dev".to_string(),
            }]),
        }
    }

    /// Skill names in list order, blanks included.
    pub fn skill_names(&self) -> Vec<&str> {
        self.skills
            .iter()
            .map(|s| s.name.as_str())
            .collect()
    }
}

fn join_range(start: &str, end: &str) -> String {
    match (start.trim().is_empty(), end.trim().is_empty()) {
        (true, true) => String::new(),
        (false, true) => start.to_string(),
        (true, false) => end.to_string(),
        (false, false) => format!("{start} - {end}"),
    }
}

pub fn join_non_empty(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(is_current: bool, end: &str) -> WorkExperience {
        WorkExperience {
            id: "w".to_string(),
            job_title: "Engineer".to_string(),
            company: "Acme".to_string(),
            start_date: "2020".to_string(),
            end_date: end.to_string(),
            is_current,
            description: vec!["Built X".to_string(), "  ".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_current_job_ends_in_present_without_touching_end_date() {
        let j = job(true, "");
        assert_eq!(j.date_range(), "2020 - Present");
        assert_eq!(j.end_date, "");
    }

    #[test]
    fn test_past_job_uses_stored_end_date() {
        assert_eq!(job(false, "2022").date_range(), "2020 - 2022");
    }

    #[test]
    fn test_employer_line_skips_empty_location() {
        assert_eq!(job(false, "").employer_line(), "Acme");
    }

    #[test]
    fn test_blank_bullets_are_kept_in_order() {
        let j = job(false, "");
        assert_eq!(j.bullets().collect::<Vec<_>>(), vec!["Built X", "  "]);
    }

    #[test]
    fn test_contact_fields_order_and_omission() {
        let info = PersonalInfo {
            email: "a@b.c".to_string(),
            website: "x.dev".to_string(),
            ..Default::default()
        };
        assert_eq!(info.contact_fields(), vec!["a@b.c", "x.dev"]);
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let data: ResumeData =
            serde_json::from_str(r#"{"personalInfo":{"name":"Sam"},"skills":[{"name":"Go"}]}"#)
                .unwrap();
        assert_eq!(data.personal_info.name, "Sam");
        assert_eq!(data.personal_info.email, "");
        assert_eq!(data.summary, "");
        assert!(data.work_experience.is_empty());
        assert_eq!(data.skills[0].id, "");
    }

    #[test]
    fn test_sample_is_fully_populated() {
        let sample = ResumeData::sample();
        assert!(!sample.personal_info.name.is_empty());
        assert_eq!(sample.work_experience.len(), 2);
        assert_eq!(sample.skills.len(), 6);
        assert_eq!(sample.projects.len(), 1);
    }
}
