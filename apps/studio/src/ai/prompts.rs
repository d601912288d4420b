// Prompt text for the content service. The service is treated as a black box;
// these strings only describe the JSON shape each call expects back.

use crate::models::resume::ResumeData;

pub const PARSE_RESUME: &str = "\
    You are an expert resume parser. Analyze the provided resume document. \
    Extract all information and return a single JSON object with the keys \
    personalInfo {name, email, phone, linkedin, website, address}, summary, \
    workExperience [{id, jobTitle, company, location, startDate, endDate, isCurrent, description[]}], \
    education [{id, institution, degree, fieldOfStudy, startDate, endDate}], \
    skills [{id, name}] and projects [{id, name, description, url}]. \
    If a value is not found, use an empty string or an empty array. \
    Set isCurrent when the end date reads like 'Present'. \
    Each work-experience description entry is one bullet point from the resume.";

pub fn suggestions(job_title: &str, company: &str) -> String {
    format!(
        "Generate 3-5 impactful, one-sentence resume bullet points for a \"{job_title}\" at \
         \"{company}\". Focus on achievements and metrics. Return a JSON array of strings."
    )
}

pub fn job_match(doc: &ResumeData, job_description: &str) -> String {
    let experience = doc
        .work_experience
        .iter()
        .map(|w| format!("{} - {}", w.job_title, w.description.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");
    format!(
        "You are an expert ATS and recruitment specialist. \
         Analyze the following resume against the provided job description.\n\
         Resume:\nSummary: {summary}\nExperience: {experience}\nSkills: {skills}\n\
         Job Description: {job_description}\n\
         Return a JSON object {{matchScore: integer 0-100, keywordGaps: string[], \
         missingSkills: string[], improvementSuggestions: {{summary: string, experience: string}}}}.",
        summary = doc.summary,
        skills = skills_line(doc),
    )
}

pub fn ats_check(doc: &ResumeData) -> String {
    let titles = doc
        .work_experience
        .iter()
        .map(|w| w.job_title.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let degrees = doc
        .education
        .iter()
        .map(|e| e.degree.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You are an ATS simulator. Analyze this resume data for ATS compatibility. \
         Check for standard section titles, keyword relevance for a general professional role, \
         and clarity. Do not critique the content's quality, only its parsability and structure.\n\
         Name: {name}\nSummary: {summary}\nExperience Titles: {titles}\n\
         Education Degrees: {degrees}\nSkills: {skills}\n\
         Return a JSON object {{atsScore: integer 0-100, suggestions: string[]}}.",
        name = doc.personal_info.name,
        summary = doc.summary,
        skills = skills_line(doc),
    )
}

pub fn cover_letter(doc: &ResumeData, job_description: &str) -> String {
    let info = &doc.personal_info;
    let work = doc
        .work_experience
        .iter()
        .map(|w| {
            format!(
                "- Job Title: {} at {} ({})\n  Achievements: {}",
                w.job_title,
                w.company,
                w.date_range(),
                w.description.join("; ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let education = doc
        .education
        .iter()
        .map(|e| format!("- {} in {} from {}", e.degree, e.field_of_study, e.institution))
        .collect::<Vec<_>>()
        .join("\n");
    let projects = doc
        .projects
        .iter()
        .map(|p| format!("- {}: {}", p.name, p.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a professional career coach and expert cover letter writer. \
         Based on the following resume and job description, write a compelling, professional \
         and personalized cover letter of three to four paragraphs. Open by introducing the \
         applicant and the position with a strong hook. Connect two or three specific \
         achievements from the resume to the key requirements of the job. Close by restating \
         interest and asking for a conversation. Address it to \"Hiring Manager\" if no name \
         is available and sign with the applicant's name.\n\
         ---\n\
         Name: {name}\nEmail: {email}\nPhone: {phone}\nLinkedIn: {linkedin}\n\
         Website: {website}\nAddress: {address}\n\nSummary: {summary}\n\n\
         Work Experience:\n{work}\n\nEducation:\n{education}\n\n\
         Skills: {skills}\n\nProjects:\n{projects}\n\
         ---\n\
         Job description:\n{job_description}\n\
         ---\n\
         Return ONLY the full text of the cover letter, with no commentary before or after it.",
        name = info.name,
        email = info.email,
        phone = info.phone,
        linkedin = info.linkedin,
        website = info.website,
        address = info.address,
        summary = doc.summary,
        skills = skills_line(doc),
    )
}

/// Non-blank skill names, comma-joined.
fn skills_line(doc: &ResumeData) -> String {
    doc.skill_names()
        .into_iter()
        .filter(|n| !n.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
