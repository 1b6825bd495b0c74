//! Heuristic résumé extraction.
//!
//! A single pass over the user turns of a transcript applies the rule table in
//! [`rules`]; summary and defaults are filled in afterwards. The result is a
//! pure function of the transcript.

mod rules;

use crate::domain::{ChatTurn, Education, Experience, ResumeRecord, Skill};
use rules::RULES;

pub const DEFAULT_NAME: &str = "Job Applicant";
pub const DEFAULT_EMAIL: &str = "applicant@example.com";
const EMPTY_TRANSCRIPT_SUMMARY: &str = "Professional summary extracted from chat conversation.";
const GENERIC_EXPERTISE: &str = "software development and technology";
const DEFAULT_SKILLS: &[&str] = &["Programming", "Problem Solving", "Communication", "Teamwork"];
const DEFAULT_SKILL_CATEGORY: &str = "General";

pub fn extract(transcript: &[ChatTurn]) -> ResumeRecord {
    let mut record = ResumeRecord::default();
    let mut saw_user_turn = false;

    for turn in transcript.iter().filter(|t| t.is_user()) {
        saw_user_turn = true;
        let lower = turn.content.to_ascii_lowercase();

        for rule in RULES {
            if let Some(trigger) = rule.matched_trigger(&lower) {
                rule.field.apply(&turn.content, &lower, trigger, &mut record);
            }
        }
    }

    // Summary reflects only what was derived, so it is built before defaults.
    record.summary = summarize(&record, saw_user_turn);
    apply_defaults(&mut record);
    record
}

fn summarize(record: &ResumeRecord, saw_user_turn: bool) -> String {
    if !saw_user_turn {
        return EMPTY_TRANSCRIPT_SUMMARY.to_string();
    }

    let mut summary = String::from("Professional with experience in ");
    if record.skills.is_empty() {
        summary.push_str(GENERIC_EXPERTISE);
    } else {
        let names: Vec<String> = record.skills.iter().map(|s| s.name.clone()).collect();
        summary.push_str(&join_natural(&names));
    }

    if !record.experience.is_empty() {
        let roles: Vec<String> = record
            .experience
            .iter()
            .map(|e| {
                if e.company.is_empty() {
                    e.position.clone()
                } else {
                    format!("{} at {}", e.position, e.company)
                }
            })
            .collect();
        summary.push_str(". Previous roles include ");
        summary.push_str(&join_natural(&roles));
    }

    summary.push('.');
    summary
}

/// "A", "A and B", "A, B and C"
fn join_natural(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn apply_defaults(record: &mut ResumeRecord) {
    if record.basic_info.name.is_empty() {
        record.basic_info.name = DEFAULT_NAME.to_string();
    }
    if record.basic_info.email.is_empty() {
        record.basic_info.email = DEFAULT_EMAIL.to_string();
    }

    if record.experience.is_empty() {
        record.experience.push(Experience {
            company: "Example Company".to_string(),
            position: rules::DEFAULT_POSITION.to_string(),
            start_date: rules::DEFAULT_START_DATE.to_string(),
            end_date: rules::OPEN_END_DATE.to_string(),
            description: "Worked on various software development projects.".to_string(),
            highlights: Vec::new(),
        });
    }

    if record.education.is_empty() {
        record.education.push(Education {
            institution: "University Example".to_string(),
            degree: "Bachelor's".to_string(),
            field: "Computer Science".to_string(),
            start_date: "2016-09".to_string(),
            end_date: "2020-05".to_string(),
            gpa: None,
        });
    }

    if record.skills.is_empty() {
        record.skills = DEFAULT_SKILLS
            .iter()
            .map(|name| Skill::new(*name, DEFAULT_SKILL_CATEGORY))
            .collect();
    }
}
