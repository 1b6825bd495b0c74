//! Keyword → field → parser table used by the extractor.
//!
//! Triggers are matched against ASCII-lower-cased text. Because ASCII
//! lower-casing preserves byte offsets, values are sliced out of the original
//! text at the position found in the lower-cased copy.

use crate::domain::{Experience, ResumeRecord, Skill};

pub(super) const SKILL_KEYWORDS: &[&str] = &[
    "programming",
    "language",
    "framework",
    "software",
    "tool",
    "technology",
];

const EXPERIENCE_TRIGGERS: &[&str] = &["work", "job", "experience"];
const COMPANY_MARKERS: &[&str] = &["at ", "for ", "with "];
const POSITION_MARKERS: &[&str] = &["as a ", "as an ", "position ", "role "];

const MONTHS: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December", "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep",
    "Oct", "Nov", "Dec",
];
const YEARS: &[&str] = &["2020", "2021", "2022", "2023", "2024", "2025"];

const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?'];
const TOKEN_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

pub(super) const DEFAULT_COMPANY: &str = "Unknown Company";
pub(super) const DEFAULT_POSITION: &str = "Software Developer";
pub(super) const DEFAULT_START_DATE: &str = "2020-01";
pub(super) const OPEN_END_DATE: &str = "Present";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Field {
    Name,
    Email,
    Phone,
    Skills,
    Experience,
}

#[derive(Debug)]
pub(super) struct Rule {
    pub field: Field,
    pub triggers: &'static [&'static str],
}

pub(super) const RULES: &[Rule] = &[
    Rule {
        field: Field::Name,
        triggers: &["name is", "my name"],
    },
    Rule {
        field: Field::Email,
        triggers: &["email", "@"],
    },
    Rule {
        field: Field::Phone,
        triggers: &["phone", "contact"],
    },
    Rule {
        field: Field::Skills,
        triggers: &["skill", "know", "can do"],
    },
    Rule {
        field: Field::Experience,
        triggers: EXPERIENCE_TRIGGERS,
    },
];

impl Rule {
    /// The first trigger of this rule present in `lower`.
    pub fn matched_trigger(&self, lower: &str) -> Option<&'static str> {
        self.triggers.iter().copied().find(|t| lower.contains(t))
    }
}

impl Field {
    pub fn apply(self, text: &str, lower: &str, trigger: &'static str, record: &mut ResumeRecord) {
        match self {
            Field::Name => {
                if let Some(name) = parse_name(text) {
                    record.basic_info.name = name;
                }
            }
            Field::Email => {
                if let Some(email) = parse_email(text) {
                    record.basic_info.email = email;
                }
            }
            Field::Phone => {
                if let Some(phone) = parse_phone(text) {
                    record.basic_info.phone = Some(phone);
                }
            }
            Field::Skills => {
                for skill in parse_skills(text, lower, trigger) {
                    record.add_skill(skill);
                }
            }
            Field::Experience => record.experience.extend(parse_experience(text)),
        }
    }
}

fn cut_at_terminator(s: &str) -> &str {
    match s.find(SENTENCE_TERMINATORS) {
        Some(idx) => &s[..idx],
        None => s,
    }
}

/// Text after the first "is", up to the end of that sentence.
pub(super) fn parse_name(text: &str) -> Option<String> {
    let (_, rest) = text.split_once("is")?;
    let name = cut_at_terminator(rest.trim()).trim();
    (!name.is_empty()).then(|| name.to_string())
}

pub(super) fn parse_email(text: &str) -> Option<String> {
    text.split_whitespace()
        .find(|word| word.contains('@') && word.contains('.'))
        .map(|word| word.trim_matches(TOKEN_PUNCTUATION))
        .filter(|email| !email.is_empty())
        .map(str::to_string)
}

/// The word after the last word mentioning "phone".
pub(super) fn parse_phone(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .windows(2)
        .filter(|pair| pair[0].to_ascii_lowercase().contains("phone"))
        .last()
        .map(|pair| pair[1].trim_matches(TOKEN_PUNCTUATION))
        .filter(|phone| !phone.is_empty())
        .map(str::to_string)
}

pub(super) fn parse_skills(text: &str, lower: &str, trigger: &'static str) -> Vec<Skill> {
    let mut keywords: Vec<&'static str> = SKILL_KEYWORDS
        .iter()
        .copied()
        .filter(|k| lower.contains(k))
        .collect();
    if keywords.is_empty() {
        keywords.push(trigger);
    }

    let mut skills = Vec::new();
    for keyword in keywords {
        let Some(pos) = lower.find(keyword) else {
            continue;
        };
        let listed = cut_at_terminator(&text[pos + keyword.len()..]);

        for candidate in listed.split(',') {
            let name = strip_connective(candidate.trim());
            if name.is_empty() || name.eq_ignore_ascii_case("and") {
                continue;
            }
            skills.push(Skill::new(name, keyword));
        }
    }
    skills
}

/// "and Docker" → "Docker"
fn strip_connective(candidate: &str) -> &str {
    match candidate.get(..4) {
        Some(head) if head.eq_ignore_ascii_case("and ") => candidate[4..].trim_start(),
        _ => candidate,
    }
}

pub(super) fn parse_experience(text: &str) -> Vec<Experience> {
    text.split('.')
        .filter_map(|sentence| {
            let lower = sentence.to_ascii_lowercase();
            if !EXPERIENCE_TRIGGERS.iter().any(|t| lower.contains(t)) {
                return None;
            }

            let company = token_after(sentence, &lower, COMPANY_MARKERS);
            let position = token_after(sentence, &lower, POSITION_MARKERS);
            if company.is_none() && position.is_none() {
                return None;
            }

            Some(Experience {
                company: company.unwrap_or_else(|| DEFAULT_COMPANY.to_string()),
                position: position.unwrap_or_else(|| DEFAULT_POSITION.to_string()),
                start_date: start_date(sentence).unwrap_or_else(|| DEFAULT_START_DATE.to_string()),
                end_date: OPEN_END_DATE.to_string(),
                description: format!("{}.", sentence.trim()),
                highlights: Vec::new(),
            })
        })
        .collect()
}

/// The space-delimited token after the first marker (in marker order) present in the sentence.
fn token_after(sentence: &str, lower: &str, markers: &[&str]) -> Option<String> {
    let marker = markers.iter().find(|m| lower.contains(*m))?;
    let pos = lower.find(marker)? + marker.len();
    let token = sentence[pos..].split(' ').next().unwrap_or("").trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn start_date(sentence: &str) -> Option<String> {
    MONTHS.iter().find_map(|month| {
        if !sentence.contains(month) {
            return None;
        }
        YEARS
            .iter()
            .find(|year| sentence.contains(*year))
            .map(|year| format!("{month} {year}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_cut_at_sentence_end() {
        assert_eq!(
            parse_name("My name is Jane Smith. I live in Oslo").as_deref(),
            Some("Jane Smith")
        );
        assert_eq!(parse_name("my name please"), None);
    }

    #[test]
    fn test_email_first_address_wins() {
        assert_eq!(
            parse_email("email: a@b.com, or c@d.org").as_deref(),
            Some("a@b.com")
        );
        assert_eq!(parse_email("ping me @ work"), None);
    }

    #[test]
    fn test_phone_takes_word_after_phone() {
        assert_eq!(
            parse_phone("You can contact me by phone 555-0100.").as_deref(),
            Some("555-0100")
        );
        assert_eq!(parse_phone("my phone"), None);
    }

    #[test]
    fn test_skills_from_keyword_list() {
        let text = "I have skills in the framework Axum, Actix.";
        let skills = parse_skills(text, &text.to_ascii_lowercase(), "skill");
        let names: Vec<_> = skills.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["Axum", "Actix"]);
        assert!(skills.iter().all(|s| s.category == "framework"));
    }

    #[test]
    fn test_skills_fall_back_to_trigger() {
        let text = "I know Go, React, and Docker.";
        let skills = parse_skills(text, &text.to_ascii_lowercase(), "know");
        let names: Vec<_> = skills.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["Go", "React", "Docker"]);
        assert!(skills.iter().all(|s| s.category == "know"));
    }

    #[test]
    fn test_skills_drop_bare_and() {
        let text = "I know C, and, Go.";
        let skills = parse_skills(text, &text.to_ascii_lowercase(), "know");
        let names: Vec<_> = skills.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["C", "Go"]);
    }

    #[test]
    fn test_experience_company_position_and_date() {
        let found = parse_experience("I work at Google as a engineer since March 2021. I like tea.");

        assert_eq!(found.len(), 1);
        let exp = &found[0];
        assert_eq!(exp.company, "Google");
        assert_eq!(exp.position, "engineer");
        assert_eq!(exp.start_date, "March 2021");
        assert_eq!(exp.end_date, "Present");
        assert_eq!(exp.description, "I work at Google as a engineer since March 2021.");
    }

    #[test]
    fn test_experience_defaults_missing_parts() {
        let found = parse_experience("I worked for Acme");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].company, "Acme");
        assert_eq!(found[0].position, DEFAULT_POSITION);
        assert_eq!(found[0].start_date, DEFAULT_START_DATE);
    }

    #[test]
    fn test_experience_requires_company_or_position() {
        assert!(parse_experience("I love my job").is_empty());
    }

    #[test]
    fn test_full_month_preferred_over_abbreviation() {
        assert_eq!(start_date("started January 2023").as_deref(), Some("January 2023"));
        assert_eq!(start_date("started Jan 2019"), None);
    }
}
