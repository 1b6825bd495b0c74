//! Deterministic résumé layout.
//!
//! [`compose`] flattens a [`ResumeRecord`] into styled lines and vertical gaps
//! in fixed section order. Placing those lines on pages is left to a
//! [`DocumentWriter`](crate::domain::ports::DocumentWriter).

mod metrics;

use serde::Serialize;

use crate::domain::{BasicInfo, ResumeRecord};

pub use metrics::{measure_mm, wrap};

pub const SUMMARY_HEADING: &str = "PROFESSIONAL SUMMARY";
pub const EXPERIENCE_HEADING: &str = "EXPERIENCE";
pub const EDUCATION_HEADING: &str = "EDUCATION";
pub const SKILLS_HEADING: &str = "SKILLS";
const HEADINGS: [&str; 4] = [
    SUMMARY_HEADING,
    EXPERIENCE_HEADING,
    EDUCATION_HEADING,
    SKILLS_HEADING,
];

pub const SKILL_SEPARATOR: &str = " • ";
const BULLET: &str = "•";

const NAME_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;

const NAME_ADVANCE: f32 = 12.0;
const HEADING_ADVANCE: f32 = 8.0;
const ENTRY_ADVANCE: f32 = 6.0;
const BODY_LINE_HEIGHT: f32 = 5.0;
const SECTION_GAP: f32 = 4.0;
const HIGHLIGHT_GAP: f32 = 2.0;
const HIGHLIGHT_INDENT: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub text: String,
    pub style: FontStyle,
    pub size_pt: f32,
    /// Vertical distance to the next item.
    pub advance_mm: f32,
    pub indent_mm: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LayoutItem {
    Text(TextLine),
    Gap(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSpec {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

impl PageSpec {
    pub fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: 10.0,
        }
    }

    pub fn text_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::a4()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    pub title: String,
    pub page: PageSpec,
    pub items: Vec<LayoutItem>,
}

impl PageLayout {
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.items.iter().filter_map(|item| match item {
            LayoutItem::Text(line) => Some(line),
            LayoutItem::Gap(_) => None,
        })
    }

    pub fn has_section(&self, heading: &str) -> bool {
        self.lines().any(|l| l.text == heading)
    }

    /// Text of the lines between `heading` and the next section heading.
    pub fn section(&self, heading: &str) -> Vec<&str> {
        self.lines()
            .skip_while(|l| l.text != heading)
            .skip(1)
            .take_while(|l| !HEADINGS.contains(&l.text.as_str()))
            .map(|l| l.text.as_str())
            .collect()
    }
}

struct LayoutBuilder {
    items: Vec<LayoutItem>,
    text_width: f32,
}

impl LayoutBuilder {
    fn new(text_width: f32) -> Self {
        Self {
            items: Vec::new(),
            text_width,
        }
    }

    fn line(&mut self, text: impl Into<String>, style: FontStyle, size_pt: f32, advance_mm: f32) {
        self.items.push(LayoutItem::Text(TextLine {
            text: text.into(),
            style,
            size_pt,
            advance_mm,
            indent_mm: 0.0,
        }));
    }

    fn heading(&mut self, text: &str) {
        self.line(text, FontStyle::Bold, HEADING_SIZE, HEADING_ADVANCE);
    }

    fn paragraph(&mut self, text: &str, indent_mm: f32) {
        for (i, line) in wrap(text, self.text_width - indent_mm, FontStyle::Regular, BODY_SIZE)
            .into_iter()
            .enumerate()
        {
            self.items.push(LayoutItem::Text(TextLine {
                text: line,
                style: FontStyle::Regular,
                size_pt: BODY_SIZE,
                advance_mm: BODY_LINE_HEIGHT,
                // Continuation lines hang under the first word.
                indent_mm: if i == 0 { 0.0 } else { indent_mm },
            }));
        }
    }

    fn gap(&mut self, mm: f32) {
        self.items.push(LayoutItem::Gap(mm));
    }
}

fn contact_lines(info: &BasicInfo) -> Vec<String> {
    let fields = [
        ("Email", Some(info.email.as_str())),
        ("Phone", info.phone.as_deref()),
        ("LinkedIn", info.linkedin.as_deref()),
        ("GitHub", info.github.as_deref()),
        ("Website", info.website.as_deref()),
    ];

    fields
        .into_iter()
        .filter_map(|(label, value)| match value {
            Some(v) if !v.is_empty() => Some(format!("{label}: {v}")),
            _ => None,
        })
        .collect()
}

pub fn compose(record: &ResumeRecord, page: PageSpec) -> PageLayout {
    let mut b = LayoutBuilder::new(page.text_width_mm());

    b.line(&record.basic_info.name, FontStyle::Bold, NAME_SIZE, NAME_ADVANCE);
    for contact in contact_lines(&record.basic_info) {
        b.line(contact, FontStyle::Regular, BODY_SIZE, ENTRY_ADVANCE);
    }

    b.gap(SECTION_GAP);
    b.heading(SUMMARY_HEADING);
    b.paragraph(&record.summary, 0.0);

    b.gap(SECTION_GAP);
    b.heading(EXPERIENCE_HEADING);
    for exp in &record.experience {
        b.line(
            format!("{} | {}", exp.position, exp.company),
            FontStyle::Bold,
            BODY_SIZE,
            ENTRY_ADVANCE,
        );
        b.line(
            format!("{} - {}", exp.start_date, exp.end_date),
            FontStyle::Italic,
            BODY_SIZE,
            ENTRY_ADVANCE,
        );
        b.paragraph(&exp.description, 0.0);

        if !exp.highlights.is_empty() {
            b.gap(HIGHLIGHT_GAP);
            for highlight in &exp.highlights {
                b.paragraph(&format!("{BULLET} {highlight}"), HIGHLIGHT_INDENT);
            }
        }
        b.gap(SECTION_GAP);
    }

    if !record.education.is_empty() {
        b.heading(EDUCATION_HEADING);
        for edu in &record.education {
            b.line(
                format!("{} in {}", edu.degree, edu.field),
                FontStyle::Bold,
                BODY_SIZE,
                ENTRY_ADVANCE,
            );
            b.line(&edu.institution, FontStyle::Regular, BODY_SIZE, ENTRY_ADVANCE);
            b.line(
                format!("{} - {}", edu.start_date, edu.end_date),
                FontStyle::Italic,
                BODY_SIZE,
                HEADING_ADVANCE,
            );
        }
    }

    if !record.skills.is_empty() {
        b.gap(SECTION_GAP);
        b.heading(SKILLS_HEADING);
        let joined = record
            .skills
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(SKILL_SEPARATOR);
        b.paragraph(&joined, 0.0);
    }

    PageLayout {
        title: format!("Resume - {}", record.basic_info.name),
        page,
        items: b.items,
    }
}
