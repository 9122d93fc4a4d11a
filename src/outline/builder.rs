//! Section assembly from classified lines.

use std::mem;

use crate::model::{HeadingLevel, Section, TextLine};

use super::classify::LineClass;

#[derive(Debug, Default)]
enum State {
    #[default]
    NoOpenSection,
    SectionOpen {
        section: Section,
        body: Vec<String>,
    },
}

/// Per-document state machine turning classified lines into sections.
///
/// Sections are page-local: [`OutlineBuilder::end_page`] closes whatever is open.
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    sections: Vec<Section>,
    state: State,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line of the current page.
    pub fn push(&mut self, line: &TextLine, class: LineClass) {
        match class {
            LineClass::Heading(level) => self.open(level, line),
            LineClass::Body => {
                if let State::SectionOpen { body, .. } = &mut self.state {
                    body.push(line.text.trim().to_string());
                }
            }
            LineClass::Noise | LineClass::Title => {}
        }
    }

    /// Close the open section, if any, at the end of a page.
    pub fn end_page(&mut self) {
        self.close();
    }

    /// Emitted sections, before cross-line merging.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Close any open section and merge split headings.
    pub fn finish(mut self) -> Vec<Section> {
        self.close();
        merge_continued_headings(self.sections)
    }

    fn open(&mut self, level: HeadingLevel, line: &TextLine) {
        self.close();
        self.state = State::SectionOpen {
            section: Section::new(level, line.text.trim(), line.page),
            body: Vec::new(),
        };
    }

    fn close(&mut self) {
        if let State::SectionOpen { mut section, body } = mem::take(&mut self.state) {
            section.content = body.join(" ").trim().to_string();
            self.sections.push(section);
        }
    }
}

/// Merge runs of consecutive bodiless sections that share level and page.
///
/// A heading the layout engine broke over several lines comes out as several
/// sections; this glues them back together. Runs of any length collapse into one.
/// A section that already has body text ends the run.
pub fn merge_continued_headings(sections: Vec<Section>) -> Vec<Section> {
    let mut merged: Vec<Section> = Vec::with_capacity(sections.len());
    for section in sections {
        match merged.last_mut() {
            Some(last) if last.continues_with(&section) => last.absorb(section),
            _ => merged.push(section),
        }
    }
    merged
}
