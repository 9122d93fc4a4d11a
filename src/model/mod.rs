//! Model types shared by the pipeline stages.
//!
//! Data flows strictly forward: [`PageText`] lines from the text layer become an
//! [`Outline`] of [`Section`]s, sections become [`ScoredSection`]s, and the best
//! sections are mined for [`SubSectionHit`]s.

mod outline;
mod persona;
mod ranking;
mod text;

pub use outline::{DocumentOutline, HeadingLevel, Outline, Section};
pub use persona::{AnalysisRequest, JobToBeDone, Persona, Query};
pub use ranking::{ScoredSection, SubSectionHit};
pub use text::{FontSize, PageText, TextLine};
