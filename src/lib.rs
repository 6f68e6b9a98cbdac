pub mod constants;
pub mod error;
pub mod event;
pub mod extract;
pub mod parser;
pub mod render;
pub mod score_file;
pub mod semantic;
pub mod tie;

pub use error::*;
pub use event::{Event, Pitch, RenderSettings, Score, ScoreSettings, SimpleEvent, Volume};
pub use extract::{
    AttributeExtractor, ExtractedFields, Extraction, FieldExtractor, MissingAttribute,
};
pub use parser::parse;
pub use render::{isis_path, set_isis_path, IsisConverter};
pub use score_file::IsisScoreConverter;
pub use semantic::validate;

use std::path::Path;

impl Score {
    /// Score file converter configured from this score's settings
    pub fn score_converter(&self) -> IsisScoreConverter {
        IsisScoreConverter::new(self.settings.clone())
    }

    /// ISiS converter configured from this score's settings
    pub fn converter(&self) -> IsisConverter {
        IsisConverter::new(self.score_converter(), self.render.clone())
    }
}

/// Compile a YAML score source to ISiS score file text.
/// This is the main entry point for the library.
pub fn compile(source: &str) -> Result<String, IsisError> {
    let score = parse(source)?;
    validate(&score)?;
    score.score_converter().to_score_file(&score.event)
}

/// Compile without validation
pub fn compile_unchecked(source: &str) -> Result<String, IsisError> {
    let score = parse(source)?;
    score.score_converter().to_score_file(&score.event)
}

/// Compile a YAML score source and render it to `path` with ISiS
pub fn render(source: &str, path: impl AsRef<Path>) -> Result<(), IsisError> {
    let score = parse(source)?;
    validate(&score)?;
    score.converter().convert(&score.event, path)
}
