pub mod align;
pub mod cli;
pub mod config;
pub mod csv;
pub mod dedup;
pub mod error;
pub mod extractor;
pub mod locale;
pub mod logging;
pub mod messages;
pub mod pipeline;
pub mod stopwords;
pub mod term;
pub mod text;
pub mod token;
pub mod xliff;

pub use align::{align, AlignOptions, TermPair};
pub use error::{ExtractError, Invalid, Result};
pub use extractor::{ExtractOptions, Extraction, TermExtractor};
pub use locale::Locale;
pub use stopwords::StopWords;
pub use term::Term;
pub use xliff::{Segment, XliffDocument};
