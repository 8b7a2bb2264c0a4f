//! Section-format files: `[name]` headers followed by body text.
//! Used for CV content files and for per-writer `.cvsettings` files.

pub mod map;
pub mod parser;

pub use map::SectionMap;
pub use parser::{parse_section_text, parse_sections, SectionSource};
