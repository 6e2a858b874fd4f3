//! Convert tables of letters into the Correspondence Metadata Interchange
//! (CMI) format, a TEI-based XML vocabulary for letter metadata.

pub mod authority;
pub mod cli;
pub mod config;
pub mod correspondent;
pub mod date;
pub mod document;
pub mod edition;
pub mod entry;
pub mod error;
pub mod header;
pub mod ids;
pub mod letter;

pub use authority::{AuthorityResolver, EntityKind};
pub use config::Config;
pub use date::{NormalizedDate, normalize_date};
pub use document::CmiDocument;
pub use error::CmiError;
pub use letter::{ConvertOptions, Converter, LetterRecord};
