/// Banner class search scraping: session, paging and normalization
mod client;
mod diagnostics;
mod error;
mod normalize;
mod pager;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{extract_token, SessionClient, TermSession, TokenFingerprint, TOKEN_HEADER};
pub use diagnostics::{DiagnosticSink, FileSink, NullSink};
pub use error::ScrapeError;
pub use normalize::{active_days, location, normalize_section, parse_time, Normalized};
pub use pager::{SearchPortal, SubjectPager};
pub use types::*;

#[cfg(test)]
pub(crate) use diagnostics::RecordingSink;
