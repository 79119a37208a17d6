//! Record extraction: item fields, timing text and media links

mod duration;
mod extractor;
mod media;
mod record;

pub use duration::{
    format_duration, parse_duration_to_seconds, parse_start_and_duration,
    parse_start_and_duration_at, AdTiming, CALCULATED_PREFIX,
};
pub use extractor::RecordExtractor;
pub use media::MediaResolver;
pub use record::{AdRecord, MediaBundle, MediaKind};
