//! Date and numeric normalization helpers shared by the parser, validator and
//! transformation executors.

pub mod datetime;
pub mod numeric;

pub use datetime::{
    DEFAULT_INPUT_FORMATS, ISO_DATE_FORMAT, age_on, looks_like_date, normalize_date, parse_date,
    parse_date_with, parse_iso_date,
};
pub use numeric::{parse_number_text, round_to};
