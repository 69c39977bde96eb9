//! FAST UI input handling: the record parser, batch file readers and CSV
//! input templates.

pub mod error;
pub mod parser;
pub mod reader;
pub mod template;

pub use error::{IngestError, ParsingError, Result};
pub use parser::{
    FastUiParser, NULL_TOKENS, ParseOptions, ParseStats, ParsedRecord, normalize_field_name,
};
pub use reader::{
    InputFormat, MAX_INPUT_FILE_SIZE, check_file_size, read_csv_records, read_json_records,
    read_records,
};
pub use template::{csv_template, write_csv_template};
