pub mod casing;
pub mod names;

pub use casing::{camel_case, sanitize_to_word_chars, snake_case};
pub use names::is_data_attribute;
