use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MANGLED_NAME: Regex = Regex::new(r"^_[A-Za-z0-9]+__\w+$").unwrap();
}

/// Whether `name` can be declared as a field.
///
/// Dunder names and name-mangled private attributes are reserved.
pub fn is_data_attribute(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    if name.len() > 4 && name.starts_with("__") && name.ends_with("__") {
        return false;
    }
    !MANGLED_NAME.is_match(name)
}
