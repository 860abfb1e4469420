//! Built-in validators for caller-supplied query inputs

pub mod email;
pub mod identifier;
pub mod length;
pub mod numeric;

pub use email::validate_email;
pub use identifier::{
    is_reserved_keyword, validate_identifier, validate_qualified_identifier,
    MAX_IDENTIFIER_LENGTH, MAX_QUALIFIED_SEGMENTS,
};
pub use length::validate_string;
pub use numeric::validate_integer;
