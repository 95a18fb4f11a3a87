use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColorError {
    #[error("invalid hex color `{0}`: expected RRGGBB (e.g. 1a1b26)")]
    Length(String),
    #[error("invalid hex color `{0}`: not a hexadecimal number")]
    Digits(String),
}
