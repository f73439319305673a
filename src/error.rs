// ABOUTME: Custom error types for the converter CLI
// ABOUTME: Covers local input faults detected before any network activity

use std::fmt;

#[derive(Debug)]
pub enum ConverterError {
    Input(String),
    UnsupportedImage(String),
}

impl fmt::Display for ConverterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConverterError::Input(msg) => write!(f, "Input error: {}", msg),
            ConverterError::UnsupportedImage(msg) => write!(f, "Unsupported image: {}", msg),
        }
    }
}

impl std::error::Error for ConverterError {}
