//! Compact string form of [`FilterSpec`].
//!
//! Project history stores applied filters as `name[:p1,p2,...]`:
//!
//! ```text
//! grayscale
//! brightness:25
//! blur:5
//! flip:true
//! crop:10,10,200,200        # left,top,right,bottom
//! ```
//!
//! The encoding is the single source of truth for filter names; the CLI parses
//! `--filter` arguments with it.

use super::params::{CropRect, FilterSpec};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
    #[error("Filter '{filter}' expects {expected} parameter(s), got {actual}")]
    ParameterCount {
        filter: String,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid value '{value}' for filter '{filter}'")]
    InvalidValue { filter: String, value: String },
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind_name();
        match self {
            FilterSpec::Grayscale
            | FilterSpec::Sepia
            | FilterSpec::Negative
            | FilterSpec::Sharpen
            | FilterSpec::EdgeDetection => write!(f, "{name}"),
            FilterSpec::Brightness(v)
            | FilterSpec::Contrast(v)
            | FilterSpec::Saturation(v)
            | FilterSpec::Vignette(v)
            | FilterSpec::Resize(v) => write!(f, "{name}:{v}"),
            FilterSpec::Blur(n) | FilterSpec::Posterize(n) => write!(f, "{name}:{n}"),
            FilterSpec::Rotate(d) => write!(f, "{name}:{d}"),
            FilterSpec::Flip { horizontal } => write!(f, "{name}:{horizontal}"),
            FilterSpec::Crop(r) => {
                write!(f, "{name}:{},{},{},{}", r.left, r.top, r.right, r.bottom)
            }
        }
    }
}

fn params<'a>(
    name: &str,
    raw: Option<&'a str>,
    expected: usize,
) -> Result<Vec<&'a str>, CodecError> {
    let values: Vec<&str> = match raw {
        Some(s) if !s.trim().is_empty() => s.split(',').map(str::trim).collect(),
        _ => Vec::new(),
    };
    if values.len() != expected {
        return Err(CodecError::ParameterCount {
            filter: name.to_string(),
            expected,
            actual: values.len(),
        });
    }
    Ok(values)
}

fn value<T: FromStr>(name: &str, raw: &str) -> Result<T, CodecError> {
    raw.parse().map_err(|_| CodecError::InvalidValue {
        filter: name.to_string(),
        value: raw.to_string(),
    })
}

impl FromStr for FilterSpec {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, raw) = match s.trim().split_once(':') {
            Some((n, p)) => (n.trim(), Some(p)),
            None => (s.trim(), None),
        };
        let name_lower = name.to_ascii_lowercase();
        let name = name_lower.as_str();

        let spec = match name {
            "grayscale" => {
                params(name, raw, 0)?;
                FilterSpec::Grayscale
            }
            "sepia" => {
                params(name, raw, 0)?;
                FilterSpec::Sepia
            }
            "negative" => {
                params(name, raw, 0)?;
                FilterSpec::Negative
            }
            "sharpen" => {
                params(name, raw, 0)?;
                FilterSpec::Sharpen
            }
            "edge_detection" => {
                params(name, raw, 0)?;
                FilterSpec::EdgeDetection
            }
            "brightness" => FilterSpec::Brightness(value(name, params(name, raw, 1)?[0])?),
            "contrast" => FilterSpec::Contrast(value(name, params(name, raw, 1)?[0])?),
            "saturation" => FilterSpec::Saturation(value(name, params(name, raw, 1)?[0])?),
            "blur" => FilterSpec::Blur(value(name, params(name, raw, 1)?[0])?),
            "posterize" => FilterSpec::Posterize(value(name, params(name, raw, 1)?[0])?),
            "vignette" => FilterSpec::Vignette(value(name, params(name, raw, 1)?[0])?),
            "rotate" => FilterSpec::Rotate(value(name, params(name, raw, 1)?[0])?),
            "flip" => FilterSpec::Flip {
                horizontal: value(name, params(name, raw, 1)?[0])?,
            },
            "resize" => FilterSpec::Resize(value(name, params(name, raw, 1)?[0])?),
            "crop" => {
                let p = params(name, raw, 4)?;
                FilterSpec::Crop(CropRect::new(
                    value(name, p[0])?,
                    value(name, p[1])?,
                    value(name, p[2])?,
                    value(name, p[3])?,
                ))
            }
            _ => return Err(CodecError::UnknownFilter(name.to_string())),
        };
        Ok(spec)
    }
}

/// Encode a filter list as one entry per filter.
pub fn encode_filters(filters: &[FilterSpec]) -> Vec<String> {
    filters.iter().map(ToString::to_string).collect()
}

/// Decode a stored filter list. Stops at the first malformed entry.
pub fn decode_filters<S: AsRef<str>>(entries: &[S]) -> Result<Vec<FilterSpec>, CodecError> {
    entries.iter().map(|e| e.as_ref().parse()).collect()
}
