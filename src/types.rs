use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Genomic region in 0-based, half-open coordinates.
///
/// Parsed from `name`, `name:start` or `name:start-end`, where positions are
/// 1-based and inclusive as in samtools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub reference_name: String,
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl Region {
    pub fn whole(reference_name: impl Into<String>) -> Self {
        Self {
            reference_name: reference_name.into(),
            start: None,
            end: None,
        }
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, interval) = match s.rsplit_once(':') {
            Some((name, interval)) if !interval.is_empty() => (name, Some(interval)),
            _ => (s, None),
        };

        if name.is_empty() {
            return Err(Error::InvalidInput(format!("missing reference name: {}", s)));
        }

        let Some(interval) = interval else {
            return Ok(Region::whole(name));
        };

        let parse = |v: &str| -> Result<u64> {
            v.replace(',', "")
                .parse::<u64>()
                .map_err(|e| Error::InvalidInput(format!("invalid position {:?}: {}", v, e)))
        };

        let (start, end) = match interval.split_once('-') {
            Some((start, end)) => (parse(start)?, Some(parse(end)?)),
            None => (parse(interval)?, None),
        };

        if start == 0 {
            return Err(Error::InvalidInput(format!(
                "positions are 1-based, got 0: {}",
                s
            )));
        }
        if let Some(end) = end {
            if end < start {
                return Err(Error::InvalidInput(format!("inverted region: {}", s)));
            }
        }

        Ok(Region {
            reference_name: name.to_string(),
            start: Some(start - 1),
            end,
        })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference_name)?;
        match (self.start, self.end) {
            (None, None) => Ok(()),
            (start, Some(end)) => write!(f, ":{}-{}", start.unwrap_or(0) + 1, end),
            (Some(start), None) => write!(f, ":{}", start + 1),
        }
    }
}
