use crate::error::FrameError;
use std::fmt;
use std::str::FromStr;

/// Row-level routing tag: every row is destined for training or scoring.
///
/// The raw dataset carries this as a string column; any value other than
/// `train` or `predict` is a hard error rather than a silent drop, so a
/// mistagged row can never leak out of the split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTag {
    Train,
    Predict,
}

impl RowTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowTag::Train => "train",
            RowTag::Predict => "predict",
        }
    }
}

impl FromStr for RowTag {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(RowTag::Train),
            "predict" => Ok(RowTag::Predict),
            other => Err(FrameError::UnknownTag {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RowTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!("train".parse::<RowTag>().unwrap(), RowTag::Train);
        assert_eq!("predict".parse::<RowTag>().unwrap(), RowTag::Predict);
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        let err = "validate".parse::<RowTag>().unwrap_err();
        assert!(matches!(err, FrameError::UnknownTag { .. }));
    }

    #[test]
    fn test_round_trip() {
        for tag in [RowTag::Train, RowTag::Predict] {
            assert_eq!(tag.as_str().parse::<RowTag>().unwrap(), tag);
        }
    }
}
