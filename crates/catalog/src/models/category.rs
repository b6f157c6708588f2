use crate::error::{Error, ErrorKind};
use std::fmt;
use std::str::FromStr;

/// The closed set of event categories a photo can be filed under.
///
/// Stored in the catalog by [slug](Self::slug).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    PreWedding,
    BridesDinner,
    MorningWedding,
    GroomsDinner,
}

impl Category {
    /// Every category, in shorthand order.
    pub const ALL: [Self; 4] = [Self::PreWedding, Self::BridesDinner, Self::MorningWedding, Self::GroomsDinner];

    pub fn slug(&self) -> &'static str {
        match self {
            Self::PreWedding => "pre-wedding",
            Self::BridesDinner => "brides-dinner",
            Self::MorningWedding => "morning-wedding",
            Self::GroomsDinner => "grooms-dinner",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PreWedding => "Pre-Wedding",
            Self::BridesDinner => "Bride's Dinner",
            Self::MorningWedding => "Morning Wedding",
            Self::GroomsDinner => "Groom's Dinner",
        }
    }

    /// Numeric shorthand accepted on the command line (`1` to `4`).
    pub fn shorthand(&self) -> u8 {
        match self {
            Self::PreWedding => 1,
            Self::BridesDinner => 2,
            Self::MorningWedding => 3,
            Self::GroomsDinner => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Accepts either the numeric shorthand or the slug (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.slug() == needle || category.shorthand().to_string() == needle)
            .ok_or_else(|| Error::from(ErrorKind::InvalidCategory(s.to_string())))
    }
}
