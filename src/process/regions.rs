// src/process/regions.rs

use std::fmt;

use crate::error::LoadError;

/// A state or territory whose legislature publishes bulk data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Two-letter postal abbreviation, upper case.
    pub abbreviation: &'static str,
    /// Display name, e.g. "New Hampshire".
    pub name: &'static str,
}

static REGIONS: &[Region] = &[
    Region { abbreviation: "AL", name: "Alabama" },
    Region { abbreviation: "AK", name: "Alaska" },
    Region { abbreviation: "AZ", name: "Arizona" },
    Region { abbreviation: "AR", name: "Arkansas" },
    Region { abbreviation: "CA", name: "California" },
    Region { abbreviation: "CO", name: "Colorado" },
    Region { abbreviation: "CT", name: "Connecticut" },
    Region { abbreviation: "DE", name: "Delaware" },
    Region { abbreviation: "DC", name: "District of Columbia" },
    Region { abbreviation: "FL", name: "Florida" },
    Region { abbreviation: "GA", name: "Georgia" },
    Region { abbreviation: "HI", name: "Hawaii" },
    Region { abbreviation: "ID", name: "Idaho" },
    Region { abbreviation: "IL", name: "Illinois" },
    Region { abbreviation: "IN", name: "Indiana" },
    Region { abbreviation: "IA", name: "Iowa" },
    Region { abbreviation: "KS", name: "Kansas" },
    Region { abbreviation: "KY", name: "Kentucky" },
    Region { abbreviation: "LA", name: "Louisiana" },
    Region { abbreviation: "ME", name: "Maine" },
    Region { abbreviation: "MD", name: "Maryland" },
    Region { abbreviation: "MA", name: "Massachusetts" },
    Region { abbreviation: "MI", name: "Michigan" },
    Region { abbreviation: "MN", name: "Minnesota" },
    Region { abbreviation: "MS", name: "Mississippi" },
    Region { abbreviation: "MO", name: "Missouri" },
    Region { abbreviation: "MT", name: "Montana" },
    Region { abbreviation: "NE", name: "Nebraska" },
    Region { abbreviation: "NV", name: "Nevada" },
    Region { abbreviation: "NH", name: "New Hampshire" },
    Region { abbreviation: "NJ", name: "New Jersey" },
    Region { abbreviation: "NM", name: "New Mexico" },
    Region { abbreviation: "NY", name: "New York" },
    Region { abbreviation: "NC", name: "North Carolina" },
    Region { abbreviation: "ND", name: "North Dakota" },
    Region { abbreviation: "OH", name: "Ohio" },
    Region { abbreviation: "OK", name: "Oklahoma" },
    Region { abbreviation: "OR", name: "Oregon" },
    Region { abbreviation: "PA", name: "Pennsylvania" },
    Region { abbreviation: "PR", name: "Puerto Rico" },
    Region { abbreviation: "RI", name: "Rhode Island" },
    Region { abbreviation: "SC", name: "South Carolina" },
    Region { abbreviation: "SD", name: "South Dakota" },
    Region { abbreviation: "TN", name: "Tennessee" },
    Region { abbreviation: "TX", name: "Texas" },
    Region { abbreviation: "UT", name: "Utah" },
    Region { abbreviation: "VT", name: "Vermont" },
    Region { abbreviation: "VA", name: "Virginia" },
    Region { abbreviation: "WA", name: "Washington" },
    Region { abbreviation: "WV", name: "West Virginia" },
    Region { abbreviation: "WI", name: "Wisconsin" },
    Region { abbreviation: "WY", name: "Wyoming" },
];

impl Region {
    /// Look up by postal abbreviation, case-insensitively.
    pub fn from_abbreviation(abbr: &str) -> Result<Region, LoadError> {
        REGIONS
            .iter()
            .find(|r| r.abbreviation.eq_ignore_ascii_case(abbr))
            .copied()
            .ok_or_else(|| LoadError::UnknownRegion(abbr.to_string()))
    }

    /// Resolve user input: an abbreviation, a display name, or a key.
    pub fn find(input: &str) -> Result<Region, LoadError> {
        let wanted = input.trim();
        REGIONS
            .iter()
            .find(|r| {
                r.abbreviation.eq_ignore_ascii_case(wanted)
                    || r.name.eq_ignore_ascii_case(wanted)
                    || r.key() == wanted.to_lowercase().replace('_', " ")
            })
            .copied()
            .ok_or_else(|| LoadError::UnknownRegion(input.to_string()))
    }

    /// Lower-case display name, spaces kept. Used as the configuration
    /// section and the default database name.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups() {
        let il = Region::from_abbreviation("il").unwrap();
        assert_eq!(il.name, "Illinois");
        assert_eq!(il.key(), "illinois");

        let nh = Region::find("new hampshire").unwrap();
        assert_eq!(nh.abbreviation, "NH");
        assert_eq!(nh.key(), "new hampshire");
        assert_eq!(Region::find("new_hampshire").unwrap(), nh);
        assert_eq!(Region::find("NH").unwrap(), nh);
    }

    #[test]
    fn unknown_region() {
        assert!(matches!(
            Region::from_abbreviation("XX"),
            Err(LoadError::UnknownRegion(_))
        ));
        assert!(Region::find("Atlantis").is_err());
    }

    #[test]
    fn abbreviations_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for r in REGIONS {
            assert!(seen.insert(r.abbreviation), "{} repeated", r.abbreviation);
        }
        assert_eq!(REGIONS.len(), 52);
    }
}
