//! ICAO 9303 logical data structure records

use std::fmt;

mod com;

pub use com::Com;

/// Tags of the LDS1 records decoded here
pub mod tags {
    /// EF.COM template
    pub const COM: u8 = 0x60;
    /// LDS version number
    pub const LDS_VERSION: u8 = 0x01;
    /// Unicode version number
    pub const UNICODE_VERSION: u8 = 0x36;
    /// List of present data groups
    pub const TAG_LIST: u8 = 0x5C;
}

/// A data group of the LDS1 application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum DataGroup {
    Dg1,
    Dg2,
    Dg3,
    Dg4,
    Dg5,
    Dg6,
    Dg7,
    Dg8,
    Dg9,
    Dg10,
    Dg11,
    Dg12,
    Dg13,
    Dg14,
    Dg15,
    Dg16,
}

/// Data group tag codes as listed in EF.COM
const DATA_GROUPS: [(u8, DataGroup); 16] = [
    (0x61, DataGroup::Dg1),
    (0x75, DataGroup::Dg2),
    (0x63, DataGroup::Dg3),
    (0x76, DataGroup::Dg4),
    (0x65, DataGroup::Dg5),
    (0x66, DataGroup::Dg6),
    (0x67, DataGroup::Dg7),
    (0x68, DataGroup::Dg8),
    (0x69, DataGroup::Dg9),
    (0x6A, DataGroup::Dg10),
    (0x6B, DataGroup::Dg11),
    (0x6C, DataGroup::Dg12),
    (0x6D, DataGroup::Dg13),
    (0x6E, DataGroup::Dg14),
    (0x6F, DataGroup::Dg15),
    (0x70, DataGroup::Dg16),
];

impl DataGroup {
    /// Look up a data group by its tag code
    pub fn from_code(code: u8) -> Option<Self> {
        DATA_GROUPS
            .iter()
            .find(|(candidate, _)| *candidate == code)
            .map(|&(_, group)| group)
    }

    /// Tag code of this data group
    pub const fn code(self) -> u8 {
        DATA_GROUPS[self.number() as usize - 1].0
    }

    /// Data group number, 1 to 16
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Symbolic name such as `DG1`
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dg1 => "DG1",
            Self::Dg2 => "DG2",
            Self::Dg3 => "DG3",
            Self::Dg4 => "DG4",
            Self::Dg5 => "DG5",
            Self::Dg6 => "DG6",
            Self::Dg7 => "DG7",
            Self::Dg8 => "DG8",
            Self::Dg9 => "DG9",
            Self::Dg10 => "DG10",
            Self::Dg11 => "DG11",
            Self::Dg12 => "DG12",
            Self::Dg13 => "DG13",
            Self::Dg14 => "DG14",
            Self::Dg15 => "DG15",
            Self::Dg16 => "DG16",
        }
    }
}

impl fmt::Display for DataGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An entry of the EF.COM tag list
///
/// Codes outside the data group table are kept rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataGroupTag {
    /// A code from the table
    Known(DataGroup),
    /// Any other code
    Unknown(u8),
}

impl DataGroupTag {
    /// Map a tag code through the data group table
    pub fn from_code(code: u8) -> Self {
        DataGroup::from_code(code).map_or(Self::Unknown(code), Self::Known)
    }

    /// Raw tag code
    pub const fn code(self) -> u8 {
        match self {
            Self::Known(group) => group.code(),
            Self::Unknown(code) => code,
        }
    }

    /// Symbolic name, `unknown` outside the table
    pub const fn name(self) -> &'static str {
        match self {
            Self::Known(group) => group.name(),
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for DataGroupTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_consistent() {
        for (code, group) in DATA_GROUPS {
            assert_eq!(DataGroup::from_code(code), Some(group));
            assert_eq!(group.code(), code);
        }
        assert_eq!(DataGroup::Dg16.number(), 16);
    }

    #[test]
    fn test_gaps_in_code_range() {
        assert_eq!(DataGroupTag::from_code(0x61).name(), "DG1");
        assert_eq!(DataGroupTag::from_code(0x75).name(), "DG2");
        assert_eq!(DataGroupTag::from_code(0x64), DataGroupTag::Unknown(0x64));
        assert_eq!(DataGroupTag::from_code(0x62).to_string(), "unknown");
        assert_eq!(DataGroupTag::from_code(0x77).code(), 0x77);
    }
}
