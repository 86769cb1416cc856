use super::{DataGroup, DataGroupTag, tags};
use crate::decoder::Decode;
use crate::error::{Error, Result};
use crate::tlv::Tlv;

/// EF.COM: LDS and Unicode versions plus the list of present data groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Com {
    lds_version: String,
    unicode_version: String,
    data_groups: Vec<DataGroupTag>,
}

impl Com {
    /// LDS version, formatted `aa.bb`
    pub fn lds_version(&self) -> &str {
        &self.lds_version
    }

    /// Unicode version, formatted `aa.bb.cc`
    pub fn unicode_version(&self) -> &str {
        &self.unicode_version
    }

    /// Tag list entries in card order
    pub fn data_groups(&self) -> &[DataGroupTag] {
        &self.data_groups
    }

    /// Names of the listed data groups, `unknown` for codes outside the table
    pub fn present_groups(&self) -> Vec<&'static str> {
        self.data_groups.iter().map(|tag| tag.name()).collect()
    }

    /// Check if a data group is listed
    pub fn contains(&self, group: DataGroup) -> bool {
        self.data_groups.contains(&DataGroupTag::Known(group))
    }
}

impl Decode for Com {
    const TAG: u8 = tags::COM;

    fn decode_value(tlv: &Tlv<'_>) -> Result<Self> {
        let mut reader = tlv.reader();

        let lds = reader.expect_primitive(tags::LDS_VERSION, 4, "LDS version")?;
        let unicode = reader.expect_primitive(tags::UNICODE_VERSION, 6, "Unicode version")?;
        let list = reader.expect_tag(tags::TAG_LIST)?;

        Ok(Self {
            lds_version: dotted_version(&lds, "LDS version")?,
            unicode_version: dotted_version(&unicode, "Unicode version")?,
            data_groups: list.value().iter().copied().map(DataGroupTag::from_code).collect(),
        })
    }
}

/// Format ASCII digits in pairs separated by dots
fn dotted_version(tlv: &Tlv<'_>, field: &'static str) -> Result<String> {
    let digits = tlv.value();
    if let Some(position) = digits.iter().position(|byte| !byte.is_ascii_digit()) {
        return Err(Error::InvalidValue {
            field,
            reason: "version must be ASCII digits",
            offset: tlv.value_offset() + position,
        });
    }

    let pairs: Vec<&str> = digits
        .chunks(2)
        .filter_map(|pair| std::str::from_utf8(pair).ok())
        .collect();
    Ok(pairs.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tlv::encode;
    use hex_literal::hex;

    const COM: [u8; 20] = hex!("6012 010430313037 3606303430303030 5C026175");

    #[test]
    fn test_decode_com() {
        let com = Com::decode(&COM).unwrap();
        assert_eq!(com.lds_version(), "01.07");
        assert_eq!(com.unicode_version(), "04.00.00");
        assert_eq!(com.present_groups(), vec!["DG1", "DG2"]);
        assert!(com.contains(DataGroup::Dg2));
        assert!(!com.contains(DataGroup::Dg3));
    }

    #[test]
    fn test_unicode_version_length_mismatch() {
        let data = hex!("6011 010430313037 36053034303030 5C026175");
        let err = Com::decode(&data).unwrap_err();
        assert_eq!(
            err,
            Error::LengthMismatch {
                field: "Unicode version",
                expected: 6,
                found: 5,
                offset: 8
            }
        );
    }

    #[test]
    fn test_wrong_outer_tag_fails_first() {
        let mut data = COM;
        data[0] = 0x61;
        // corrupt the inner grammar too; the outer tag must be reported
        data[2] = 0x02;
        assert_eq!(
            Com::decode(&data).unwrap_err(),
            Error::TagMismatch {
                expected: 0x60,
                found: 0x61,
                offset: 0
            }
        );
    }

    #[test]
    fn test_inner_tags_are_checked_in_order() {
        let mut value = encode(0x36, b"040000");
        value.extend(encode(0x01, b"0107"));
        value.extend(encode(0x5C, &[0x61]));
        let err = Com::decode(&encode(0x60, &value)).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedTag {
                expected: 0x01,
                found: 0x36,
                offset: 2
            }
        ));
    }

    #[test]
    fn test_missing_tag_list() {
        let mut value = encode(0x01, b"0108");
        value.extend(encode(0x36, b"040000"));
        let err = Com::decode(&encode(0x60, &value)).unwrap_err();
        assert!(matches!(err, Error::TruncatedInput { offset: 16, .. }));
    }

    #[test]
    fn test_unknown_codes_do_not_fail() {
        let mut value = encode(0x01, b"0107");
        value.extend(encode(0x36, b"040000"));
        value.extend(encode(0x5C, &hex!("61 64 6E")));
        let com = Com::decode(&encode(0x60, &value)).unwrap();
        assert_eq!(com.present_groups(), vec!["DG1", "unknown", "DG14"]);
        assert_eq!(com.data_groups()[1], DataGroupTag::Unknown(0x64));
    }

    #[test]
    fn test_non_digit_version() {
        let mut value = encode(0x01, b"01A7");
        value.extend(encode(0x36, b"040000"));
        value.extend(encode(0x5C, &[]));
        assert_eq!(
            Com::decode(&encode(0x60, &value)).unwrap_err(),
            Error::InvalidValue {
                field: "LDS version",
                reason: "version must be ASCII digits",
                offset: 6
            }
        );
    }
}
