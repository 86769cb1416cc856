//! File control parameters returned by SELECT

use crate::decoder::Decode;
use crate::error::{Error, Result};
use crate::tlv::Tlv;

/// Tags of the FCP template
pub mod tags {
    /// FCP template
    pub const FCP: u8 = 0x62;
    /// Number of data bytes in the file
    pub const FILE_SIZE: u8 = 0x80;
    /// File descriptor
    pub const DESCRIPTOR: u8 = 0x82;
    /// File identifier
    pub const FILE_ID: u8 = 0x83;
    /// DF name
    pub const DF_NAME: u8 = 0x84;
    /// Life cycle status
    pub const LIFE_CYCLE: u8 = 0x8A;
}

/// FCP template (ISO 7816-4 tag `62`)
///
/// Every element is optional. Elements may appear in any order; tags not
/// listed in [`tags`] are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileControlParameters {
    /// Size of the file's data
    pub file_size: Option<u32>,
    /// File descriptor bytes
    pub descriptor: Option<Vec<u8>>,
    /// File identifier
    pub file_id: Option<[u8; 2]>,
    /// DF name
    pub df_name: Option<Vec<u8>>,
    /// Life cycle status byte
    pub life_cycle: Option<u8>,
}

impl Decode for FileControlParameters {
    const TAG: u8 = tags::FCP;

    fn decode_value(tlv: &Tlv<'_>) -> Result<Self> {
        let mut fcp = Self::default();

        for node in tlv.reader() {
            let node = node?;
            match node.tag() {
                tags::FILE_SIZE => fcp.file_size = Some(file_size(&node)?),
                tags::DESCRIPTOR => fcp.descriptor = Some(node.value().to_vec()),
                tags::FILE_ID => {
                    let &[hi, lo] = node.value() else {
                        return Err(Error::LengthMismatch {
                            field: "file identifier",
                            expected: 2,
                            found: node.len(),
                            offset: node.offset(),
                        });
                    };
                    fcp.file_id = Some([hi, lo]);
                }
                tags::DF_NAME => fcp.df_name = Some(node.value().to_vec()),
                tags::LIFE_CYCLE => {
                    let &[status] = node.value() else {
                        return Err(Error::LengthMismatch {
                            field: "life cycle status",
                            expected: 1,
                            found: node.len(),
                            offset: node.offset(),
                        });
                    };
                    fcp.life_cycle = Some(status);
                }
                _ => {}
            }
        }

        Ok(fcp)
    }
}

fn file_size(node: &Tlv<'_>) -> Result<u32> {
    if node.is_empty() || node.len() > 4 {
        return Err(Error::InvalidValue {
            field: "file size",
            reason: "expected 1 to 4 bytes",
            offset: node.offset(),
        });
    }
    Ok(node
        .value()
        .iter()
        .fold(0u32, |size, &byte| (size << 8) | u32::from(byte)))
}
