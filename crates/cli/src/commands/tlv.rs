//! Commands for TLV data

use idcard_asn1::icao::Com;
use idcard_asn1::{CardRecord, FileControlParameters, TlvReader};
use std::error::Error;

/// Print the node tree of a TLV buffer
pub fn tlv_command(data: &[u8]) -> Result<(), Box<dyn Error>> {
    let mut lines = Vec::new();
    dump(TlvReader::new(data), 0, &mut lines)?;
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// Decode a known record and print its fields
pub fn decode_command(data: &[u8]) -> Result<(), Box<dyn Error>> {
    match CardRecord::decode_any(data)? {
        CardRecord::Com(com) => print_com(&com),
        CardRecord::Fcp(fcp) => print_fcp(&fcp),
    }
    Ok(())
}

fn dump(reader: TlvReader<'_>, depth: usize, lines: &mut Vec<String>) -> idcard_asn1::Result<()> {
    for node in reader {
        let node = node?;
        let indent = "  ".repeat(depth);
        if node.is_constructed() && !node.is_empty() {
            lines.push(format!("{indent}{:02X} [{}] @{}", node.tag(), node.len(), node.offset()));
            dump(node.reader(), depth + 1, lines)?;
        } else {
            lines.push(format!(
                "{indent}{:02X} [{}] @{}: {}",
                node.tag(),
                node.len(),
                node.offset(),
                hex::encode_upper(node.value())
            ));
        }
    }
    Ok(())
}

fn print_com(com: &Com) {
    println!("EF.COM");
    println!("  LDS version:     {}", com.lds_version());
    println!("  Unicode version: {}", com.unicode_version());
    for group in com.data_groups() {
        println!("  {:02X} {group}", group.code());
    }
}

fn print_fcp(fcp: &FileControlParameters) {
    println!("FCP");
    if let Some(size) = fcp.file_size {
        println!("  File size:   {size}");
    }
    if let Some(descriptor) = &fcp.descriptor {
        println!("  Descriptor:  {}", hex::encode_upper(descriptor));
    }
    if let Some(fid) = fcp.file_id {
        println!("  File id:     {}", hex::encode_upper(fid));
    }
    if let Some(name) = &fcp.df_name {
        println!("  DF name:     {}", hex::encode_upper(name));
    }
    if let Some(life_cycle) = fcp.life_cycle {
        println!("  Life cycle:  {life_cycle:02X}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_nested() {
        let data = [0x60, 0x07, 0x01, 0x02, 0x30, 0x31, 0x5C, 0x01, 0x61, 0x04, 0x00];
        let mut lines = Vec::new();
        dump(TlvReader::new(&data), 0, &mut lines).unwrap();

        assert_eq!(
            lines,
            vec!["60 [7] @0", "  01 [2] @2: 3031", "  5C [1] @6: 61", "04 [0] @9: "]
        );
    }

    #[test]
    fn test_dump_reports_offset_of_truncation() {
        let data = [0x62, 0x04, 0x80, 0x05, 0x00, 0x01];
        let err = dump(TlvReader::new(&data), 0, &mut Vec::new()).unwrap_err();
        assert_eq!(err.offset(), 4);
    }
}
