// Generated by tdfgen. Do not edit by hand.

#![allow(dead_code, unused_imports)]

use std::io::{Cursor, Read, Result, Error, ErrorKind};

use byteorder::{LittleEndian, BigEndian, ReadBytesExt};

pub fn tdf_name(tdf_id: &u16) -> String
{
    match tdf_id {
        1 => String::from("ANNOUNCE"),
        30 => String::from("BLUETOOTH_RSSI"),
        43 => String::from("ANNOTATION"),
        46 => String::from("46"),
        50 => String::from("EMPTY"),
        _ => format!("{}", tdf_id),
    }
}

pub fn tdf_fields(tdf_id: &u16) -> Vec<&'static str>
{
    match tdf_id {
        1 => vec!["application","voltage","offset"],
        30 => vec!["address.type","address.val","rssi"],
        43 => vec!["timestamp","event"],
        46 => vec!["thread","frequency","reserved[0]","reserved[1]","payload"],
        50 => vec![],
        _ => vec!["unknown"],
    }
}

fn tdf_hex(buf: &[u8]) -> String
{
    buf.iter().map(|b| format!("{:02x}", b)).collect()
}

fn tdf_remaining(cursor: &Cursor<&[u8]>, cursor_start: u64, size: u8) -> Result<u8>
{
    let cursor_read = cursor.position() - cursor_start;
    if cursor_read >= size as u64 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "Insufficient data remaining",
        ));
    }
    Ok((size as u64 - cursor_read) as u8)
}

fn tdf_field_read_string(cursor: &mut Cursor<&[u8]>, size: u8) -> Result<String>
{
    let mut buf = vec![0u8; size as usize];
    cursor.read_exact(&mut buf)?;

    match String::from_utf8(buf) {
        Ok(val) => Ok(format!("\"{}\"", val.trim_matches(char::from(0)))),
        Err(..) => Ok(String::from("\"\"")),
    }
}

fn tdf_field_read_remaining_string(cursor: &mut Cursor<&[u8]>, cursor_start: u64, size: u8) -> Result<String>
{
    let remaining = tdf_remaining(cursor, cursor_start, size)?;
    tdf_field_read_string(cursor, remaining)
}

fn tdf_field_read_vla(cursor: &mut Cursor<&[u8]>, cursor_start: u64, size: u8) -> Result<String>
{
    let remaining = tdf_remaining(cursor, cursor_start, size)?;
    let mut buf = vec![0u8; remaining as usize];
    cursor.read_exact(&mut buf)?;
    Ok(tdf_hex(&buf))
}

pub fn tdf_read_into_str(tdf_id: &u16, size: u8, cursor: &mut Cursor<&[u8]>) -> Result<String>
{
    let cursor_start = cursor.position();

    let res = match tdf_id {
        1 =>
            Ok(format!(
                "0x{:08x},{},{}",
                cursor.read_u32::<LittleEndian>()?,
                cursor.read_u16::<LittleEndian>()? as f64 / 100.0,
                cursor.read_i24::<BigEndian>()?,
            )),
        30 =>
            Ok(format!(
                "{},0x{:012x},{}",
                cursor.read_u8()?,
                cursor.read_u48::<LittleEndian>()?,
                cursor.read_i8()?,
            )),
        43 =>
            Ok(format!(
                "{},{}",
                cursor.read_u32::<LittleEndian>()?,
                tdf_field_read_remaining_string(cursor, cursor_start, size)?,
            )),
        46 =>
            Ok(format!(
                "{},{},{},{},{}",
                tdf_field_read_string(cursor, 4)?,
                cursor.read_f32::<LittleEndian>()? as f64 * 0.3 + -40.0,
                cursor.read_u8()?,
                cursor.read_u8()?,
                tdf_field_read_vla(cursor, cursor_start, size)?,
            )),
        50 => Ok(String::new()),
        _ => {
            let mut buf = vec![0u8; size as usize];
            cursor.read_exact(&mut buf)?;
            Ok(tdf_hex(&buf))
        }
    };
    let cursor_read = cursor.position() - cursor_start;
    let underflow = (size as u64).saturating_sub(cursor_read);

    // Consume bytes the definition did not describe
    if underflow > 0 {
        tdf_field_read_string(cursor, underflow as u8)?;
    }
    res
}
