//! # NDEF Framing
//!
//! A label is one NDEF record (TNF "unknown", empty type) wrapped in a
//! Type 2 Tag TLV block:
//!
//! ```text
//! 0x03 | len (1) | NDEF message (len bytes) | 0xFE | zero padding to 4 bytes
//! ```
//!
//! The TLV is written starting at page 4 of the tag.

use crate::error::LabelError;

/// TLV type of an NDEF message block.
pub const TLV_NDEF_MESSAGE: u8 = 0x03;
/// TLV terminator block.
pub const TLV_TERMINATOR: u8 = 0xFE;
/// Tag page size; writes are padded to whole pages.
pub const PAGE_SIZE: usize = 4;
/// Largest message a one-byte TLV length can describe (0xFF is reserved).
pub const MAX_MESSAGE_LEN: usize = 254;

/// Type Name Format for records whose type is not described.
pub const TNF_UNKNOWN: u8 = 0x05;

const FLAG_MB: u8 = 0x80;
const FLAG_ME: u8 = 0x40;
const FLAG_CF: u8 = 0x20;
const FLAG_SR: u8 = 0x10;
const FLAG_IL: u8 = 0x08;
const TNF_MASK: u8 = 0x07;

/// A single NDEF record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NdefRecord {
    pub tnf: u8,
    pub record_type: Vec<u8>,
    pub id: Vec<u8>,
    pub payload: Vec<u8>,
}

impl NdefRecord {
    /// Record with TNF "unknown" and no type, as seal labels use.
    pub fn unknown(id: &[u8], payload: &[u8]) -> Self {
        Self {
            tnf: TNF_UNKNOWN,
            record_type: Vec::new(),
            id: id.to_vec(),
            payload: payload.to_vec(),
        }
    }

    /// Encodes the record as a complete one-record message.
    pub fn encode_message(&self) -> Result<Vec<u8>, LabelError> {
        let type_len = u8::try_from(self.record_type.len())
            .map_err(|_| LabelError::MalformedRecord("record type longer than 255".into()))?;
        let id_len = u8::try_from(self.id.len())
            .map_err(|_| LabelError::MalformedRecord("record id longer than 255".into()))?;
        let short = self.payload.len() <= usize::from(u8::MAX);

        let mut header = FLAG_MB | FLAG_ME | (self.tnf & TNF_MASK);
        if short {
            header |= FLAG_SR;
        }
        if id_len > 0 {
            header |= FLAG_IL;
        }

        let mut out = Vec::with_capacity(
            6 + self.record_type.len() + self.id.len() + self.payload.len(),
        );
        out.push(header);
        out.push(type_len);
        if short {
            out.push(self.payload.len() as u8);
        } else {
            let len = u32::try_from(self.payload.len())
                .map_err(|_| LabelError::MalformedRecord("payload longer than 4 GiB".into()))?;
            out.extend_from_slice(&len.to_be_bytes());
        }
        if id_len > 0 {
            out.push(id_len);
        }
        out.extend_from_slice(&self.record_type);
        out.extend_from_slice(&self.id);
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    /// Decodes the first record of an NDEF message.
    pub fn decode_first(message: &[u8]) -> Result<Self, LabelError> {
        let mut pos = 0;
        let header = take(message, &mut pos, 1)?[0];
        if header & FLAG_CF != 0 {
            return Err(LabelError::MalformedRecord(
                "chunked records are not supported".into(),
            ));
        }

        let type_len = usize::from(take(message, &mut pos, 1)?[0]);
        let payload_len = if header & FLAG_SR != 0 {
            usize::from(take(message, &mut pos, 1)?[0])
        } else {
            let raw = take(message, &mut pos, 4)?;
            u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize
        };
        let id_len = if header & FLAG_IL != 0 {
            usize::from(take(message, &mut pos, 1)?[0])
        } else {
            0
        };

        let record_type = take(message, &mut pos, type_len)?.to_vec();
        let id = take(message, &mut pos, id_len)?.to_vec();
        let payload = take(message, &mut pos, payload_len)?.to_vec();

        Ok(Self {
            tnf: header & TNF_MASK,
            record_type,
            id,
            payload,
        })
    }
}

/// Wraps an NDEF message in a TLV block padded to whole pages.
pub fn wrap_tlv(message: &[u8]) -> Result<Vec<u8>, LabelError> {
    if message.len() > MAX_MESSAGE_LEN {
        return Err(LabelError::TooLong {
            len: message.len(),
            max: MAX_MESSAGE_LEN,
        });
    }

    let padded_len = (message.len() + 3).div_ceil(PAGE_SIZE) * PAGE_SIZE;
    let mut out = vec![0u8; padded_len];
    out[0] = TLV_NDEF_MESSAGE;
    out[1] = message.len() as u8;
    out[2..2 + message.len()].copy_from_slice(message);
    out[2 + message.len()] = TLV_TERMINATOR;
    Ok(out)
}

/// Extracts the NDEF message from raw tag memory starting at page 4.
///
/// Bytes after the terminator are ignored.
pub fn unwrap_tlv(raw: &[u8]) -> Result<&[u8], LabelError> {
    let mut pos = 0;
    let tlv_type = take(raw, &mut pos, 1)?[0];
    if tlv_type != TLV_NDEF_MESSAGE {
        return Err(LabelError::WrongTlvType(tlv_type));
    }

    let len = usize::from(take(raw, &mut pos, 1)?[0]);
    let message = take(raw, &mut pos, len)?;
    match raw.get(pos) {
        Some(&TLV_TERMINATOR) => Ok(message),
        _ => Err(LabelError::MissingTerminator),
    }
}

fn take<'a>(bytes: &'a [u8], pos: &mut usize, n: usize) -> Result<&'a [u8], LabelError> {
    let end = pos.checked_add(n).filter(|end| *end <= bytes.len()).ok_or(
        LabelError::Truncated {
            needed: pos.saturating_add(n),
            available: bytes.len(),
        },
    )?;
    let slice = &bytes[*pos..end];
    *pos = end;
    Ok(slice)
}
