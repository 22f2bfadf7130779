//! Textual (card image) header: 3200 bytes of either ASCII or EBCDIC text.
//!
//! Which of the two it is also decides the byte order used for every numeric
//! header field in the file. See [`TextEncoding::implied_byte_order`].

use serde::Serialize;

use crate::BlockSource;
use crate::addressing::TEXT_HEADER_LEN;
use crate::error::{Result, SegyError};
use crate::types::ByteOrder;

const CARD_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TextEncoding {
    /// Every byte is 7-bit clean.
    Ascii,
    /// IBM code page 500.
    Ebcdic,
}

impl TextEncoding {
    #[must_use]
    pub fn detect(raw: &[u8]) -> Self {
        if raw.is_ascii() {
            Self::Ascii
        } else {
            Self::Ebcdic
        }
    }

    /// Byte order assumed for numeric fields of a file whose text header uses
    /// this encoding.
    ///
    /// This is a heuristic, not something the format declares: EBCDIC text is
    /// taken to mean a big-endian file, ASCII text a host-order one.
    #[must_use]
    pub const fn implied_byte_order(&self) -> ByteOrder {
        match self {
            Self::Ascii => ByteOrder::Native,
            Self::Ebcdic => ByteOrder::Big,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ascii => "ASCII",
            Self::Ebcdic => "EBCDIC (IBM500)",
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextHeader {
    #[serde(skip)]
    raw: Vec<u8>,
    text: String,
    encoding: TextEncoding,
}

impl TextHeader {
    /// Decodes the first 3200 bytes of `raw`.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        let raw = raw
            .get(..TEXT_HEADER_LEN as usize)
            .ok_or(SegyError::OutOfRange {
                offset: 0,
                len: TEXT_HEADER_LEN,
                max: raw.len() as u64,
            })?;

        let encoding = TextEncoding::detect(raw);
        let text = match encoding {
            TextEncoding::Ascii => raw.iter().map(|&b| b as char).collect(),
            TextEncoding::Ebcdic => raw.iter().map(|&b| IBM500[b as usize]).collect(),
        };

        Ok(Self {
            raw: raw.to_vec(),
            text,
            encoding,
        })
    }

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    #[inline]
    #[must_use]
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    #[inline]
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.encoding.implied_byte_order()
    }

    /// The header as its 40 card images of 80 columns, trailing blanks removed.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let chars: Vec<char> = self.text.chars().collect();
        chars
            .chunks(CARD_WIDTH)
            .map(|card| card.iter().collect::<String>().trim_end().to_string())
            .collect()
    }
}

/// Reads and decodes the textual header at the start of `source`.
pub fn read_text_header<S: BlockSource + ?Sized>(source: &S) -> Result<TextHeader> {
    let mut raw = vec![0u8; TEXT_HEADER_LEN as usize];
    source.read_exact_at(0, &mut raw)?;
    TextHeader::decode(&raw)
}

/// IBM code page 500 (EBCDIC International) to Unicode.
static IBM500: [char; 256] = [
    '\u{0000}', '\u{0001}', '\u{0002}', '\u{0003}', '\u{009C}', '\u{0009}', '\u{0086}', '\u{007F}',
    '\u{0097}', '\u{008D}', '\u{008E}', '\u{000B}', '\u{000C}', '\u{000D}', '\u{000E}', '\u{000F}',
    '\u{0010}', '\u{0011}', '\u{0012}', '\u{0013}', '\u{009D}', '\u{0085}', '\u{0008}', '\u{0087}',
    '\u{0018}', '\u{0019}', '\u{0092}', '\u{008F}', '\u{001C}', '\u{001D}', '\u{001E}', '\u{001F}',
    '\u{0080}', '\u{0081}', '\u{0082}', '\u{0083}', '\u{0084}', '\u{000A}', '\u{0017}', '\u{001B}',
    '\u{0088}', '\u{0089}', '\u{008A}', '\u{008B}', '\u{008C}', '\u{0005}', '\u{0006}', '\u{0007}',
    '\u{0090}', '\u{0091}', '\u{0016}', '\u{0093}', '\u{0094}', '\u{0095}', '\u{0096}', '\u{0004}',
    '\u{0098}', '\u{0099}', '\u{009A}', '\u{009B}', '\u{0014}', '\u{0015}', '\u{009E}', '\u{001A}',
    '\u{0020}', '\u{00A0}', '\u{00E2}', '\u{00E4}', '\u{00E0}', '\u{00E1}', '\u{00E3}', '\u{00E5}',
    '\u{00E7}', '\u{00F1}', '\u{005B}', '\u{002E}', '\u{003C}', '\u{0028}', '\u{002B}', '\u{0021}',
    '\u{0026}', '\u{00E9}', '\u{00EA}', '\u{00EB}', '\u{00E8}', '\u{00ED}', '\u{00EE}', '\u{00EF}',
    '\u{00EC}', '\u{00DF}', '\u{005D}', '\u{0024}', '\u{002A}', '\u{0029}', '\u{003B}', '\u{005E}',
    '\u{002D}', '\u{002F}', '\u{00C2}', '\u{00C4}', '\u{00C0}', '\u{00C1}', '\u{00C3}', '\u{00C5}',
    '\u{00C7}', '\u{00D1}', '\u{00A6}', '\u{002C}', '\u{0025}', '\u{005F}', '\u{003E}', '\u{003F}',
    '\u{00F8}', '\u{00C9}', '\u{00CA}', '\u{00CB}', '\u{00C8}', '\u{00CD}', '\u{00CE}', '\u{00CF}',
    '\u{00CC}', '\u{0060}', '\u{003A}', '\u{0023}', '\u{0040}', '\u{0027}', '\u{003D}', '\u{0022}',
    '\u{00D8}', '\u{0061}', '\u{0062}', '\u{0063}', '\u{0064}', '\u{0065}', '\u{0066}', '\u{0067}',
    '\u{0068}', '\u{0069}', '\u{00AB}', '\u{00BB}', '\u{00F0}', '\u{00FD}', '\u{00FE}', '\u{00B1}',
    '\u{00B0}', '\u{006A}', '\u{006B}', '\u{006C}', '\u{006D}', '\u{006E}', '\u{006F}', '\u{0070}',
    '\u{0071}', '\u{0072}', '\u{00AA}', '\u{00BA}', '\u{00E6}', '\u{00B8}', '\u{00C6}', '\u{00A4}',
    '\u{00B5}', '\u{007E}', '\u{0073}', '\u{0074}', '\u{0075}', '\u{0076}', '\u{0077}', '\u{0078}',
    '\u{0079}', '\u{007A}', '\u{00A1}', '\u{00BF}', '\u{00D0}', '\u{00DD}', '\u{00DE}', '\u{00AE}',
    '\u{00A2}', '\u{00A3}', '\u{00A5}', '\u{00B7}', '\u{00A9}', '\u{00A7}', '\u{00B6}', '\u{00BC}',
    '\u{00BD}', '\u{00BE}', '\u{00AC}', '\u{007C}', '\u{00AF}', '\u{00A8}', '\u{00B4}', '\u{00D7}',
    '\u{007B}', '\u{0041}', '\u{0042}', '\u{0043}', '\u{0044}', '\u{0045}', '\u{0046}', '\u{0047}',
    '\u{0048}', '\u{0049}', '\u{00AD}', '\u{00F4}', '\u{00F6}', '\u{00F2}', '\u{00F3}', '\u{00F5}',
    '\u{007D}', '\u{004A}', '\u{004B}', '\u{004C}', '\u{004D}', '\u{004E}', '\u{004F}', '\u{0050}',
    '\u{0051}', '\u{0052}', '\u{00B9}', '\u{00FB}', '\u{00FC}', '\u{00F9}', '\u{00FA}', '\u{00FF}',
    '\u{005C}', '\u{00F7}', '\u{0053}', '\u{0054}', '\u{0055}', '\u{0056}', '\u{0057}', '\u{0058}',
    '\u{0059}', '\u{005A}', '\u{00B2}', '\u{00D4}', '\u{00D6}', '\u{00D2}', '\u{00D3}', '\u{00D5}',
    '\u{0030}', '\u{0031}', '\u{0032}', '\u{0033}', '\u{0034}', '\u{0035}', '\u{0036}', '\u{0037}',
    '\u{0038}', '\u{0039}', '\u{00B3}', '\u{00DB}', '\u{00DC}', '\u{00D9}', '\u{00DA}', '\u{009F}',
];

#[cfg(test)]
mod tests {
    use super::*;

    fn ascii_header(first_card: &str) -> Vec<u8> {
        let mut raw = vec![b' '; TEXT_HEADER_LEN as usize];
        raw[..first_card.len()].copy_from_slice(first_card.as_bytes());
        raw
    }

    #[test]
    fn ascii_header_means_native_order() {
        let header = TextHeader::decode(&ascii_header("C 1 CLIENT ACME")).unwrap();
        assert_eq!(header.encoding(), TextEncoding::Ascii);
        assert_eq!(header.byte_order(), ByteOrder::Native);
        assert!(header.text().starts_with("C 1 CLIENT ACME"));
    }

    #[test]
    fn non_ascii_byte_means_big_endian() {
        let mut raw = ascii_header("C 1");
        raw[100] = 0x80;
        let header = TextHeader::decode(&raw).unwrap();
        assert_eq!(header.encoding(), TextEncoding::Ebcdic);
        assert_eq!(header.byte_order(), ByteOrder::Big);
    }

    #[test]
    fn ebcdic_text_is_translated() {
        // "C 1" in EBCDIC, padded with EBCDIC blanks
        let mut raw = vec![0x40u8; TEXT_HEADER_LEN as usize];
        raw[..3].copy_from_slice(&[0xC3, 0x40, 0xF1]);
        let header = TextHeader::decode(&raw).unwrap();
        assert_eq!(header.encoding(), TextEncoding::Ebcdic);
        assert!(header.text().starts_with("C 1 "));
        assert_eq!(header.lines()[0], "C 1");
    }

    #[test]
    fn ebcdic_table_spot_checks() {
        assert_eq!(IBM500[0x40], ' ');
        assert_eq!(IBM500[0x4B], '.');
        assert_eq!(IBM500[0x4A], '[');
        assert_eq!(IBM500[0x81], 'a');
        assert_eq!(IBM500[0xC1], 'A');
        assert_eq!(IBM500[0xE9], 'Z');
        assert_eq!(IBM500[0xF0], '0');
        assert_eq!(IBM500[0xF9], '9');
    }

    #[test]
    fn forty_cards_of_eighty_columns() {
        let header = TextHeader::decode(&ascii_header("C 1 FIRST CARD")).unwrap();
        let lines = header.lines();
        assert_eq!(lines.len(), 40);
        assert_eq!(lines[0], "C 1 FIRST CARD");
        assert_eq!(lines[1], "");
    }

    #[test]
    fn short_buffer_is_out_of_range() {
        assert!(TextHeader::decode(&[b' '; 100]).unwrap_err().is_out_of_range());
    }

    #[test]
    fn read_from_source() {
        let mut data = ascii_header("C 1 FROM SOURCE");
        data.extend_from_slice(&[0u8; 400]);
        let header = read_text_header(&data).unwrap();
        assert_eq!(header.lines()[0], "C 1 FROM SOURCE");
    }
}
