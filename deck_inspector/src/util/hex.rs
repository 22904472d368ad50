use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
    #[error("hex string has odd length {0}")]
    OddLength(usize),
    #[error("invalid hex digit `{ch}` at offset {offset}")]
    InvalidDigit { ch: char, offset: usize },
}

pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(digit(b >> 4));
        out.push(digit(b & 0x0f));
    }
    out
}

pub fn from_hex(s: &str) -> Result<Vec<u8>, HexError> {
    if s.len() % 2 != 0 {
        return Err(HexError::OddLength(s.len()));
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    let mut nibbles = s.char_indices().map(|(offset, ch)| {
        ch.to_digit(16)
            .map(|d| d as u8)
            .ok_or(HexError::InvalidDigit { ch, offset })
    });
    while let (Some(hi), Some(lo)) = (nibbles.next(), nibbles.next()) {
        out.push((hi? << 4) | lo?);
    }
    Ok(out)
}

fn digit(n: u8) -> char {
    char::from_digit(n as u32, 16).unwrap_or('0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_lowercase() {
        assert_eq!(to_hex(&[0x00, 0xff, 0x2a]), "00ff2a");
        assert_eq!(from_hex("00ff2a").unwrap(), vec![0x00, 0xff, 0x2a]);
        // Uppercase input is accepted.
        assert_eq!(from_hex("00FF2A").unwrap(), vec![0x00, 0xff, 0x2a]);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(from_hex("abc"), Err(HexError::OddLength(3)));
        assert_eq!(
            from_hex("zz"),
            Err(HexError::InvalidDigit { ch: 'z', offset: 0 })
        );
    }

    #[test]
    fn empty_is_empty() {
        assert_eq!(to_hex(&[]), "");
        assert_eq!(from_hex("").unwrap(), Vec::<u8>::new());
    }
}
