use super::error::BencodeError;
use super::value::Value;
use bytes::Bytes;
use std::collections::BTreeMap;

const MAX_DEPTH: usize = 32;

/// Decodes a complete bencode value.
///
/// The input must contain exactly one value; trailing bytes are an error.
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    let mut parser = Parser::new(data);
    let value = parser.value(0)?;

    if !parser.at_end() {
        return Err(BencodeError::TrailingData);
    }

    Ok(value)
}

/// Returns the original encoded byte span of `key`'s value in a top-level
/// dictionary, or `None` if the key is absent.
///
/// The returned slice is the value exactly as it appears in `data`, with the
/// source's key ordering and integer formatting intact. Hashing this span is
/// the only correct way to derive a torrent's info hash; re-encoding a
/// decoded tree canonicalizes key order and can change the digest.
pub fn raw_dict_value<'a>(data: &'a [u8], key: &[u8]) -> Result<Option<&'a [u8]>, BencodeError> {
    let mut parser = Parser::new(data);

    match parser.peek()? {
        b'd' => parser.pos += 1,
        other => return Err(BencodeError::UnexpectedByte(other)),
    }

    loop {
        if parser.peek()? == b'e' {
            return Ok(None);
        }

        let entry_key = parser.byte_string()?;
        let start = parser.pos;
        parser.value(1)?;

        if entry_key == key {
            return Ok(Some(&data[start..parser.pos]));
        }
    }
}

struct Parser<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos == self.data.len()
    }

    fn peek(&self) -> Result<u8, BencodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(BencodeError::UnexpectedEof)
    }

    fn value(&mut self, depth: usize) -> Result<Value, BencodeError> {
        if depth > MAX_DEPTH {
            return Err(BencodeError::NestingTooDeep);
        }

        match self.peek()? {
            b'i' => self.integer(),
            b'l' => self.list(depth),
            b'd' => self.dict(depth),
            b'0'..=b'9' => {
                let bytes = self.byte_string()?;
                Ok(Value::Bytes(Bytes::copy_from_slice(bytes)))
            }
            other => Err(BencodeError::UnexpectedByte(other)),
        }
    }

    fn integer(&mut self) -> Result<Value, BencodeError> {
        self.pos += 1;

        let start = self.pos;
        while self.peek()? != b'e' {
            self.pos += 1;
        }

        let digits = &self.data[start..self.pos];
        self.pos += 1;

        let body = match digits {
            [b'-', rest @ ..] => rest,
            _ => digits,
        };

        // "i-0e", "i03e" and the empty body are all invalid per BEP-3.
        if body.is_empty() || (body[0] == b'0' && digits.len() > 1) {
            return Err(BencodeError::InvalidInteger);
        }

        let text = std::str::from_utf8(digits).map_err(|_| BencodeError::InvalidInteger)?;
        let value: i64 = text.parse().map_err(|_| BencodeError::InvalidInteger)?;

        Ok(Value::Integer(value))
    }

    fn byte_string(&mut self) -> Result<&'a [u8], BencodeError> {
        let start = self.pos;
        while self.peek()? != b':' {
            if !self.data[self.pos].is_ascii_digit() {
                return Err(BencodeError::InvalidLength);
            }
            self.pos += 1;
        }

        let len_text =
            std::str::from_utf8(&self.data[start..self.pos]).map_err(|_| BencodeError::InvalidLength)?;
        let len: usize = len_text.parse().map_err(|_| BencodeError::InvalidLength)?;

        self.pos += 1;

        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(BencodeError::UnexpectedEof)?;

        let bytes = &self.data[self.pos..end];
        self.pos = end;

        Ok(bytes)
    }

    fn list(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut items = Vec::new();

        while self.peek()? != b'e' {
            items.push(self.value(depth + 1)?);
        }

        self.pos += 1;
        Ok(Value::List(items))
    }

    fn dict(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut entries = BTreeMap::new();

        while self.peek()? != b'e' {
            let key = Bytes::copy_from_slice(self.byte_string()?);
            let value = self.value(depth + 1)?;
            entries.insert(key, value);
        }

        self.pos += 1;
        Ok(Value::Dict(entries))
    }
}
