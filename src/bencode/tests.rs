use super::*;
use bytes::Bytes;
use std::collections::BTreeMap;

#[test]
fn test_decode_integer() {
    assert_eq!(decode(b"i42e").unwrap().as_integer(), Some(42));
    assert_eq!(decode(b"i-7e").unwrap().as_integer(), Some(-7));
    assert_eq!(decode(b"i0e").unwrap().as_integer(), Some(0));
}

#[test]
fn test_decode_rejects_bad_integers() {
    assert_eq!(decode(b"ie"), Err(BencodeError::InvalidInteger));
    assert_eq!(decode(b"i03e"), Err(BencodeError::InvalidInteger));
    assert_eq!(decode(b"i-0e"), Err(BencodeError::InvalidInteger));
}

#[test]
fn test_decode_byte_string() {
    let value = decode(b"4:spam").unwrap();
    assert_eq!(value.as_str(), Some("spam"));

    let value = decode(b"0:").unwrap();
    assert_eq!(value.as_bytes().map(|b| b.len()), Some(0));
}

#[test]
fn test_decode_truncated_string() {
    assert_eq!(decode(b"10:short"), Err(BencodeError::UnexpectedEof));
    assert_eq!(decode(b"4spam"), Err(BencodeError::InvalidLength));
}

#[test]
fn test_decode_list() {
    let value = decode(b"l4:spami42ee").unwrap();
    let list = value.as_list().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].as_str(), Some("spam"));
    assert_eq!(list[1].as_integer(), Some(42));
}

#[test]
fn test_decode_dict() {
    let value = decode(b"d3:bar4:spam3:fooi42ee").unwrap();
    assert_eq!(value.get(b"bar").and_then(|v| v.as_str()), Some("spam"));
    assert_eq!(value.get(b"foo").and_then(|v| v.as_integer()), Some(42));
    assert_eq!(value.get(b"baz"), None);
}

#[test]
fn test_decode_rejects_trailing_data() {
    assert_eq!(decode(b"i42etrailing"), Err(BencodeError::TrailingData));
}

#[test]
fn test_decode_rejects_deep_nesting() {
    let mut data = Vec::new();
    data.extend(std::iter::repeat(b'l').take(100));
    data.extend(std::iter::repeat(b'e').take(100));
    assert_eq!(decode(&data), Err(BencodeError::NestingTooDeep));
}

#[test]
fn test_encode_round_trip() {
    let mut dict = BTreeMap::new();
    dict.insert(Bytes::from_static(b"name"), Value::string("example"));
    dict.insert(Bytes::from_static(b"size"), Value::Integer(1024));
    let value = Value::Dict(dict);

    let encoded = encode(&value);
    assert_eq!(encoded, b"d4:name7:example4:sizei1024ee");
    assert_eq!(decode(&encoded).unwrap(), value);
}

#[test]
fn test_raw_dict_value_returns_original_span() {
    // Keys deliberately out of canonical order inside the nested dict.
    let data = b"d4:infod1:bi2e1:ai1ee5:otheri9ee";
    let span = raw_dict_value(data, b"info").unwrap().unwrap();
    assert_eq!(span, b"d1:bi2e1:ai1ee");

    // A re-encode of the decoded tree sorts the keys and differs.
    let reencoded = encode(&decode(span).unwrap());
    assert_eq!(reencoded, b"d1:ai1e1:bi2ee");
    assert_ne!(span, reencoded.as_slice());
}

#[test]
fn test_raw_dict_value_missing_key() {
    let data = b"d3:fooi1ee";
    assert_eq!(raw_dict_value(data, b"info").unwrap(), None);
}

#[test]
fn test_raw_dict_value_requires_dict() {
    assert!(raw_dict_value(b"i42e", b"info").is_err());
    assert!(raw_dict_value(b"le", b"info").is_err());
}
