use anyhow::{anyhow, Context, Result};
use molecule::{bytify, Value};
use std::str::from_utf8;

/// The payload to decode, given either as `0x` hex or as base64. Surrounding whitespace is ignored.
pub fn payload(buffer: &[u8], base64: bool) -> Result<Vec<u8>> {
    let text = from_utf8(buffer).context("input is not utf-8")?.trim();
    if base64 {
        base64::decode(text).context("input is not valid base64")
    } else {
        bytify(text).map_err(|e| anyhow!("input is not a 0x prefixed hex string: {}", e))
    }
}

/// A value to encode, given as JSON.
pub fn value(buffer: &[u8]) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_slice(buffer).context("input is not valid JSON")?;
    molecule_serde::to_value(&json).context("JSON cannot be represented as a molecule value")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_base64() {
        assert_eq!(vec![0x12, 0x34], payload(b"0x1234\n", false).unwrap());
        assert_eq!(vec![0x12, 0x34], payload(b"EjQ=", true).unwrap());
        assert!(payload(b"1234", false).is_err());
        assert!(payload(b"%%", true).is_err());
    }

    #[test]
    fn json() {
        let value = value(br#"{"lock": "0x00", "input_type": null}"#).unwrap();
        assert_eq!(Value::object([("input_type", Value::None), ("lock", Value::from("0x00"))]), value);
        assert!(super::value(b"1.5").is_err());
    }
}
