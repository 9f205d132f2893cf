//! BLAKE3 fingerprints for routine sources and payloads.

use crate::error::PayloadError;
use crate::payload::Payload;

/// Computes the BLAKE3 hash of routine source text.
///
/// # Returns
/// * A 64-character lowercase hexadecimal string
pub fn source_hash(source: &str) -> String {
    blake3::hash(source.as_bytes()).to_hex().to_string()
}

/// Computes the BLAKE3 hash of a payload's compact JSON form.
///
/// `Int(2)` and `Float(2.0)` hash differently, since they serialize
/// differently. Used to compare outputs across repeated invocations.
///
/// # Example
/// ```
/// use featurehost_payload::{hash::payload_hash, Payload};
///
/// let a = payload_hash(&Payload::from(vec![1i64, 2])).unwrap();
/// let b = payload_hash(&Payload::from(vec![1i64, 2])).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub fn payload_hash(payload: &Payload) -> Result<String, PayloadError> {
    let canonical = payload.to_json()?;
    Ok(blake3::hash(canonical.as_bytes()).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_hash_is_stable() {
        let a = source_hash("output_data = input_data\n");
        let b = source_hash("output_data = input_data\n");
        let c = source_hash("output_data = input_data \n");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_payload_hash_distinguishes_int_and_float() {
        let ints = payload_hash(&Payload::from(vec![2i64])).unwrap();
        let floats = payload_hash(&Payload::from(vec![2.0])).unwrap();
        assert_ne!(ints, floats);
    }
}
