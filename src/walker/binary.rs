/// Leading bytes inspected for NUL
pub const SAMPLE_SIZE: usize = 8192;

/// File content after classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Text(String),
    Binary,
}

/// Binary/text classification of raw file bytes
pub struct BinaryDetector;

impl BinaryDetector {
    /// Binary if the leading sample holds a NUL byte or the bytes are not
    /// UTF-8. Text reuses the buffer.
    pub fn classify(bytes: Vec<u8>) -> Classified {
        let sample = &bytes[..bytes.len().min(SAMPLE_SIZE)];
        if sample.contains(&0) {
            return Classified::Binary;
        }

        match String::from_utf8(bytes) {
            Ok(text) => Classified::Text(text),
            Err(_) => Classified::Binary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_bytes_are_binary() {
        assert_eq!(BinaryDetector::classify(b"\x00\x01\x02\x03".to_vec()), Classified::Binary);
    }

    #[test]
    fn test_invalid_utf8_is_binary() {
        assert_eq!(BinaryDetector::classify(vec![0xff, 0xfe, 0x41]), Classified::Binary);
        assert_eq!(BinaryDetector::classify(vec![0xc3, 0x28]), Classified::Binary);
    }

    #[test]
    fn test_text_is_not_binary() {
        assert_eq!(BinaryDetector::classify(Vec::new()), Classified::Text(String::new()));
        assert_eq!(
            BinaryDetector::classify("åäö\n".as_bytes().to_vec()),
            Classified::Text("åäö\n".to_string())
        );
    }

    #[test]
    fn test_nul_after_sample_is_caught_by_decode_only() {
        let mut bytes = vec![b'a'; SAMPLE_SIZE];
        bytes.push(0);
        // NUL is valid UTF-8, so content past the sample stays text
        assert!(matches!(BinaryDetector::classify(bytes), Classified::Text(_)));
    }
}
