#[cfg(test)]
mod tests {
    use crate::amf0::Value;

    macro_rules! encode {
        ($value:expr) => {{
            let mut buf = Vec::new();
            let res = $value.write_to(&mut buf);
            assert!(res.is_ok());
            buf
        }};
    }

    #[test]
    fn number() {
        assert_eq!(
            encode!(Value::Number(3.5)),
            [0x00, 0x40, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            encode!(Value::Number(0.0)),
            [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn boolean() {
        assert_eq!(encode!(Value::Boolean(false)), [0x01, 0x00]);
        assert_eq!(encode!(Value::Boolean(true)), [0x01, 0x01]);
    }

    #[test]
    fn string() {
        assert_eq!(
            encode!(Value::String("connect".to_string())),
            [0x02, 0x00, 0x07, b'c', b'o', b'n', b'n', b'e', b'c', b't']
        );
    }

    #[test]
    fn null() {
        assert_eq!(encode!(Value::Null), [0x05]);
    }

    #[test]
    fn object() {
        let value = Value::Object(vec![
            ("key1".to_string(), Value::String("value1".to_string())),
            ("key2".to_string(), Value::Number(2.0)),
            ("key3".to_string(), Value::Boolean(true)),
        ]);
        let encoded = encode!(value);
        let expected: Vec<u8> = vec![
            0x03, // object marker
            0x00, 0x04, b'k', b'e', b'y', b'1', //
            0x02, 0x00, 0x06, b'v', b'a', b'l', b'u', b'e', b'1', //
            0x00, 0x04, b'k', b'e', b'y', b'2', //
            0x00, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
            0x00, 0x04, b'k', b'e', b'y', b'3', //
            0x01, 0x01, //
            0x00, 0x00, 0x09, // object end
        ];
        assert_eq!(encoded, expected);
        assert!(encoded.starts_with(&[
            0x03, 0x00, 0x04, 0x6B, 0x65, 0x79, 0x31, 0x02, 0x00, 0x06, 0x76, 0x61, 0x6C, 0x75,
            0x65, 0x31
        ]));
        assert!(encoded.ends_with(&[0x00, 0x00, 0x09]));
    }

    #[test]
    fn ecma_array() {
        let value = Value::EcmaArray(vec![("duration".to_string(), Value::Number(0.0))]);
        let encoded = encode!(value);
        assert_eq!(encoded[0], 0x08);
        assert_eq!(&encoded[1..5], &[0x00, 0x00, 0x00, 0x01]);
        assert!(encoded.ends_with(&[0x00, 0x00, 0x09]));
    }

    #[test]
    fn string_too_long() {
        let oversized = "x".repeat(0x1_0000);
        let mut buf = Vec::new();
        let res = Value::String(oversized).write_to(&mut buf);
        assert!(res.is_err());
    }
}
