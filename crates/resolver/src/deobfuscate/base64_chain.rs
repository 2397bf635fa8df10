use base64::{Engine, prelude::BASE64_STANDARD};

const MAX_ROUNDS: usize = 16;

/// Peels nested base64 layers off `input`.
///
/// Decoding stops as soon as the current value is not valid standard base64
/// or its decoded bytes are not UTF-8; the last readable layer is returned.
pub fn peel(input: &str) -> String {
    let mut current = input.trim().to_string();

    for _ in 0..MAX_ROUNDS {
        let Some(next) = decode_layer(&current) else {
            break;
        };
        current = next;
    }

    current
}

fn decode_layer(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    let bytes = BASE64_STANDARD.decode(value).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(s: &str) -> String {
        BASE64_STANDARD.encode(s)
    }

    #[test]
    fn test_peel_nested_json() {
        let json = r#"{"data":[{"file":"https://cdn.example/v.m3u8","type":"hls"}]}"#;
        let wrapped = encode(&encode(&encode(json)));
        assert_eq!(peel(&wrapped), json);
    }

    #[test]
    fn test_peel_leaves_plain_text() {
        assert_eq!(peel("https://cdn.example/v.mp4"), "https://cdn.example/v.mp4");
        assert_eq!(peel(""), "");
    }
}
