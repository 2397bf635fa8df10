//! Base64-like decoding over a reordered alphabet, where the first byte of
//! every decoded group is additionally XORed with a small key.

/// Symbol table; the symbol at index 64 marks padding.
pub const REORDERED_ALPHABET: &str =
    "=/+9876543210zyxwvutsrqponmlkjihgfedcbaZYXWVUTSRQPONMLKJIHGFEDCBA";

const PADDING: u32 = 64;

fn symbol_index(c: char) -> Option<u32> {
    REORDERED_ALPHABET.find(c).map(|i| i as u32)
}

/// Decodes `input` four symbols at a time into up to three characters.
///
/// Characters outside `[A-Za-z0-9+/=]` are dropped before decoding, and a
/// group cut short at the end of the input reads its missing symbols as 0.
pub fn decode_reordered(input: &str, key: u32) -> String {
    let symbols: Vec<u32> = input.chars().filter_map(symbol_index).collect();

    let mut output = String::with_capacity(symbols.len() / 4 * 3);
    for group in symbols.chunks(4) {
        let symbol = |i: usize| group.get(i).copied().unwrap_or(0);
        let (s0, s1, s2, s3) = (symbol(0), symbol(1), symbol(2), symbol(3));

        let first = ((s0 << 2) | (s1 >> 4)) ^ key;
        let second = ((s1 & 15) << 4) | (s2 >> 2);
        let third = ((s2 & 3) << 6) | s3;

        output.push(to_char(first));
        if s2 != PADDING {
            output.push(to_char(second));
        }
        if s3 != PADDING {
            output.push(to_char(third));
        }
    }

    output
}

fn to_char(code: u32) -> char {
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}
