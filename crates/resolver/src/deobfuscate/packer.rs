//! Reverses Dean Edwards' `p,a,c,k,e,d` JavaScript packer.
//!
//! A packed script looks like
//! `eval(function(p,a,c,k,e,d){...}('payload',radix,count,'w0|w1|...'.split('|'),0,{}))`.
//! Every word token of the payload is a base-`radix` index into the
//! dictionary; unpacking substitutes them back without running any script.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::resolver::error::ResolutionError;

static PACKED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"eval\(\s*function\s*\(\s*p\s*,\s*a\s*,\s*c\s*,\s*k\s*,\s*e\s*,\s*[dr]\s*\)").unwrap());
static ARGUMENTS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\}\s*\(\s*['"]"#).unwrap());
// maximal ASCII word runs, the JS `\b\w+\b`; `\w` here would also take
// non-ASCII letters and glue them onto a token
static WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9A-Za-z_]+").unwrap());

const BASE62_DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Returns the packed script embedded in `body`, starting at its `eval(`.
pub fn find_packed(body: &str) -> Option<&str> {
    PACKED_REGEX.find(body).map(|m| &body[m.start()..])
}

/// Locates and unpacks the first packed script of a page.
pub fn unpack_page(body: &str) -> Result<String, ResolutionError> {
    let script = find_packed(body).ok_or(ResolutionError::PatternNotFound {
        stage: "packed script",
    })?;
    unpack(script)
}

/// Unpacks a single packed script into plain source text.
pub fn unpack(script: &str) -> Result<String, ResolutionError> {
    let args = PackedArguments::parse(script)?;
    let words: Vec<&str> = args.dictionary.split(args.delimiter.as_str()).collect();

    let unpacked = WORD_REGEX.replace_all(&args.payload, |caps: &Captures| {
        let token = &caps[0];
        unbase(token, args.radix)
            .filter(|index| *index < args.count)
            .and_then(|index| words.get(index))
            .filter(|word| !word.is_empty())
            .map(|word| word.to_string())
            .unwrap_or_else(|| token.to_string())
    });

    Ok(unpacked.into_owned())
}

#[derive(Debug)]
struct PackedArguments {
    payload: String,
    radix: u32,
    count: usize,
    dictionary: String,
    delimiter: String,
}

impl PackedArguments {
    fn parse(script: &str) -> Result<Self, ResolutionError> {
        let start = ARGUMENTS_REGEX
            .find(script)
            .ok_or_else(|| malformed("missing argument list"))?;
        // position the cursor on the opening quote of the payload
        let mut cursor = Cursor::new(&script[start.end() - 1..]);

        let payload = cursor.string_literal()?;
        cursor.expect(',')?;
        let radix = cursor.integer()? as u32;
        cursor.expect(',')?;
        let count = cursor.integer()? as usize;
        cursor.expect(',')?;
        let dictionary = cursor.string_literal()?;

        let delimiter = if cursor.consume(".split(") {
            let delimiter = cursor.string_literal()?;
            cursor.expect(')')?;
            delimiter
        } else {
            "|".to_string()
        };

        if delimiter.is_empty() {
            return Err(malformed("empty dictionary delimiter"));
        }

        Ok(Self {
            payload,
            radix,
            count,
            dictionary,
            delimiter,
        })
    }
}

fn malformed(reason: &str) -> ResolutionError {
    ResolutionError::Decode(format!("malformed packed script: {reason}"))
}

/// Decodes a packer token. Radixes up to 36 follow `parseInt` and are case
/// insensitive; larger ones use the packer's own `0-9a-zA-Z` digits.
fn unbase(token: &str, radix: u32) -> Option<usize> {
    match radix {
        2..=36 => usize::from_str_radix(token, radix).ok(),
        37..=62 => token.bytes().try_fold(0usize, |acc, byte| {
            let digit = BASE62_DIGITS.iter().position(|d| *d == byte)?;
            if digit as u32 >= radix {
                return None;
            }
            acc.checked_mul(radix as usize)?.checked_add(digit)
        }),
        _ => None,
    }
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn consume(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        match self.rest.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn expect(&mut self, c: char) -> Result<(), ResolutionError> {
        self.skip_whitespace();
        match self.rest.strip_prefix(c) {
            Some(rest) => {
                self.rest = rest;
                Ok(())
            }
            None => Err(malformed(&format!("expected '{c}'"))),
        }
    }

    fn integer(&mut self) -> Result<u64, ResolutionError> {
        self.skip_whitespace();
        let end = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        let (digits, rest) = self.rest.split_at(end);
        let value = digits
            .parse::<u64>()
            .map_err(|_| malformed("expected an integer argument"))?;
        self.rest = rest;
        Ok(value)
    }

    /// Reads a single or double quoted JavaScript string literal.
    fn string_literal(&mut self) -> Result<String, ResolutionError> {
        self.skip_whitespace();
        let mut chars = self.rest.char_indices();
        let quote = match chars.next() {
            Some((_, q @ ('\'' | '"'))) => q,
            _ => return Err(malformed("expected a string literal")),
        };

        let mut value = String::new();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                c if c == quote => {
                    self.rest = &self.rest[i + c.len_utf8()..];
                    return Ok(value);
                }
                c => value.push(c),
            }
        }

        Err(malformed("unterminated string literal"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_WORLD: &str = r"eval(function(p,a,c,k,e,d){e=function(c){return c};if(!''.replace(/^/,String)){while(c--){d[c]=k[c]||c}k=[function(e){return d[e]}];e=function(){return'\\w+'};c=1};while(c--){if(k[c]){p=p.replace(new RegExp('\\b'+e(c)+'\\b','g'),k[c])}}return p}('0 1',2,2,'hello|world'.split('|'),0,{}))";

    #[test]
    fn test_unpack_reference_fixture() {
        assert_eq!(unpack(HELLO_WORLD).unwrap(), "hello world");
    }

    #[test]
    fn test_unpack_player_setup() {
        let script = r#"<script>eval(function(p,a,c,k,e,d){while(c--){if(k[c]){p=p.replace(new RegExp('\\b'+c.toString(a)+'\\b','g'),k[c])}}return p}('0 1=\'2://3.4/5.6\';',7,7,'var|src|https|cdn|example|video|m3u8'.split('|'),0,{}))</script>"#;
        let script = find_packed(script).unwrap();
        assert_eq!(
            unpack(script).unwrap(),
            "var src='https://cdn.example/video.m3u8';"
        );
    }

    #[test]
    fn test_unpack_token_next_to_non_ascii() {
        let script = "eval(function(p,a,c,k,e,d){}('é0 1 ü1ö',2,2,'hello|world'.split('|'),0,{}))";
        assert_eq!(unpack(script).unwrap(), "éhello world üworldö");
    }

    #[test]
    fn test_unpack_base62_tokens() {
        let words = (0..38).map(|i| format!("w{i}")).collect::<Vec<_>>().join("|");
        let script = format!(
            "eval(function(p,a,c,k,e,d){{return p}}('a A 10 b_c',62,38,'{words}'.split('|'),0,{{}}))"
        );
        // 'a' = 10, 'A' = 36, '10' = 62 is past the dictionary
        assert_eq!(unpack(&script).unwrap(), "w10 w36 10 b_c");
    }

    #[test]
    fn test_unpack_low_radix_is_case_insensitive() {
        let words = (0..11).map(|i| format!("w{i}")).collect::<Vec<_>>().join("|");
        let script =
            format!("eval(function(p,a,c,k,e,d){{}}(\"0 A\",36,11,\"{words}\".split(\"|\"),0,{{}}))");
        assert_eq!(unpack(&script).unwrap(), "w0 w10");
    }

    #[test]
    fn test_unpack_keeps_tokens_with_empty_entries() {
        let script = "eval(function(p,a,c,k,e,d){}('0 1 2',3,3,'||x'.split('|'),0,{}))";
        assert_eq!(unpack(script).unwrap(), "0 1 x");
    }

    #[test]
    fn test_unpack_custom_delimiter() {
        let script = "eval(function(p,a,c,k,e,r){}('1.0()',2,2,'play;player'.split(';'),0,{}))";
        assert_eq!(unpack(script).unwrap(), "player.play()");
    }

    #[test]
    fn test_unpack_rejects_truncated_script() {
        let script = "eval(function(p,a,c,k,e,d){}('0 1',2,";
        assert!(matches!(unpack(script), Err(ResolutionError::Decode(_))));
        assert!(matches!(
            unpack_page("<html>nothing packed here</html>"),
            Err(ResolutionError::PatternNotFound { .. })
        ));
    }
}
