use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fmt;

use super::Error;

const SEPARATOR: char = '@';

/// The stored form of an encrypted value: `base64(cipher text)@base64(IV)`.
///
/// Both halves use standard, padded base64, which never contains `@`, so the first `@` is
/// always the separator.  Because the IV travels with the cipher text, every token can be
/// decrypted on its own.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Token {
	pub(crate) ciphertext: Vec<u8>,
	pub(crate) iv: Vec<u8>,
}

impl Token {
	pub(crate) fn new(ciphertext: Vec<u8>, iv: Vec<u8>) -> Self {
		Self { ciphertext, iv }
	}

	#[tracing::instrument(level = "trace", skip(s))]
	pub(crate) fn parse(s: &str) -> Result<Self, Error> {
		let Some((ct, iv)) = s.split_once(SEPARATOR) else {
			tracing::debug!(len = s.len(), "Token has no separator");
			return Err(Error::MalformedToken);
		};

		let ciphertext = STANDARD
			.decode(ct)
			.map_err(|e| Error::invalid_encoding(e, "cipher text"))?;
		let iv = STANDARD
			.decode(iv)
			.map_err(|e| Error::invalid_encoding(e, "IV"))?;

		Ok(Self { ciphertext, iv })
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}{SEPARATOR}{}",
			STANDARD.encode(&self.ciphertext),
			STANDARD.encode(&self.iv)
		)
	}
}

impl fmt::Debug for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Token")
			.field("ciphertext_len", &self.ciphertext.len())
			.field("iv_len", &self.iv.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn format() {
		let token = Token::new(b"\x00\x01\x02\xff".to_vec(), vec![0u8; 16]);

		assert_eq!("AAEC/w==@AAAAAAAAAAAAAAAAAAAAAA==", token.to_string());
	}

	#[test]
	fn parse() {
		let token = Token::parse("AAEC/w==@AAAAAAAAAAAAAAAAAAAAAA==").unwrap();

		assert_eq!(b"\x00\x01\x02\xff".to_vec(), token.ciphertext);
		assert_eq!(vec![0u8; 16], token.iv);
	}

	#[test]
	fn missing_separator() {
		assert!(matches!(
			Token::parse("AAEC/w==AAAAAAAAAAAAAAAAAAAAAA=="),
			Err(Error::MalformedToken)
		));
		assert!(matches!(Token::parse(""), Err(Error::MalformedToken)));
	}

	#[test]
	fn bad_segments() {
		assert!(matches!(
			Token::parse("not-base64!!!@alsoNotBase64$$$"),
			Err(Error::InvalidEncoding {
				segment: "cipher text",
				..
			})
		));
		assert!(matches!(
			Token::parse("AAEC/w==@alsoNotBase64$$$"),
			Err(Error::InvalidEncoding { segment: "IV", .. })
		));
		// A second separator can only end up in the IV segment
		assert!(matches!(
			Token::parse("AAEC/w==@AAAA@AAAA"),
			Err(Error::InvalidEncoding { segment: "IV", .. })
		));
	}
}
