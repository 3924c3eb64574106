use std::{borrow::Borrow, fmt};

/// A string which is encrypted before being written to the database, and decrypted after
/// being read back.
///
/// This type does no cryptography at all.  It exists so that a field declared as an
/// [`EncryptedString`] can only reach storage through the
/// [`EncryptedStringConverter`](super::EncryptedStringConverter), and so that nobody can mistake
/// a plain `String` field for one that's protected.
///
/// Apart from that, it behaves like the string it holds: equality (against other
/// [`EncryptedString`]s or plain strings) is exact and case-sensitive, and hashing agrees with
/// `str`.  `Debug` output is redacted; `Display` gives the clear text.
///
/// # Example
///
/// ```rust
/// use encrypted_string::EncryptedString;
///
/// let s = EncryptedString::from("secret");
///
/// assert_eq!(s, "secret");
/// assert_eq!(s, EncryptedString::from("secret"));
/// assert_ne!(s, "Secret");
///
/// // Absence stays absence, rather than becoming an empty value
/// assert_eq!(None, EncryptedString::wrap(None::<String>));
/// assert_eq!(Some(s.clone()), EncryptedString::wrap(Some("secret")));
/// assert_eq!(Some("secret".to_string()), EncryptedString::unwrap(Some(s)));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct EncryptedString(String);

impl EncryptedString {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Wrap an optional string, keeping `None` as `None`.
	pub fn wrap<S: Into<String>>(value: Option<S>) -> Option<Self> {
		value.map(Self::new)
	}

	/// Unwrap an optional [`EncryptedString`] back to its clear text, keeping `None` as `None`.
	pub fn unwrap(value: Option<Self>) -> Option<String> {
		value.map(Self::into_string)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}
}

impl From<String> for EncryptedString {
	fn from(s: String) -> Self {
		Self(s)
	}
}

impl From<&str> for EncryptedString {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

impl From<EncryptedString> for String {
	fn from(s: EncryptedString) -> Self {
		s.0
	}
}

impl AsRef<str> for EncryptedString {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for EncryptedString {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl PartialEq<str> for EncryptedString {
	fn eq(&self, other: &str) -> bool {
		self.0 == other
	}
}

impl PartialEq<&str> for EncryptedString {
	fn eq(&self, other: &&str) -> bool {
		self.0 == *other
	}
}

impl PartialEq<String> for EncryptedString {
	fn eq(&self, other: &String) -> bool {
		&self.0 == other
	}
}

impl PartialEq<EncryptedString> for str {
	fn eq(&self, other: &EncryptedString) -> bool {
		self == other.0
	}
}

impl PartialEq<EncryptedString> for &str {
	fn eq(&self, other: &EncryptedString) -> bool {
		*self == other.0
	}
}

impl PartialEq<EncryptedString> for String {
	fn eq(&self, other: &EncryptedString) -> bool {
		*self == other.0
	}
}

impl fmt::Display for EncryptedString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

// Clear text has no business in logs
impl fmt::Debug for EncryptedString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("EncryptedString([REDACTED])")
	}
}
