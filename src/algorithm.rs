use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::{fmt::Debug, str::FromStr};

use super::{Error, Key};

/// A symmetric block cipher family, with the mode and padding that go with it.
///
/// Only AES is supported, in CBC mode with PKCS#7 padding, which is what every
/// `AES`/`Rijndael`-named algorithm produces when left at its platform defaults.  Tokens written
/// by other implementations using those defaults can be read back unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Algorithm {
	Aes,
}

impl Algorithm {
	/// The length, in bytes, of the IV this algorithm needs.
	pub fn iv_size(&self) -> usize {
		match self {
			Algorithm::Aes => 16,
		}
	}

	/// The key lengths, in bytes, this algorithm accepts.
	pub fn key_sizes(&self) -> &'static [usize] {
		match self {
			Algorithm::Aes => &[16, 24, 32],
		}
	}

	fn check_key(&self, key: &Key) -> Result<(), Error> {
		if self.key_sizes().contains(&key.len()) {
			Ok(())
		} else {
			Err(Error::invalid_key(format!(
				"{} byte key is not valid for {self:?} (expected one of {:?})",
				key.len(),
				self.key_sizes()
			)))
		}
	}
}

impl FromStr for Algorithm {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self, Error> {
		let short = name
			.trim()
			.strip_prefix("System.Security.Cryptography.")
			.unwrap_or(name.trim());

		match short.to_ascii_lowercase().as_str() {
			"aes" | "aesmanaged" | "aescryptoserviceprovider" | "aescng" | "rijndael"
			| "rijndaelmanaged" => Ok(Algorithm::Aes),
			_ => Err(Error::unsupported_algorithm(name)),
		}
	}
}

/// The validated `{algorithm, key}` pair that an [`AlgorithmProvider`](super::AlgorithmProvider)
/// hands out ciphers for.
///
/// Both parts are checked once, here, so that nothing downstream has to cope with a half-configured
/// provider.  Once built, a configuration cannot be changed.
///
/// # Example
///
/// ```rust
/// use encrypted_string::{AlgorithmConfig, Error};
/// # fn main() -> Result<(), Error> {
///
/// let config = AlgorithmConfig::new("AES", encrypted_string::generate_key())?;
///
/// // A missing part is reported by name
/// let result = AlgorithmConfig::builder().algorithm("AES").build();
/// assert!(matches!(result, Err(Error::ConfigurationMissing("key"))));
///
/// // So is a key the algorithm can't use
/// let result = AlgorithmConfig::new("AES", vec![0u8; 7]);
/// assert!(matches!(result, Err(Error::InvalidKey(_))));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct AlgorithmConfig {
	name: String,
	algorithm: Algorithm,
	key: Key,
}

impl AlgorithmConfig {
	/// Validate and freeze an algorithm name and key.
	///
	/// # Errors
	///
	/// * [`Error::ConfigurationMissing`] if the name or key is empty.
	/// * [`Error::UnsupportedAlgorithm`] if the name isn't one we know.
	/// * [`Error::InvalidKey`] if the key is the wrong length for the algorithm.
	#[tracing::instrument(level = "debug", skip(key))]
	pub fn new(name: impl AsRef<str> + Debug, key: impl Into<Key>) -> Result<Self, Error> {
		let name = name.as_ref();
		let key = key.into();

		if name.trim().is_empty() {
			return Err(Error::configuration_missing("algorithm name"));
		}

		if key.is_empty() {
			return Err(Error::configuration_missing("key"));
		}

		let algorithm: Algorithm = name.parse()?;
		algorithm.check_key(&key)?;
		tracing::debug!(?algorithm, key_len = key.len(), "Algorithm configured");

		Ok(Self {
			name: name.to_string(),
			algorithm,
			key,
		})
	}

	/// As [`AlgorithmConfig::new`], but with the key given as standard (padded) base64 text.
	///
	/// # Errors
	///
	/// As for [`AlgorithmConfig::new`], plus [`Error::InvalidKey`] if the key isn't valid base64.
	#[tracing::instrument(level = "debug", skip(key))]
	pub fn from_base64_key(
		name: impl AsRef<str> + Debug,
		key: impl AsRef<[u8]>,
	) -> Result<Self, Error> {
		let key = STANDARD
			.decode(key.as_ref())
			.map_err(|e| Error::invalid_key(format!("key is not valid base64: {e}")))?;

		Self::new(name, key)
	}

	pub fn builder() -> AlgorithmConfigBuilder {
		AlgorithmConfigBuilder::default()
	}

	/// The algorithm name as it was configured.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn algorithm(&self) -> Algorithm {
		self.algorithm
	}

	pub fn key(&self) -> &Key {
		&self.key
	}
}

/// Piecemeal construction of an [`AlgorithmConfig`], for when the name and key come from
/// different places.
#[derive(Debug, Default)]
pub struct AlgorithmConfigBuilder {
	name: Option<String>,
	key: Option<Key>,
}

impl AlgorithmConfigBuilder {
	pub fn algorithm(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// # Errors
	///
	/// [`Error::ConfigurationMissing`] if either part was never supplied, otherwise as for
	/// [`AlgorithmConfig::new`].
	pub fn build(self) -> Result<AlgorithmConfig, Error> {
		let name = self
			.name
			.ok_or_else(|| Error::configuration_missing("algorithm name"))?;
		let key = self.key.ok_or_else(|| Error::configuration_missing("key"))?;

		AlgorithmConfig::new(name, key)
	}
}
