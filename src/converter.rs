use secrecy::zeroize::Zeroize as _;
use std::{
	any::{Any, TypeId, type_name},
	sync::Arc,
};

use super::{
	AlgorithmProvider, DataRecord, DbType, DbValue, EncryptedString, Error, TypeConverter,
	TypeRegistry, token::Token,
};

// Some writers prefix the clear text with one; readers drop it
const BOM: char = '\u{feff}';

/// Encrypts [`EncryptedString`] values on their way into the database, and decrypts them on
/// their way back out.
///
/// Each value is stored as a self-contained token, `base64(cipher text)@base64(IV)`, with a
/// fresh random IV for every encryption.  That means encrypting the same clear text twice gives
/// two different tokens, so you can't search or join on an encrypted column, but it also means
/// nobody reading the database can tell which rows share a value.
///
/// Empty and all-whitespace strings are never encrypted, and are passed through as-is in both
/// directions; database nulls stay null.
///
/// # Example
///
/// ```rust
/// use encrypted_string::{
///     AlgorithmConfig, DbValue, EncryptedString, EncryptedStringConverter, Error,
///     StaticAlgorithmProvider,
/// };
/// # fn main() -> Result<(), Error> {
///
/// let converter = EncryptedStringConverter::new(StaticAlgorithmProvider::new(
///     AlgorithmConfig::new("AES", encrypted_string::generate_key())?,
/// ));
///
/// let stored = converter.encode(Some(&EncryptedString::from("hello world")))?;
/// let DbValue::Text(token) = &stored else { panic!("expected text") };
/// assert!(token.contains('@'));
///
/// assert_eq!(
///     Some(EncryptedString::from("hello world")),
///     converter.decode(&stored)?
/// );
///
/// // Nulls and blanks never go anywhere near the cipher
/// assert_eq!(DbValue::Null, converter.encode(None)?);
/// assert_eq!(None, converter.decode(&DbValue::Null)?);
/// assert_eq!(Some(EncryptedString::from("  ")), converter.decode(&"  ".into())?);
///
/// // Something that was never a token is rejected, rather than "decrypted"
/// assert!(matches!(converter.decode(&"hello".into()), Err(Error::MalformedToken)));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct EncryptedStringConverter<P> {
	provider: P,
}

impl<P: AlgorithmProvider> EncryptedStringConverter<P> {
	pub fn new(provider: P) -> Self {
		Self { provider }
	}

	pub fn provider(&self) -> &P {
		&self.provider
	}

	/// Whether `ty` is the one type this converter handles, [`EncryptedString`].
	pub fn can_convert(&self, ty: TypeId) -> bool {
		ty == TypeId::of::<EncryptedString>()
	}

	/// Turn a stored database value back into an [`EncryptedString`].
	///
	/// # Errors
	///
	/// * [`Error::UnexpectedDbValue`] if `value` is neither null nor text.
	/// * Anything [`EncryptedStringConverter::decrypt`] can fail with.
	#[tracing::instrument(level = "debug", skip_all)]
	pub fn decode(&self, value: &DbValue) -> Result<Option<EncryptedString>, Error> {
		match value {
			DbValue::Null => Ok(None),
			DbValue::Text(s) if s.trim().is_empty() => Ok(Some(EncryptedString::new(s.as_str()))),
			DbValue::Text(s) => self.decrypt(s).map(EncryptedString::from).map(Some),
			v => {
				tracing::debug!(kind = v.kind(), "Refusing to decode non-text value");
				Err(Error::UnexpectedDbValue(v.kind()))
			}
		}
	}

	/// As [`EncryptedStringConverter::decode`], reading column `index` of `record`.
	///
	/// # Errors
	///
	/// [`Error::ColumnOutOfRange`] if `record` has no column `index`, otherwise as for
	/// [`EncryptedStringConverter::decode`].
	pub fn decode_record<R: DataRecord + ?Sized>(
		&self,
		record: &R,
		index: usize,
	) -> Result<Option<EncryptedString>, Error> {
		let value = record.value(index).ok_or(Error::ColumnOutOfRange(index))?;
		self.decode(value)
	}

	/// Turn an [`EncryptedString`] into the value to store in the database.
	///
	/// # Errors
	///
	/// Anything [`EncryptedStringConverter::encrypt`] can fail with.
	#[tracing::instrument(level = "debug", skip_all)]
	pub fn encode(&self, value: Option<&EncryptedString>) -> Result<DbValue, Error> {
		match value {
			None => Ok(DbValue::Null),
			Some(s) if s.as_str().trim().is_empty() => Ok(DbValue::Text(s.to_string())),
			Some(s) => self.encrypt(s.as_str()).map(DbValue::Text),
		}
	}

	/// Encrypt `clear_text` under a fresh random IV, producing a token.
	///
	/// # Errors
	///
	/// [`Error::InvalidKey`] if the provider hands out a cipher with an unusable key.
	#[tracing::instrument(level = "debug", skip_all)]
	pub fn encrypt(&self, clear_text: &str) -> Result<String, Error> {
		let mut cipher = self.provider.create_algorithm();
		// Always a new IV, even when re-encrypting a value that already had one
		cipher.generate_iv();

		let ciphertext = cipher.encryptor()?.encrypt(clear_text.as_bytes());
		let token = Token::new(ciphertext, cipher.iv().to_vec());
		tracing::debug!(?token, "Encrypted");

		Ok(token.to_string())
	}

	/// Decrypt a token produced by [`EncryptedStringConverter::encrypt`] (or anything else that
	/// writes the same format under the same key).
	///
	/// # Errors
	///
	/// * [`Error::MalformedToken`] if there's no `@` separator.
	/// * [`Error::InvalidEncoding`] if either half isn't valid base64.
	/// * [`Error::Decryption`] if the IV is the wrong size, the key is wrong, the cipher text
	///   is damaged, or what comes out isn't UTF-8.
	///
	/// A leading UTF-8 byte order mark in the decrypted text is dropped.
	#[tracing::instrument(level = "debug", skip_all)]
	pub fn decrypt(&self, token: &str) -> Result<String, Error> {
		let token = Token::parse(token)?;

		let mut cipher = self.provider.create_algorithm();
		cipher.set_iv(&token.iv).map_err(|e| {
			tracing::debug!(%e, "Token IV rejected");
			Error::Decryption
		})?;

		let plaintext = cipher.decryptor()?.decrypt(&token.ciphertext)?;

		let mut text = String::from_utf8(plaintext).map_err(|e| {
			tracing::debug!(%e, "Decrypted bytes are not UTF-8");
			e.into_bytes().zeroize();
			Error::Decryption
		})?;

		if text.starts_with(BOM) {
			text.drain(..BOM.len_utf8());
		}

		Ok(text)
	}

	fn check_type(ty: TypeId) -> Result<(), Error> {
		if ty == TypeId::of::<EncryptedString>() {
			Ok(())
		} else {
			Err(Error::unsupported_type(format!(
				"{ty:?} (only {} is supported)",
				type_name::<EncryptedString>()
			)))
		}
	}
}

impl<P: AlgorithmProvider + 'static> EncryptedStringConverter<P> {
	/// Make this converter the one `registry` uses for [`EncryptedString`]s, stored in text
	/// columns.
	#[tracing::instrument(level = "debug", skip_all)]
	pub fn register(self, registry: &TypeRegistry) -> Arc<Self> {
		let this = Arc::new(self);

		registry.register_mapping::<EncryptedString>(DbType::String);
		registry.add_converter(this.clone());

		this
	}
}

impl<P: AlgorithmProvider> TypeConverter for EncryptedStringConverter<P> {
	fn can_convert(&self, ty: TypeId) -> bool {
		EncryptedStringConverter::can_convert(self, ty)
	}

	fn convert_from_db_value(
		&self,
		value: &DbValue,
		ty: TypeId,
	) -> Result<Option<Box<dyn Any + Send>>, Error> {
		Self::check_type(ty)?;

		Ok(self
			.decode(value)?
			.map(|s| Box::new(s) as Box<dyn Any + Send>))
	}

	fn convert_to_db_value(&self, value: Option<&dyn Any>, ty: TypeId) -> Result<DbValue, Error> {
		Self::check_type(ty)?;

		let Some(value) = value else {
			return Ok(DbValue::Null);
		};

		if let Some(s) = value.downcast_ref::<EncryptedString>() {
			self.encode(Some(s))
		} else if let Some(s) = value.downcast_ref::<String>() {
			self.encode(Some(&EncryptedString::new(s.as_str())))
		} else if let Some(s) = value.downcast_ref::<&'static str>() {
			self.encode(Some(&EncryptedString::new(*s)))
		} else {
			Err(Error::unsupported_type("value is not a string"))
		}
	}
}
