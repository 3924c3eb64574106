use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::{BlockDecryptMut as _, BlockEncryptMut as _, KeyIvInit as _, block_padding::Pkcs7};
use secrecy::zeroize::Zeroize as _;

use super::{Algorithm, AlgorithmConfig, Error, Key};

/// A single-use symmetric cipher, configured with an algorithm, a key, and an IV.
///
/// Handles come from [`AlgorithmProvider::create_algorithm`](super::AlgorithmProvider::create_algorithm),
/// one per operation, and are dropped when that operation is done.  Nothing about a handle is
/// shared with any other handle, so they can be created freely on any thread.
///
/// The IV starts out zeroed; call [`Cipher::generate_iv`] before encrypting, or
/// [`Cipher::set_iv`] with the stored IV before decrypting.
#[derive(Debug)]
pub struct Cipher {
	algorithm: Algorithm,
	key: Key,
	iv: Vec<u8>,
}

impl Cipher {
	pub(crate) fn new(algorithm: Algorithm, key: Key) -> Self {
		Self {
			algorithm,
			iv: vec![0u8; algorithm.iv_size()],
			key,
		}
	}

	/// A fresh handle for `config`'s algorithm and key, with a zeroed IV.
	///
	/// This is what an [`AlgorithmProvider`](super::AlgorithmProvider) is expected to return from
	/// each call to `create_algorithm`.
	pub fn from_config(config: &AlgorithmConfig) -> Self {
		Self::new(config.algorithm(), config.key().clone())
	}

	pub fn algorithm(&self) -> Algorithm {
		self.algorithm
	}

	pub fn key(&self) -> &Key {
		&self.key
	}

	pub fn iv(&self) -> &[u8] {
		&self.iv
	}

	/// Replace the IV with fresh bytes from the thread CSPRNG.
	#[tracing::instrument(level = "trace", skip(self))]
	pub fn generate_iv(&mut self) {
		use rand::{RngCore, rng};

		rng().fill_bytes(&mut self.iv);
	}

	/// Use a previously generated IV, typically one read back alongside its cipher text.
	///
	/// # Errors
	///
	/// [`Error::InvalidIv`] if `iv` isn't exactly [`Algorithm::iv_size`] bytes long.
	#[tracing::instrument(level = "trace", skip(self, iv))]
	pub fn set_iv(&mut self, iv: &[u8]) -> Result<(), Error> {
		if iv.len() != self.iv.len() {
			return Err(Error::invalid_iv(self.iv.len(), iv.len()));
		}

		self.iv.copy_from_slice(iv);
		Ok(())
	}

	/// Build a one-shot encryptor from the current key and IV.
	///
	/// # Errors
	///
	/// [`Error::InvalidKey`] if the key doesn't fit the algorithm, which can only happen if the
	/// handle wasn't built from a validated [`AlgorithmConfig`](super::AlgorithmConfig).
	#[tracing::instrument(level = "trace", skip(self))]
	pub fn encryptor(&self) -> Result<Encryptor, Error> {
		let key = self.key.expose_secret();
		let iv = &self.iv[..];

		let inner = match key.len() {
			16 => Transform::Aes128(cbc::Encryptor::new_from_slices(key, iv).map_err(bad_key)?),
			24 => Transform::Aes192(cbc::Encryptor::new_from_slices(key, iv).map_err(bad_key)?),
			32 => Transform::Aes256(cbc::Encryptor::new_from_slices(key, iv).map_err(bad_key)?),
			n => return Err(Error::invalid_key(format!("{n} byte key"))),
		};

		Ok(Encryptor(inner))
	}

	/// Build a one-shot decryptor from the current key and IV.
	///
	/// # Errors
	///
	/// As for [`Cipher::encryptor`].
	#[tracing::instrument(level = "trace", skip(self))]
	pub fn decryptor(&self) -> Result<Decryptor, Error> {
		let key = self.key.expose_secret();
		let iv = &self.iv[..];

		let inner = match key.len() {
			16 => Transform::Aes128(cbc::Decryptor::new_from_slices(key, iv).map_err(bad_key)?),
			24 => Transform::Aes192(cbc::Decryptor::new_from_slices(key, iv).map_err(bad_key)?),
			32 => Transform::Aes256(cbc::Decryptor::new_from_slices(key, iv).map_err(bad_key)?),
			n => return Err(Error::invalid_key(format!("{n} byte key"))),
		};

		Ok(Decryptor(inner))
	}
}

impl Drop for Cipher {
	fn drop(&mut self) {
		self.iv.zeroize();
	}
}

fn bad_key(e: cbc::cipher::InvalidLength) -> Error {
	Error::invalid_key(e.to_string())
}

enum Transform<A, B, C> {
	Aes128(A),
	Aes192(B),
	Aes256(C),
}

impl<A, B, C> Transform<A, B, C> {
	fn name(&self) -> &'static str {
		match self {
			Transform::Aes128(_) => "AES-128-CBC",
			Transform::Aes192(_) => "AES-192-CBC",
			Transform::Aes256(_) => "AES-256-CBC",
		}
	}
}

/// Encrypts one clear text, consuming itself in the process.
pub struct Encryptor(
	Transform<cbc::Encryptor<Aes128>, cbc::Encryptor<Aes192>, cbc::Encryptor<Aes256>>,
);

impl Encryptor {
	/// Encrypt `plaintext`, PKCS#7 padded to a whole number of blocks.
	pub fn encrypt(self, plaintext: &[u8]) -> Vec<u8> {
		match self.0 {
			Transform::Aes128(e) => e.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
			Transform::Aes192(e) => e.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
			Transform::Aes256(e) => e.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
		}
	}
}

impl std::fmt::Debug for Encryptor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Encryptor").field(&self.0.name()).finish()
	}
}

/// Decrypts one cipher text, consuming itself in the process.
pub struct Decryptor(
	Transform<cbc::Decryptor<Aes128>, cbc::Decryptor<Aes192>, cbc::Decryptor<Aes256>>,
);

impl Decryptor {
	/// Decrypt `ciphertext` and strip its padding.
	///
	/// # Errors
	///
	/// [`Error::Decryption`] if the cipher text isn't a whole number of blocks, or the padding
	/// doesn't check out (which is what a wrong key or IV usually looks like).
	pub fn decrypt(self, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
		let name = self.0.name();

		match self.0 {
			Transform::Aes128(d) => d.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
			Transform::Aes192(d) => d.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
			Transform::Aes256(d) => d.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
		}
		.map_err(|_| {
			tracing::debug!(cipher = name, len = ciphertext.len(), "Unpadding failed");
			Error::Decryption
		})
	}
}

impl std::fmt::Debug for Decryptor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Decryptor").field(&self.0.name()).finish()
	}
}
