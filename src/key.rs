use secrecy::{ExposeSecret as _, SecretBox};

/// Raw key material for an [`Algorithm`](super::Algorithm).
///
/// The bytes are zeroed when the last copy is dropped, and never appear in `Debug` output.
#[derive(Debug)]
pub struct Key(SecretBox<[u8]>);

impl Key {
	pub fn expose_secret(&self) -> &[u8] {
		self.0.expose_secret()
	}

	pub fn len(&self) -> usize {
		self.expose_secret().len()
	}

	pub fn is_empty(&self) -> bool {
		self.expose_secret().is_empty()
	}
}

impl Clone for Key {
	fn clone(&self) -> Self {
		Self::from(self.expose_secret())
	}
}

impl From<Vec<u8>> for Key {
	fn from(k: Vec<u8>) -> Self {
		Key(SecretBox::new(k.into_boxed_slice()))
	}
}

impl From<&[u8]> for Key {
	fn from(k: &[u8]) -> Self {
		Key(SecretBox::new(Box::from(k)))
	}
}

impl<const N: usize> From<[u8; N]> for Key {
	fn from(k: [u8; N]) -> Self {
		Self::from(&k[..])
	}
}

impl<const N: usize> From<&[u8; N]> for Key {
	fn from(k: &[u8; N]) -> Self {
		Self::from(&k[..])
	}
}

/// Create a random 256-bit key, suitable for AES.
///
/// Real deployments will load their key from wherever they keep such things, but for tests, or
/// data that only has to survive for the life of the process, a freshly generated key does the
/// job.
#[tracing::instrument(level = "debug")]
pub fn generate_key() -> Key {
	use rand::{RngCore, rng};

	let mut k = [0u8; 32];

	rng().fill_bytes(&mut k);

	let key = Key::from(&k);
	k.fill(0);

	key
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generated_keys_differ() {
		let a = generate_key();
		let b = generate_key();

		assert_eq!(32, a.len());
		assert_ne!(a.expose_secret(), b.expose_secret());
	}

	#[test]
	fn debug_does_not_leak() {
		let k = Key::from(b"super secret key bytes 123456789");

		assert!(!format!("{k:?}").contains("super secret"));
	}

	#[test]
	fn clone_is_independent_copy() {
		let k = Key::from(vec![1u8, 2, 3]);
		let c = k.clone();
		drop(k);

		assert_eq!(&[1u8, 2, 3], c.expose_secret());
	}
}
