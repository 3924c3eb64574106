use std::{fmt::Debug, sync::Arc};

use super::{AlgorithmConfig, Cipher};

/// Something that can hand out ready-to-use [`Cipher`]s on demand.
///
/// Every call must return a brand new handle, configured with the key and algorithm but
/// sharing no state with any previous handle, so that callers on different threads never
/// step on one another.
pub trait AlgorithmProvider: Debug + Send + Sync {
	/// Create the cipher to be used for a single encryption or decryption.
	fn create_algorithm(&self) -> Cipher;
}

/// An [`AlgorithmProvider`] for a fixed, pre-validated [`AlgorithmConfig`].
///
/// Where the name and key come from (a config file, the environment, a secret store) is up to
/// whoever builds the [`AlgorithmConfig`]; by the time it gets here, it's known to be usable.
///
/// # Example
///
/// ```rust
/// use encrypted_string::{AlgorithmConfig, AlgorithmProvider, Error, StaticAlgorithmProvider};
/// # fn main() -> Result<(), Error> {
///
/// let provider = StaticAlgorithmProvider::new(AlgorithmConfig::new(
///     "AES",
///     encrypted_string::generate_key(),
/// )?);
///
/// let mut cipher = provider.create_algorithm();
/// cipher.generate_iv();
/// let iv = cipher.iv().to_vec();
/// let ciphertext = cipher.encryptor()?.encrypt(b"Hello, world!");
/// drop(cipher);
///
/// // A separate handle, given the same IV, reverses it
/// let mut cipher = provider.create_algorithm();
/// cipher.set_iv(&iv)?;
/// assert_eq!(b"Hello, world!".to_vec(), cipher.decryptor()?.decrypt(&ciphertext)?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct StaticAlgorithmProvider {
	config: AlgorithmConfig,
}

impl StaticAlgorithmProvider {
	#[tracing::instrument(level = "debug", skip(config), fields(algorithm = config.name()))]
	pub fn new(config: AlgorithmConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &AlgorithmConfig {
		&self.config
	}
}

impl AlgorithmProvider for StaticAlgorithmProvider {
	#[tracing::instrument(level = "trace", skip(self))]
	fn create_algorithm(&self) -> Cipher {
		Cipher::from_config(&self.config)
	}
}

impl<P: AlgorithmProvider + ?Sized> AlgorithmProvider for &P {
	fn create_algorithm(&self) -> Cipher {
		(**self).create_algorithm()
	}
}

impl<P: AlgorithmProvider + ?Sized> AlgorithmProvider for Arc<P> {
	fn create_algorithm(&self) -> Cipher {
		(**self).create_algorithm()
	}
}

impl<P: AlgorithmProvider + ?Sized> AlgorithmProvider for Box<P> {
	fn create_algorithm(&self) -> Cipher {
		(**self).create_algorithm()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Algorithm;

	fn provider() -> StaticAlgorithmProvider {
		StaticAlgorithmProvider::new(AlgorithmConfig::new("AES", [5u8; 32]).unwrap())
	}

	#[test]
	fn fresh_handle_every_time() {
		let p = provider();

		let mut a = p.create_algorithm();
		a.generate_iv();
		let b = p.create_algorithm();

		assert_eq!(Algorithm::Aes, b.algorithm());
		assert_eq!(&[5u8; 32], b.key().expose_secret());
		// Generating an IV on one handle doesn't leak into the next
		assert_eq!(&[0u8; 16], b.iv());
		assert_ne!(a.iv(), b.iv());
	}

	#[test]
	fn shared_providers() {
		let p: Arc<dyn AlgorithmProvider> = Arc::new(provider());
		let by_ref = &p;
		let boxed: Box<dyn AlgorithmProvider> = Box::new(provider());

		assert_eq!(
			p.create_algorithm().key().expose_secret(),
			by_ref.create_algorithm().key().expose_secret()
		);
		assert_eq!(
			p.create_algorithm().key().expose_secret(),
			boxed.create_algorithm().key().expose_secret()
		);
	}

	// A provider living outside this crate, picking its key per call
	#[derive(Debug)]
	struct Alternating {
		configs: [AlgorithmConfig; 2],
		calls: std::sync::atomic::AtomicUsize,
	}

	impl AlgorithmProvider for Alternating {
		fn create_algorithm(&self) -> Cipher {
			let n = self
				.calls
				.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
			Cipher::from_config(&self.configs[n % 2])
		}
	}

	#[test]
	fn custom_provider() {
		let p = Alternating {
			configs: [
				AlgorithmConfig::new("AES", [1u8; 16]).unwrap(),
				AlgorithmConfig::new("AES", [2u8; 32]).unwrap(),
			],
			calls: Default::default(),
		};

		let a = p.create_algorithm();
		let b = p.create_algorithm();

		assert_eq!(&[1u8; 16], a.key().expose_secret());
		assert_eq!(&[2u8; 32], b.key().expose_secret());
		assert_eq!(&[0u8; 16], b.iv());

		let mut c = p.create_algorithm();
		c.generate_iv();
		let ct = c.encryptor().unwrap().encrypt(b"from outside");
		assert_eq!(
			b"from outside".to_vec(),
			c.decryptor().unwrap().decrypt(&ct).unwrap()
		);
	}

	#[test]
	fn usable_across_threads() {
		let p = Arc::new(provider());

		let handles: Vec<_> = (0..4)
			.map(|i| {
				let p = Arc::clone(&p);
				std::thread::spawn(move || {
					let mut c = p.create_algorithm();
					c.generate_iv();
					let msg = format!("message {i}");
					let ct = c.encryptor().unwrap().encrypt(msg.as_bytes());
					let pt = c.decryptor().unwrap().decrypt(&ct).unwrap();
					assert_eq!(msg.as_bytes(), &pt[..]);
				})
			})
			.collect();

		for h in handles {
			h.join().unwrap();
		}
	}
}
