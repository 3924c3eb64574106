use encrypted_string::{
	AlgorithmConfig, AlgorithmProvider, Cipher, DbValue, EncryptedString, EncryptedStringConverter,
	Error, StaticAlgorithmProvider, TypeRegistry,
};
use std::{any::TypeId, sync::Arc, thread};

const KEY_A: [u8; 32] = *b"0123456789abcdef0123456789abcdef";
const KEY_B: [u8; 32] = *b"fedcba9876543210fedcba9876543210";

fn converter(key: [u8; 32]) -> EncryptedStringConverter<StaticAlgorithmProvider> {
	EncryptedStringConverter::new(StaticAlgorithmProvider::new(
		AlgorithmConfig::new("AES", key).unwrap(),
	))
}

fn is_base64(s: &str) -> bool {
	!s.is_empty()
		&& s.bytes()
			.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

#[test]
fn hello_world() {
	let c = converter(KEY_A);

	let token = c.encrypt("hello world").unwrap();
	let (ct, iv) = token.split_once('@').unwrap();

	assert!(is_base64(ct), "{token}");
	assert!(is_base64(iv), "{token}");
	assert_eq!("hello world", c.decrypt(&token).unwrap());

	// A different converter with the same key reads it just as well
	assert_eq!("hello world", converter(KEY_A).decrypt(&token).unwrap());
}

#[test]
fn existing_token_decrypts() {
	// Written elsewhere with AES-256-CBC, key 00..1f, IV 00..0f
	let key: Vec<u8> = (0u8..32).collect();
	let c = EncryptedStringConverter::new(StaticAlgorithmProvider::new(
		AlgorithmConfig::new("AesManaged", key).unwrap(),
	));

	assert_eq!(
		"hello world",
		c.decrypt("tXWiwD5XcRD2wBA8KHGYlg==@AAECAwQFBgcICQoLDA0ODw==")
			.unwrap()
	);
}

#[derive(Debug)]
struct FromEnvironment(AlgorithmConfig);

impl AlgorithmProvider for FromEnvironment {
	fn create_algorithm(&self) -> Cipher {
		Cipher::from_config(&self.0)
	}
}

#[test]
fn custom_provider_interoperates() {
	let custom = EncryptedStringConverter::new(FromEnvironment(
		AlgorithmConfig::new("AES", KEY_A).unwrap(),
	));
	let builtin = converter(KEY_A);

	let token = custom.encrypt("across providers").unwrap();
	assert_eq!("across providers", builtin.decrypt(&token).unwrap());

	let token = builtin.encrypt("and back").unwrap();
	assert_eq!("and back", custom.decrypt(&token).unwrap());
}

#[test]
fn wrong_key_never_yields_text() {
	let a = converter(KEY_A);
	let b = converter(KEY_B);

	for s in ["hello world", "another secret value, a bit longer than one block"] {
		let token = a.encrypt(s).unwrap();
		assert!(matches!(b.decrypt(&token), Err(Error::Decryption)), "{s}");
	}
}

#[test]
fn error_kinds() {
	let c = converter(KEY_A);

	assert!(matches!(c.decrypt("abc"), Err(Error::MalformedToken)));
	assert!(matches!(
		c.decrypt("not-base64!!!@alsoNotBase64$$$"),
		Err(Error::InvalidEncoding { .. })
	));
	assert_eq!(
		"the cipher text is invalid and cannot be decrypted",
		Error::MalformedToken.to_string()
	);
}

#[test]
fn storage_round_trip_through_registry() {
	let registry = TypeRegistry::new();
	converter(KEY_A).register(&registry);

	let ty = TypeId::of::<EncryptedString>();
	let conv = registry.converter_for(ty).unwrap();

	let rows: Vec<Option<EncryptedString>> = vec![
		Some("alice@example.com".into()),
		None,
		Some("".into()),
		Some("   ".into()),
		Some("bob".into()),
	];

	let stored: Vec<DbValue> = rows
		.iter()
		.map(|r| {
			conv.convert_to_db_value(r.as_ref().map(|s| s as &dyn std::any::Any), ty)
				.unwrap()
		})
		.collect();

	assert_ne!(DbValue::from("alice@example.com"), stored[0]);
	assert_eq!(DbValue::Null, stored[1]);
	assert_eq!(DbValue::from(""), stored[2]);
	assert_eq!(DbValue::from("   "), stored[3]);

	for (i, expected) in rows.iter().enumerate() {
		let read = conv
			.convert_from_record(&stored, i, ty)
			.unwrap()
			.map(|v| *v.downcast::<EncryptedString>().unwrap());
		assert_eq!(expected, &read, "row {i}");
	}
}

#[test]
fn concurrent_use() {
	let c = Arc::new(converter(KEY_A));

	let handles: Vec<_> = (0..8)
		.map(|i| {
			let c = Arc::clone(&c);
			thread::spawn(move || {
				for j in 0..50 {
					let s = format!("thread {i} value {j}");
					let token = c.encrypt(&s).unwrap();
					assert_eq!(s, c.decrypt(&token).unwrap());
				}
			})
		})
		.collect();

	for h in handles {
		h.join().unwrap();
	}
}

#[test]
fn provider_handles_are_independent() {
	let p = StaticAlgorithmProvider::new(AlgorithmConfig::new("AES", KEY_A).unwrap());

	let mut a = p.create_algorithm();
	let mut b = p.create_algorithm();
	a.generate_iv();
	b.generate_iv();

	assert_ne!(a.iv(), b.iv());
}
