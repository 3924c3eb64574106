//! Transparent encryption of string columns.
//!
//! Some database fields (national ID numbers, API credentials, that sort of thing) shouldn't
//! sit in the database as clear text, but the application still wants to work with them as
//! ordinary strings.  Declare such a field as an [`EncryptedString`], register an
//! [`EncryptedStringConverter`] with the persistence layer's [`TypeRegistry`], and the value is
//! encrypted on every write and decrypted on every read, without the rest of the code noticing.
//!
//! Each stored value is a *token* of the form `base64(cipher text)@base64(IV)`.  A fresh random
//! IV is generated for every encryption and kept alongside the cipher text, so every row can be
//! decrypted on its own, and two rows holding the same clear text don't give themselves away by
//! holding the same token.  The flip side is that you can't look rows up by an encrypted value.
//!
//! The cipher comes from an [`AlgorithmProvider`], which hands out a fresh, independent
//! [`Cipher`] for every operation.  [`StaticAlgorithmProvider`] does that for a fixed algorithm
//! name and key, validated up front as an [`AlgorithmConfig`].  Where the key comes from, and
//! when it gets rotated, is the application's business.
//!
//! # Example
//!
//! ```rust
//! use std::any::{Any, TypeId};
//! use encrypted_string::{
//!     AlgorithmConfig, DbType, DbValue, EncryptedString, EncryptedStringConverter, Error,
//!     StaticAlgorithmProvider, TypeRegistry,
//! };
//! # fn main() -> Result<(), Error> {
//!
//! // Usually loaded from configuration; the key must suit the algorithm
//! let config = AlgorithmConfig::new("AES", encrypted_string::generate_key())?;
//!
//! // At startup, wire the converter into the persistence layer's registry
//! let registry = TypeRegistry::new();
//! EncryptedStringConverter::new(StaticAlgorithmProvider::new(config)).register(&registry);
//! assert_eq!(Some(DbType::String), registry.db_type_of::<EncryptedString>());
//!
//! // Later, the persistence layer finds the converter by field type
//! let ty = TypeId::of::<EncryptedString>();
//! let converter = registry.converter_for(ty).expect("converter registered");
//!
//! let field = EncryptedString::from("4111 1111 1111 1111");
//! let stored = converter.convert_to_db_value(Some(&field as &dyn Any), ty)?;
//! assert_ne!(DbValue::from("4111 1111 1111 1111"), stored);
//!
//! let read = converter.convert_from_db_value(&stored, ty)?.expect("not null");
//! assert_eq!(Some(&field), read.downcast_ref::<EncryptedString>());
//! # Ok(())
//! # }
//! ```
mod algorithm;
mod algorithm_provider;
mod cipher;
mod converter;
mod encrypted_string;
mod error;
mod key;
mod token;
mod type_converter;

pub use algorithm::{Algorithm, AlgorithmConfig, AlgorithmConfigBuilder};
pub use algorithm_provider::{AlgorithmProvider, StaticAlgorithmProvider};
pub use cipher::{Cipher, Decryptor, Encryptor};
pub use converter::EncryptedStringConverter;
pub use encrypted_string::EncryptedString;
pub use error::Error;
pub use key::{Key, generate_key};
pub use type_converter::{DataRecord, DbType, DbValue, TypeConverter, TypeRegistry};
