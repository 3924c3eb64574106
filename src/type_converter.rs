use parking_lot::RwLock;
use std::{
	any::{Any, TypeId, type_name},
	collections::HashMap,
	fmt::Debug,
	sync::Arc,
};

use super::Error;

/// The kind of database column a Rust type is stored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DbType {
	String,
	AnsiString,
	Binary,
	Int64,
	Double,
	Boolean,
}

/// A single raw value, as read from (or about to be written to) a database column.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum DbValue {
	#[default]
	Null,
	Text(String),
	Integer(i64),
	Real(f64),
	Blob(Vec<u8>),
}

impl DbValue {
	pub fn is_null(&self) -> bool {
		matches!(self, DbValue::Null)
	}

	pub(crate) fn kind(&self) -> &'static str {
		match self {
			DbValue::Null => "null",
			DbValue::Text(_) => "text",
			DbValue::Integer(_) => "integer",
			DbValue::Real(_) => "real",
			DbValue::Blob(_) => "blob",
		}
	}
}

impl From<&str> for DbValue {
	fn from(s: &str) -> Self {
		DbValue::Text(s.to_string())
	}
}

impl From<String> for DbValue {
	fn from(s: String) -> Self {
		DbValue::Text(s)
	}
}

impl<T: Into<DbValue>> From<Option<T>> for DbValue {
	fn from(v: Option<T>) -> Self {
		v.map_or(DbValue::Null, Into::into)
	}
}

/// One row of a result set, addressed by column index.
pub trait DataRecord {
	/// The value of column `index`, or `None` if there's no such column.
	fn value(&self, index: usize) -> Option<&DbValue>;

	fn is_null(&self, index: usize) -> bool {
		self.value(index).is_none_or(DbValue::is_null)
	}
}

impl DataRecord for [DbValue] {
	fn value(&self, index: usize) -> Option<&DbValue> {
		self.get(index)
	}
}

impl DataRecord for Vec<DbValue> {
	fn value(&self, index: usize) -> Option<&DbValue> {
		self.get(index)
	}
}

/// Converts between database values and one or more Rust types, on behalf of whatever is
/// mapping rows to objects.
///
/// Values cross this interface type-erased, since the caller only knows the [`TypeId`] of the
/// field it's filling in or reading from.
pub trait TypeConverter: Debug + Send + Sync {
	/// Whether this converter handles values of type `ty`.
	fn can_convert(&self, ty: TypeId) -> bool;

	/// Convert a raw database value into a value of type `ty`.  `Ok(None)` represents a
	/// database null.
	///
	/// # Errors
	///
	/// Whatever the conversion itself fails with, or [`Error::UnsupportedType`] if `ty` isn't
	/// handled by this converter.
	fn convert_from_db_value(
		&self,
		value: &DbValue,
		ty: TypeId,
	) -> Result<Option<Box<dyn Any + Send>>, Error>;

	/// Convert column `index` of `record` into a value of type `ty`.
	///
	/// # Errors
	///
	/// As for [`TypeConverter::convert_from_db_value`], plus [`Error::ColumnOutOfRange`] if
	/// there is no such column.
	fn convert_from_record(
		&self,
		record: &dyn DataRecord,
		index: usize,
		ty: TypeId,
	) -> Result<Option<Box<dyn Any + Send>>, Error> {
		let value = record.value(index).ok_or(Error::ColumnOutOfRange(index))?;
		self.convert_from_db_value(value, ty)
	}

	/// Convert a field value of type `ty` into something that can be written to the database.
	/// `None` is written as a database null.
	///
	/// # Errors
	///
	/// Whatever the conversion itself fails with, or [`Error::UnsupportedType`] if `ty`, or
	/// the value's actual type, isn't handled by this converter.
	fn convert_to_db_value(&self, value: Option<&dyn Any>, ty: TypeId) -> Result<DbValue, Error>;
}

/// The bookkeeping a persistence layer needs to pick column types and converters.
///
/// A registry is built once, at startup, by explicit registration calls, then shared (it's
/// cheap to query from many threads at once).  Nothing registers itself behind your back.
///
/// # Example
///
/// ```rust
/// use encrypted_string::{DbType, TypeRegistry};
///
/// let registry = TypeRegistry::new();
/// registry.register_mapping::<String>(DbType::String);
///
/// assert_eq!(Some(DbType::String), registry.db_type_of::<String>());
/// assert_eq!(None, registry.db_type_of::<u8>());
/// ```
#[derive(Debug, Default)]
pub struct TypeRegistry {
	mappings: RwLock<HashMap<TypeId, DbType>>,
	converters: RwLock<Vec<Arc<dyn TypeConverter>>>,
}

impl TypeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record that values of type `T` are stored in columns of type `db_type`, replacing any
	/// previous mapping for `T`.
	#[tracing::instrument(level = "debug", skip(self), fields(ty = type_name::<T>()))]
	pub fn register_mapping<T: Any>(&self, db_type: DbType) {
		if let Some(old) = self.mappings.write().insert(TypeId::of::<T>(), db_type) {
			tracing::debug!(?old, "Replaced existing type mapping");
		}
	}

	pub fn db_type_of<T: Any>(&self) -> Option<DbType> {
		self.db_type_for(TypeId::of::<T>())
	}

	pub fn db_type_for(&self, ty: TypeId) -> Option<DbType> {
		self.mappings.read().get(&ty).copied()
	}

	/// Add a converter.  Converters added later take precedence over earlier ones for any
	/// type they both handle.
	#[tracing::instrument(level = "debug", skip(self))]
	pub fn add_converter(&self, converter: Arc<dyn TypeConverter>) {
		self.converters.write().push(converter);
	}

	/// The converter responsible for values of type `ty`, if there is one.
	pub fn converter_for(&self, ty: TypeId) -> Option<Arc<dyn TypeConverter>> {
		self.converters
			.read()
			.iter()
			.rev()
			.find(|c| c.can_convert(ty))
			.cloned()
	}
}
