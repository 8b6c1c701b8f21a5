//! Process-wide value encode/decode hooks.
//!
//! The storage engine only understands SQLite's storage classes. Values it
//! cannot natively represent travel as [`Value::Any`] and are bridged by two
//! kinds of hooks:
//!
//! - an **adapter** encodes a value of a specific Rust type into a primitive
//!   [`Value`] before it is bound to a statement, keyed by [`TypeId`];
//! - a **converter** decodes a primitive value read from a column whose
//!   *declared datatype name* matches, keyed by that name (case-insensitive).
//!
//! Registration is global, mutable, process-wide state: registering hooks
//! from one table binding affects every other table in the process, and there
//! is no unregistration. Treat it as a one-time, order-sensitive
//! configuration step performed before any tables are constructed.

use crate::{stmt::Value, Error, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

type AdapterFn = Box<dyn Fn(&(dyn Any + Send + Sync)) -> Value + Send + Sync>;

/// Decodes a primitive value read from the store into a richer [`Value`].
pub type ConverterFn = fn(&Value) -> Result<Value>;

#[derive(Default)]
struct Registry {
    adapters: HashMap<TypeId, AdapterFn>,
    converters: HashMap<String, ConverterFn>,
}

fn registry() -> &'static RwLock<Registry> {
    static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(Registry::default()))
}

/// Registers an encode hook for values of type `T`.
///
/// The adapter receives the wrapped value and must return a primitive
/// [`Value`] the store can represent.
pub fn register_adapter<T: Any + Send + Sync>(adapt: fn(&T) -> Value) {
    let mut reg = registry().write().unwrap();
    reg.adapters.insert(
        TypeId::of::<T>(),
        Box::new(move |any| {
            let value = any
                .downcast_ref::<T>()
                .expect("adapter registered under a mismatched TypeId");
            adapt(value)
        }),
    );
}

/// Registers a decode hook for columns declared with `datatype`.
pub fn register_converter(datatype: &str, convert: ConverterFn) {
    let mut reg = registry().write().unwrap();
    reg.converters.insert(datatype.to_uppercase(), convert);
}

/// Encodes a wrapped value through its registered adapter.
pub(crate) fn encode(value: &(dyn Any + Send + Sync)) -> Result<Value> {
    let reg = registry().read().unwrap();
    match reg.adapters.get(&Any::type_id(value)) {
        Some(adapt) => Ok(adapt(value)),
        None => Err(Error::type_conversion(
            "unregistered value type",
            "sqlite value",
        )),
    }
}

/// Decodes a primitive value read from a column declared as `datatype`.
///
/// Returns the value untouched when no converter matches, mirroring the
/// store's dynamic typing.
pub(crate) fn decode(datatype: &str, value: Value) -> Result<Value> {
    let reg = registry().read().unwrap();
    match reg.converters.get(&datatype.to_uppercase()) {
        Some(convert) => convert(&value),
        None => Ok(value),
    }
}
