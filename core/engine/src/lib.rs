//! `jsrt_engine`: the value model, object/environment arenas, realm and
//! intrinsics, and the tree-walking evaluator that together execute the
//! cons-cell IR produced by `jsrt_parser`/`jsrt_cps`.
//!
//! [`Context`] is the entry point: it owns a [`realm::Realm`] and an
//! [`jsrt_interner::Interner`], exposes the abstract operations builtins
//! are written against, and drives [`Context::eval`]/[`Context::run_jobs`].

pub mod activity;
pub mod context;
pub mod environment;
pub mod error;
pub mod eval;
pub mod intrinsics;
pub mod job_queue;
pub mod object;
pub mod property;
pub mod realm;
pub mod string;
pub mod symbol;
pub mod value;

#[cfg(test)]
mod tests;

pub use activity::{ActivityRecorder, ActivitySpan, NullRecorder};
pub use context::{Context, EngineOptions};
pub use error::{JsError, JsNativeError, JsNativeErrorKind, JsResult};
pub use object::{Heap, JsObject, ObjectData, ObjectKind};
pub use property::{Attribute, PropertyDescriptor, PropertyKey};
pub use realm::{Intrinsics, Realm};
pub use string::JsString;
pub use symbol::JsSymbol;
pub use value::JsValue;

#[cfg(feature = "std-activity")]
pub use activity::PrintRecorder;
