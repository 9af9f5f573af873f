//! Global intrinsics: the constructors and prototype methods every realm
//! starts with. Grounded on `boa_engine::builtins`'s per-builtin `init`
//! pattern (each builtin module exposes an `init`/`create` that registers
//! itself on the realm), collapsed here into one `init` entry point per
//! intrinsic family since this engine has far fewer of them than the
//! teacher's full `builtins/` tree.
//!
//! `SPEC_FULL.md` §4.4 scopes this layer: `Object`/`Array`/`Function`/the
//! `Error` family/`Promise`/`Symbol` get real prototype chains and the
//! operations named there; `Map`/`Set`/`WeakMap`/`WeakSet` get only basic
//! value-model operations; `Math`/`JSON`/`Date`/`TypedArray`/Base64/
//! hashing are out of scope beyond reserving the constructor identity;
//! `RegExp` stores source/flags and stubs `exec`/`test`.

pub mod array;
pub mod error;
pub mod function;
pub mod map_set;
pub mod object;
pub mod promise;
pub mod regexp;
pub mod symbol;

use crate::context::Context;

/// Populates every cached prototype in `ctx.realm().intrinsics` with its
/// methods and registers every global constructor, called once from
/// `Context::with_options` before any user code runs.
pub fn init(ctx: &mut Context) {
    object::init(ctx);
    function::init(ctx);
    array::init(ctx);
    error::init(ctx);
    promise::init(ctx);
    promise::abort::init(ctx);
    symbol::init(ctx);
    map_set::init(ctx);
    regexp::init(ctx);
}
