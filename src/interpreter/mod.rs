//! The executor and its runtime machinery.
//!
//! [`Value`] is the runtime value type, [`coerce`] holds the pure
//! coercion and typecast rules, and [`Executor`] walks the validated
//! token sequence, threading every effect through the [`io`] seams.

pub mod coerce;

mod exec;
mod io;
mod stack;
mod value;

pub use coerce::{cast_value, CoerceError, Numeric};
pub use exec::{ExecOutcome, Executor, Limits};
pub use io::{InputSource, OutputBuffer, QueuedInput, StdinInput};
pub use stack::{ExprStack, OpKind};
pub use value::Value;
