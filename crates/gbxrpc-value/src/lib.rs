//! XML-RPC value model and call/response envelopes.
//!
//! The value layer is a closed set of recursive variants ([`Value`]) with a
//! stateless codec onto the XML-RPC document grammar. On top of it,
//! [`MethodCall`] and [`MethodResponse`] model one remote call: an ordered
//! list of parameter slots, a typed return slot, and fault state.
//!
//! Decoding is strict: malformed documents come back as a typed
//! [`ParseError`] and never corrupt envelope state.

pub mod call;
pub mod elements;
pub mod error;
pub mod fault;
pub mod response;
pub mod timestamp;
pub mod value;

pub use call::MethodCall;
pub use error::{ParseError, Result};
pub use fault::Fault;
pub use response::MethodResponse;
pub use value::{decode, decode_any, encode, StructValue, Value, ValueKind};
