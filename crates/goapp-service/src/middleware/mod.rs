//! HTTP middleware for goapp.

pub mod instrument;

pub use instrument::{instrument_request, InstrumentState, RequestTimer};
