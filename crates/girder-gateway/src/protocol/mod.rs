//! Provider wire formats
//!
//! One module per backend family: the serde structs matching the
//! provider's payload shape, plus the conversions between them and the
//! gateway's normalized types. Everything here is an implementation
//! detail of the adapters; callers only ever see normalized types.

pub mod anthropic;
pub mod google;
pub mod openai;
