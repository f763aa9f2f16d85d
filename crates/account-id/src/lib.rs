//! Deterministic generation, decoding and validation of the 20-character
//! account identifier (spec §4.2). Pure library: no database, no network.

mod account_type;
mod codec;
mod error;

pub use account_type::AccountType;
pub use codec::{decode, format_display, generate, validate, DecodedId, Sex};
pub use error::IdCodecError;
