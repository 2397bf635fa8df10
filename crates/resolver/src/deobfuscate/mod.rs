//! Reversible deobfuscation helpers shared by the parsers.
//!
//! Everything in here is synchronous and pure: no I/O, no suspension points.

pub mod alphabet;
pub mod base64_chain;
pub mod packer;
pub mod xor;

pub use alphabet::decode_reordered;
pub use base64_chain::peel;
pub use packer::{find_packed, unpack, unpack_page};
pub use xor::xor_decode;
