#![ doc = include_str!( concat!( env!( "CARGO_MANIFEST_DIR" ), "/", "README.md" ) ) ]
#![ doc = include_str!( concat!( env!( "CARGO_MANIFEST_DIR" ), "/", "CHANGELOG.md" ) ) ]

pub mod config;
pub mod consts;
pub mod filter;
pub mod frame;
pub mod identifier;
pub mod monitor;
pub mod ranges;
pub mod slave;

mod vector;
pub use vector::VectorTrait;

mod error;
pub use error::ErrorKind;

pub use frame::{Frame, Payload};
pub use identifier::{FrameIdentifier, FunctionCode, IdLayout, MessageClass};
pub use ranges::RangeSet;

#[cfg(test)]
mod tests;
