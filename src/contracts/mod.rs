//! Contract bindings for the Axie Infinity contracts on Ronin

pub mod axie;
pub mod erc20;
pub mod scatter;
pub mod slp;

pub use axie::*;
pub use erc20::*;
pub use scatter::*;
pub use slp::*;
