//! Off-chain game services: REST API and GraphQL gateway
//!
//! Authentication is a sign-to-authenticate handshake: the gateway hands out a
//! random message, the account signs it, and the signature buys a bearer JWT.
//! Tokens are not cached; every privileged call sequence derives its own.

mod game;
mod graphql;
mod http;

pub use game::{ClaimVoucher, ClaimableSlp, GameApi};
pub use graphql::{morph_message, AxieDetail, GraphQlClient};
pub use http::{ApiClient, RetryPolicy};
