//! Cooperative cancellation passed to the model streaming call.

mod token;

pub use token::CancellationToken;
