//! Protocol version negotiation and command gating

mod negotiator;

pub use negotiator::Negotiator;
