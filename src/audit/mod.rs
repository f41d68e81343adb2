//! Audit trail module
//!
//! Text wire format for ledger mutations (codec) and the channel subscriber
//! that turns decoded messages into ChangeLog rows.

pub mod codec;
mod subscriber;

pub use codec::{decode, decode_with, encode, AuditFact};
pub use subscriber::AuditSubscriber;
