//! Domain layer: the message model, card ranges, pending transactions and
//! the ports through which the engine reaches its collaborators.

pub mod card_range;
pub mod context;
pub mod merchant;
pub mod message;
pub mod ports;
pub mod transaction;
