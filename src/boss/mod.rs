//! Scripted bosses
//!
//! A boss is an ordinary mob whose `MobBehavior` carries script state. The
//! generic mob steps hand control to the script for movement and attacks;
//! telegraphed follow-ups come back through the delayed-action queue.

pub mod ring_buffer;
pub mod sol_heredit;
pub mod telegraph;

pub use ring_buffer::RingBuffer;
pub use sol_heredit::{SolAttack, SolHereditState, GRAPPLE_SLOTS, PHASE_TRANSITION_POINTS};
pub use telegraph::{AttackDirection, SlamTile};
