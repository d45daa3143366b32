//! Colosseum Sim - tick-based boss encounter simulator
//!
//! A deterministic 600ms-tick simulation of a player fighting Sol Heredit in
//! the Fortis Colosseum: grid pathing, combat formulas, overhead prayers,
//! projectiles and a fully scripted boss with telegraphed hazards.

pub mod boss;
pub mod combat;
pub mod core;
pub mod spatial;
pub mod units;
pub mod world;
