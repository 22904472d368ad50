//! Free-function helpers for the action front-ends. Nothing here extends or
//! patches shared types; callers import what they need.

pub mod color;
pub mod debounce;
pub mod hex;
