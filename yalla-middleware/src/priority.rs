//! Handler priority (C7, §4.7). Larger values run first — the inverse of
//! the grounding repository's own `Priority` (where `i32::MIN` is highest),
//! called out explicitly per the distilled spec's wording rather than
//! carried over silently. See DESIGN.md's Open Question decision #6.

pub const AUTHENTICATION: i32 = 200;
pub const VALIDATION: i32 = 150;
pub const TIMING: i32 = 100;
pub const TRANSACTION: i32 = 50;
