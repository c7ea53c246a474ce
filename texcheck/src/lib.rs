//! Verification engine for texture-sampling implementations: computes the
//! analytically expected result of nearest/linear sampling over 1/2/3-D
//! coordinates with clamp/repeat/mirror addressing, runs the same calls
//! through an executor (normally a real GPU), compares the two with a
//! hardware-tolerant dual ULP/relative-difference criterion, and localizes
//! mismatches down to the contributing texels and their weights.

pub mod check;
pub mod compare;
pub mod diagnose;
pub mod exec;
pub mod sample;
pub mod texel;
pub mod util;
