//! Resonance dip extraction and parameter-sweep metrics for swept S2,1
//! magnitude data.

pub mod common;
pub mod domain;
pub mod modules;
pub mod numerics;
pub mod parser;
