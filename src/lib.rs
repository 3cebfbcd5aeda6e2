//! AI-assisted technical analysis: daily candles, indicator overlays, a
//! rasterized chart and a multimodal model's read of it.

pub mod analyst;
pub mod chart;
pub mod cli;
pub mod config;
pub mod indicators;
pub mod market;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod session;
