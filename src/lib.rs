// * Verbatim: draft-vs-live content comparison.
// * Aligns draft documents against published web pages block by block, crawls
// * a site to find which page belongs to which draft, and reports the result.

pub mod config;
pub mod diff;
pub mod engine;
pub mod matcher;
pub mod network;
pub mod ops;
pub mod pipeline;
pub mod reader;
pub mod text;
