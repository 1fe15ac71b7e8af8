//! Purpose: Library crate for querying pipe-delimited villager record files.
//! Exports: `api` (stable surface), `core` (codec, scanning, queries, errors), `notice`.
//! Role: Backs the `villagers` CLI and its tests; usable directly from Rust.
//! Invariants: Every query reads the backing file fresh; nothing is cached across calls.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
pub mod notice;
