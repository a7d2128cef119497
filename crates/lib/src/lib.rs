//! riastore-lib: layout and bootstrap helpers for RIA stores
//!
//! This crate provides the building blocks for working with a
//! remote-indexed-archive (RIA) store:
//! - `layout`: canonical on-disk locations of datasets inside a store
//! - `store`: one-time version stamping of stores and datasets
//! - `url`: verification and decoding of `ria+` URLs
//! - `io`: the `StorageIo` capability with local and ssh backends
//! - `archive`: a thin shim around the external `7z` archiver

pub mod archive;
pub mod config;
pub mod consts;
pub mod io;
pub mod layout;
pub mod platform;
pub mod store;
pub mod url;

#[cfg(test)]
pub mod util;
