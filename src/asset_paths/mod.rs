//! Naming, addressing and writing of emitted script assets.
//!
//! Responsibilities are split into focused submodules so the template expansion, the public
//! path joining and the filesystem side effects can be tested independently.

mod layout;
mod naming;
mod public;
mod writer;

pub use layout::{AssetLayout, AssetLocation};
pub use naming::{
  DEFAULT_ASSET_NAMES, HASH_LENGTH, SCRIPT_ASSET_DIR, content_hash, render_asset_path,
  split_file_name,
};
pub use public::public_asset_path;
pub use writer::{asset_destination, write_asset};
