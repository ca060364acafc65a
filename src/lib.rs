#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod plugin;
pub mod resolve;
pub mod rewrite;
pub mod scanning;

pub use builder::{BuildReport, ScriptBundleBuilder};
pub use config::{BuildConfig, BundlerConfig};
pub use models::{ResolvedAsset, RewriteOptions, ScriptReference, ScriptSource};
pub use plugin::{Loader, OnLoadArgs, OnLoadResult, ScriptBundlerPlugin};
pub use rewrite::{DocumentRewrite, ReferenceOutcome, ScriptRewriter};
