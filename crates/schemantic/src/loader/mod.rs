//! Loading schema and instance documents from disk
//!
//! Documents are parsed from JSON or YAML by file extension. The
//! [`DirectoryResolver`] serves `$ref` targets from a directory tree.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use schemantic::loader::{parse_file, DirectoryResolver};
//! use schemantic::Context;
//! use std::path::Path;
//! use url::Url;
//!
//! let mut ctx = Context::new();
//! ctx.set_resolver(DirectoryResolver::new(
//!     "schemas",
//!     Url::parse("http://localhost/")?,
//! ));
//! let schema = ctx.compile(&parse_file(Path::new("schemas/order.json"))?)?;
//! let report = ctx.validate(schema, &parse_file(Path::new("order.yaml"))?)?;
//! println!("{}", report);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

pub mod directory;
pub mod error;
pub mod parser;

pub use directory::DirectoryResolver;
pub use error::{LoaderError, LoaderResult};
pub use parser::{parse_file, parse_str, Format};
