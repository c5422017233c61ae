//! Command line front end for tagtext.
//!
//! Renders one or many documents. A document may start with a YAML
//! frontmatter block, which becomes the page context its tags see.

/// Parallel rendering of many files.
pub mod batch;
/// Argument parsing and command dispatch.
pub mod cli;
/// YAML configuration file.
pub mod config;
