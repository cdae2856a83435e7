//! SVG export through the Mermaid CLI.
//!
//! The renderer is an external program. Several discovery strategies are
//! tried in order (a locally installed binary, then `npx`) and the first one
//! that produces the output file wins. When all of them fail, every attempt
//! is reported in an [`ExportFailure`](depviz_core::ExportFailure).

pub mod runner;
pub mod strategy;

pub use runner::{export_diagram, export_svg, write_renderer_config};
pub use strategy::{default_strategies, ExportStrategy};
