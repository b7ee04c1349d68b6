//! # IFC Space Analyzer
//!
//! Works out which building elements sit in which spaces of an IFC model and
//! republishes that assignment for a property-writing stage.
//!
//! ## Features
//!
//! - Parse IFC files (IFC2x3 and IFC4 schemas) into a read-only graph
//! - Resolve storeys, zones and contained elements for every space
//! - Summarize areas and split circulation from program space
//! - Filter the assignment into GlobalId → room-name mappings
//! - Export to JSON and CSV
//!
//! ## Example
//!
//! ```no_run
//! use ifc_space_analyzer::analysis::run_analysis;
//! use ifc_space_analyzer::config::{AnalysisConfig, TransformConfig};
//! use ifc_space_analyzer::parser::parse_ifc_file;
//! use ifc_space_analyzer::transform::transform_map;
//!
//! let graph = parse_ifc_file("model.ifc")?;
//! let report = run_analysis(&graph, &AnalysisConfig::default())?;
//! let output = transform_map(&report.element_space_map, &graph, &TransformConfig::default());
//! println!("{} walls mapped", output.mappings.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analysis;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod graph;
pub mod model;
pub mod parser;
pub mod plan;
pub mod transform;
