//! Report assembly and rendering.

pub mod assembler;
pub mod generator;

pub use assembler::{
    AnalysisBundle, AnalysisSettings, FullReport, Overview, PredictiveBundle, ReportAssembler,
};
pub use generator::{generate_json_report, generate_markdown_report, generate_overview_markdown};
