//! CLI logic for the Storey floor-plan exporter.
//!
//! This module contains the core CLI logic: it reads a floor plan (or a
//! `{scene, texturesByType}` request), optionally swaps in a texture catalog
//! from a separate file, and writes the exported GLB.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{debug, info};

use storey::{Exporter, StoreyError};

/// Run the Storey CLI application
///
/// This function processes the input file through the Storey pipeline
/// and writes the resulting GLB to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `StoreyError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed input or catalog documents
/// - Plans with nothing to export
/// - Unavailable textures
/// - Serialization errors
pub fn run(args: &Args) -> Result<(), StoreyError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing floor plan"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let exporter = Exporter::new(app_config);
    let mut request = exporter.read(&source)?;

    if let Some(path) = &args.textures {
        info!(path; "Loading texture catalog");
        let catalog_source = fs::read_to_string(path)?;
        let catalog = storey_reader::read_catalog(&catalog_source)
            .map_err(|err| StoreyError::new_read_error(err, catalog_source))?;
        debug!(textures = catalog.len(); "Texture catalog replaces the request catalog");
        request = request.with_catalog(catalog);
    }

    let glb = exporter.export_request(&request)?;

    fs::write(&args.output, &glb)?;

    info!(output_file = args.output, bytes = glb.len(); "GLB exported successfully");

    Ok(())
}
