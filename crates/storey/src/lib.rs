//! Storey - Floor plans to binary glTF.
//!
//! Reading, geometry building and GLB serialization for 2D floor-plan
//! documents. Walls are extruded and segmented around their openings, floor
//! areas are triangulated, furniture is approximated by boxes, and the result
//! is written as one self-contained `.glb` with embedded textures.

pub mod build;
pub mod config;
pub mod resolve;

mod error;
mod export;

pub use storey_core::{color, geometry, mesh, scene};
pub use storey_reader::{ExportRequest, FloorPlan, ReadError, TextureCatalog, catalog, model};

pub use error::StoreyError;

use std::sync::Arc;

use log::{debug, info, trace};

use build::BuildReport;
use config::AppConfig;
use resolve::{DefaultFetcher, Resolver, TextureFetcher};
use scene::Scene;

/// Reads floor plans and exports them as binary glTF.
///
/// # Examples
///
/// ```rust,no_run
/// use storey::{Exporter, config::AppConfig};
///
/// let source = r#"{"layers": {"l0": {"vertices": {}}}}"#;
///
/// let exporter = Exporter::new(AppConfig::default());
/// let request = exporter.read(source).expect("Failed to read");
/// let glb = exporter.export_request(&request).expect("Failed to export");
///
/// std::fs::write("plan.glb", glb).expect("Failed to write");
/// ```
pub struct Exporter {
    config: AppConfig,
    fetcher: Arc<dyn TextureFetcher>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Exporter {
    /// Create a new exporter with the given configuration.
    ///
    /// Textures are loaded with a [`DefaultFetcher`] honoring the
    /// configured timeout and size limit.
    ///
    /// # Arguments
    ///
    /// * `config` - Reader defaults and export settings
    pub fn new(config: AppConfig) -> Self {
        let export = config.export();
        let fetcher = DefaultFetcher::new(export.fetch_timeout(), export.max_texture_bytes());
        Self {
            config,
            fetcher: Arc::new(fetcher),
        }
    }

    /// Replaces the texture fetcher.
    pub fn with_fetcher(mut self, fetcher: impl TextureFetcher + 'static) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Read a floor plan or a `{scene, texturesByType}` request envelope.
    ///
    /// # Errors
    ///
    /// Returns [`StoreyError::Read`] carrying the source text for malformed
    /// JSON or a non-object document.
    ///
    /// # Examples
    ///
    /// ```
    /// use storey::Exporter;
    ///
    /// let exporter = Exporter::default();
    /// let request = exporter
    ///     .read(r#"{"scene": {"layers": {}}, "texturesByType": {"wall": {}}}"#)
    ///     .unwrap();
    /// assert!(request.plan().layers().is_empty());
    ///
    /// assert!(exporter.read("[1, 2]").is_err());
    /// ```
    pub fn read(&self, source: &str) -> Result<ExportRequest, StoreyError> {
        info!(bytes = source.len(); "Reading floor plan");
        let request = storey_reader::read_request(source, self.config.defaults())
            .map_err(|err| StoreyError::new_read_error(err, source))?;
        debug!(
            layers = request.plan().layers().len(),
            textures = request.catalog().len();
            "Floor plan read"
        );
        trace!(plan:? = request.plan(); "Read floor plan");
        Ok(request)
    }

    /// Build the scene graph of `plan` without serializing it.
    pub fn build_scene(&self, plan: &FloorPlan) -> (Scene, BuildReport) {
        build::build_scene(plan, self.config.export().parallel())
    }

    /// Export `plan` with textures from `catalog` as GLB bytes.
    ///
    /// # Errors
    ///
    /// - [`StoreyError::EmptyScene`] when no visible layer produced a mesh.
    /// - [`StoreyError::TextureUnavailable`] when a selected texture cannot
    ///   be loaded.
    /// - [`StoreyError::Export`] for serialization failures.
    pub fn export_glb(
        &self,
        plan: &FloorPlan,
        catalog: &TextureCatalog,
    ) -> Result<Vec<u8>, StoreyError> {
        if plan.visible_layers().next().is_none() {
            return Err(StoreyError::EmptyScene);
        }

        let (scene, report) = self.build_scene(plan);
        if scene.mesh_count() == 0 {
            return Err(StoreyError::EmptyScene);
        }
        if report.total_skipped() > 0 {
            info!(skipped = report.total_skipped(); "Some elements were left out");
        }

        let catalog = catalog.restricted_to(plan.used_element_types());
        debug!(textures = catalog.len(); "Catalog restricted to used element types");
        let resolver = Resolver::new(&catalog, self.fetcher.as_ref());

        let export = self.config.export();
        let glb = export::write_glb(scene, &resolver, export.parallel(), export.generator())?;
        Ok(glb)
    }

    /// Export a request read with [`read`](Self::read).
    ///
    /// # Errors
    ///
    /// See [`export_glb`](Self::export_glb).
    pub fn export_request(&self, request: &ExportRequest) -> Result<Vec<u8>, StoreyError> {
        self.export_glb(request.plan(), request.catalog())
    }
}
