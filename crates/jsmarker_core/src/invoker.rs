//! Invocation of the external lint engine.

use encoding_rs::Encoding;
use tracing::debug;

use crate::error::BuildError;
use crate::host::ProjectTree;
use crate::issue::Issue;
use crate::options::LintOptions;
use crate::resource::{Resource, ResourceContents};

/// The external JavaScript analysis.
///
/// `name` identifies the source (the resource path) in the engine's output.
/// Closures with the same signature implement this trait, which keeps the
/// engine swappable in tests.
pub trait LintEngine {
    fn lint(&self, name: &str, source: &str, options: &LintOptions)
    -> Result<Vec<Issue>, BuildError>;
}

impl<F> LintEngine for F
where
    F: Fn(&str, &str, &LintOptions) -> Result<Vec<Issue>, BuildError>,
{
    fn lint(
        &self,
        name: &str,
        source: &str,
        options: &LintOptions,
    ) -> Result<Vec<Issue>, BuildError> {
        self(name, source, options)
    }
}

/// Reads a resource, decodes it and hands it to the engine.
pub struct LintInvoker {
    engine: Box<dyn LintEngine>,
}

impl LintInvoker {
    pub fn new(engine: impl LintEngine + 'static) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    /// Lints one resource with the options resolved for the current pass.
    pub fn lint(
        &self,
        tree: &dyn ProjectTree,
        resource: &Resource,
        options: &LintOptions,
    ) -> Result<Vec<Issue>, BuildError> {
        if !resource.is_accessible() {
            return Err(BuildError::read(format!(
                "Content of {} is not accessible",
                resource.path().display()
            )));
        }

        let contents = tree.read(resource)?;
        let source = decode(&contents).map_err(|reason| {
            BuildError::read(format!("{}: {}", resource.path().display(), reason))
        })?;

        let name = resource.path().to_string_lossy();
        debug!("Running lint engine on {}", name);

        self.engine
            .lint(&name, &source, options)
            .map_err(|e| match e {
                BuildError::Engine(_) => e,
                other => BuildError::engine(other.to_string()),
            })
    }
}

/// Decodes content with its declared charset, stripping a matching BOM.
pub fn decode(contents: &ResourceContents) -> Result<String, String> {
    let encoding = match contents.charset.as_deref() {
        Some(label) => Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| format!("unsupported charset '{}'", label))?,
        None => encoding_rs::UTF_8,
    };

    let bytes = match Encoding::for_bom(&contents.bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &contents.bytes[bom_len..],
        _ => &contents.bytes[..],
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| format!("malformed {} content", encoding.name()))
}
