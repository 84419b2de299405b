//! Selection of the files a pass must lint.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::debug;

use crate::delta::{BuildRequest, ChangeEvent, ChangeKind};
use crate::error::BuildError;
use crate::host::ProjectTree;
use crate::resource::Resource;

/// Maps a build request to the ordered set of files to re-lint.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeClassifier;

impl ChangeClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Returns the lintable files for `request`, in visit order and without duplicates.
    ///
    /// Removed resources are never returned; their markers go with them.
    pub fn classify(
        &self,
        tree: &dyn ProjectTree,
        request: &BuildRequest,
    ) -> Result<Vec<Resource>, BuildError> {
        let mut selection = Selection::default();

        match request {
            BuildRequest::Full => {
                for resource in tree.members()? {
                    selection.offer(&resource);
                }
            }
            BuildRequest::Incremental(events) => {
                for event in events {
                    event.walk(&mut |e: &ChangeEvent| match e.kind {
                        ChangeKind::Added | ChangeKind::Changed => selection.offer(&e.resource),
                        ChangeKind::Removed => {}
                    });
                }
            }
        }

        debug!(
            "Classified {} file(s) for a {:?} build of '{}'",
            selection.resources.len(),
            request.mode(),
            tree.name()
        );
        Ok(selection.resources)
    }
}

#[derive(Default)]
struct Selection {
    seen: HashSet<PathBuf>,
    resources: Vec<Resource>,
}

impl Selection {
    fn offer(&mut self, resource: &Resource) {
        if resource.is_lintable() && self.seen.insert(resource.path().to_path_buf()) {
            self.resources.push(resource.clone());
        }
    }
}
