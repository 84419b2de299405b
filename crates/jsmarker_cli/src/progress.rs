//! Progress reporting through the log.

use std::cell::Cell;

use jsmarker_core::ProgressMonitor;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct LogProgress {
    total: Cell<Option<usize>>,
    worked: Cell<usize>,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressMonitor for LogProgress {
    fn begin_task(&self, name: &str, total: Option<usize>) {
        self.total.set(total);
        self.worked.set(0);
        match total {
            Some(total) => info!("{}: {} file(s) to lint", name, total),
            None => info!("{}: linting", name),
        }
    }

    fn sub_task(&self, name: &str) {
        match self.total.get() {
            Some(total) => debug!("[{}/{}] {}", self.worked.get() + 1, total, name),
            None => debug!("{}", name),
        }
    }

    fn worked(&self, units: usize) {
        self.worked.set(self.worked.get() + units);
    }
}
