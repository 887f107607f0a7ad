use log::{debug, warn};

/// Routes locator messages to the `log` facade.
///
/// Verbose per-ray detail is emitted only when the debug flag is set.
pub struct LogManager {
    debug: bool,
}

impl LogManager {
    pub fn new() -> Self {
        Self { debug: false }
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn detail(&self, message: &str) {
        if self.debug {
            debug!("{}", message);
        }
    }

    pub fn warn(&self, message: &str) {
        warn!("{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
