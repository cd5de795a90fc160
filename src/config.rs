/// Configuration for a [`Handler`](crate::Handler).
///
/// ```
/// use jsonfn::Config;
///
/// let config = Config::new().limit(64 * 1024);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub(crate) limit: usize,
}

impl Config {
    /// Create a [`Config`] instance.
    pub fn new() -> Self {
        Self {
            limit: 2_097_152, // (~2mb)
        }
    }

    /// Set maximum number of bytes of the request body that will be read.
    ///
    /// By default the limit is 2mb.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
