const DEFAULT_LIFETIME_DAYS: i64 = 30;

/// Attribution configuration.
#[derive(Debug, Clone)]
pub struct UtmConfig {
    /// How many days captured parameters are remembered for
    pub lifetime_days: i64,
}

impl Default for UtmConfig {
    fn default() -> Self {
        Self {
            lifetime_days: DEFAULT_LIFETIME_DAYS,
        }
    }
}
