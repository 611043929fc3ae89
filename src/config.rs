use crate::error::Error;

/// Construction parameters for a [`crate::manager::Manager`] (spec.md §6).
#[derive(Clone, Copy, Debug)]
pub struct ManagerConfig {
    pub(crate) initial_nodes: u32,
    pub(crate) cache_ratio: u32,
    pub(crate) dynamic_cache: bool,
    pub(crate) gc_min_cutoff: u32,
    pub(crate) print_debug: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            initial_nodes: 524_288,
            cache_ratio: 16,
            dynamic_cache: true,
            gc_min_cutoff: 1_048_576,
            print_debug: false,
        }
    }
}

impl ManagerConfig {
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::default()
    }
}

/// Validating builder for [`ManagerConfig`]. Plain fields plus a `build()` that applies
/// spec.md §6's rounding rules (`initial_nodes`/`cache_ratio` round up to the next power
/// of two, `initial_nodes` is floored at 16) and rejects a negative `cache_ratio` with
/// `Error::InvalidArgument`, matching the style of the teacher's validating constructors
/// (e.g. `BddNode::try_pack`, which returns `None` rather than panicking on bad input).
#[derive(Clone, Copy, Debug)]
pub struct ManagerConfigBuilder {
    initial_nodes: u32,
    cache_ratio: i64,
    dynamic_cache: bool,
    gc_min_cutoff: u32,
    print_debug: bool,
}

impl Default for ManagerConfigBuilder {
    fn default() -> Self {
        let defaults = ManagerConfig::default();
        ManagerConfigBuilder {
            initial_nodes: defaults.initial_nodes,
            cache_ratio: i64::from(defaults.cache_ratio),
            dynamic_cache: defaults.dynamic_cache,
            gc_min_cutoff: defaults.gc_min_cutoff,
            print_debug: defaults.print_debug,
        }
    }
}

impl ManagerConfigBuilder {
    pub fn initial_nodes(mut self, value: u32) -> Self {
        self.initial_nodes = value;
        self
    }

    /// Accepts a signed value so that a caller's negative literal is rejected by
    /// `build()` as `Error::InvalidArgument` instead of silently wrapping through `as u32`.
    pub fn cache_ratio(mut self, value: i64) -> Self {
        self.cache_ratio = value;
        self
    }

    pub fn dynamic_cache(mut self, value: bool) -> Self {
        self.dynamic_cache = value;
        self
    }

    pub fn gc_min_cutoff(mut self, value: u32) -> Self {
        self.gc_min_cutoff = value;
        self
    }

    pub fn print_debug(mut self, value: bool) -> Self {
        self.print_debug = value;
        self
    }

    pub fn build(self) -> Result<ManagerConfig, Error> {
        if self.cache_ratio <= 0 {
            return Err(Error::InvalidArgument(format!(
                "cache_ratio must be positive, got {}",
                self.cache_ratio
            )));
        }
        let cache_ratio = (self.cache_ratio as u32).next_power_of_two();
        let initial_nodes = self.initial_nodes.max(16).next_power_of_two();
        Ok(ManagerConfig {
            initial_nodes,
            cache_ratio,
            dynamic_cache: self.dynamic_cache,
            gc_min_cutoff: self.gc_min_cutoff,
            print_debug: self.print_debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = ManagerConfig::default();
        assert_eq!(524_288, config.initial_nodes);
        assert_eq!(16, config.cache_ratio);
        assert!(config.dynamic_cache);
        assert_eq!(1_048_576, config.gc_min_cutoff);
        assert!(!config.print_debug);
    }

    #[test]
    fn negative_cache_ratio_is_rejected() {
        let result = ManagerConfig::builder().cache_ratio(-1).build();
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn small_initial_nodes_rounds_up() {
        let config = ManagerConfig::builder().initial_nodes(3).build().unwrap();
        assert_eq!(16, config.initial_nodes);
    }

    #[test]
    fn cache_ratio_rounds_up_to_power_of_two() {
        let config = ManagerConfig::builder().cache_ratio(10).build().unwrap();
        assert_eq!(16, config.cache_ratio);
    }
}
