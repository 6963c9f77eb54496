//! Detector settings, read from `QUERYSHAPE_*` environment variables.

pub const ENV_LOG_NEW_SHAPES: &str = "QUERYSHAPE_LOG_NEW_SHAPES";
pub const ENV_WARN_SHAPES: &str = "QUERYSHAPE_WARN_SHAPES";

pub const DEFAULT_WARN_SHAPES: usize = 10_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Emit a `debug` event for every newly registered shape.
    pub log_new_shapes: bool,
    /// Cache size at which a single `warn` event is emitted.  The cache is
    /// never evicted; this only flags shape cardinality that tracks user
    /// input instead of call sites.
    pub warn_shapes: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            log_new_shapes: true,
            warn_shapes: DEFAULT_WARN_SHAPES,
        }
    }
}

impl DetectorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_new_shapes: parse_flag(
                std::env::var(ENV_LOG_NEW_SHAPES).ok().as_deref(),
                defaults.log_new_shapes,
            ),
            warn_shapes: parse_limit(
                std::env::var(ENV_WARN_SHAPES).ok().as_deref(),
                defaults.warn_shapes,
            ),
        }
    }
}

pub fn parse_flag(raw: Option<&str>, default: bool) -> bool {
    match raw {
        Some(val) => {
            let v = val.trim().to_lowercase();
            match v.as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => default,
            }
        }
        None => default,
    }
}

pub fn parse_limit(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|val| val.trim().parse::<usize>().ok())
        .map_or(default, |limit| limit.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("on"), false));
        assert!(parse_flag(Some(" TRUE "), false));
        assert!(!parse_flag(Some("0"), true));
        assert!(!parse_flag(Some("off"), true));
        assert!(parse_flag(Some("maybe"), true));
        assert!(!parse_flag(None, false));
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(Some("250"), 10), 250);
        assert_eq!(parse_limit(Some("0"), 10), 1);
        assert_eq!(parse_limit(Some("-3"), 10), 10);
        assert_eq!(parse_limit(Some("lots"), 10), 10);
        assert_eq!(parse_limit(None, 10), 10);
    }

    #[test]
    fn test_defaults() {
        let config = DetectorConfig::default();
        assert!(config.log_new_shapes);
        assert_eq!(config.warn_shapes, DEFAULT_WARN_SHAPES);
    }
}
