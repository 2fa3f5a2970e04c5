//! Configuration access port trait.

use crate::domain::error::AlgolabError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// A numeric value, `default` when the key is absent. A value that is
    /// present but not a number is an error rather than the default.
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, AlgolabError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<f64>().map_err(|_| AlgolabError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("expected a number, got {raw:?}"),
            }),
        }
    }
}
