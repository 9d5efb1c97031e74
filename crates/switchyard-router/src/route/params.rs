//! Parameters for URL generation
//!
//! Values are accepted either by name or positionally, in the order the
//! parameters appear in the pattern.

use std::collections::HashMap;

/// Parameter values used to expand a route pattern into a URL
///
/// # Examples
///
/// ```
/// use switchyard_router::UrlParams;
///
/// let named = UrlParams::from([("from", 1990), ("to", 1995)]);
/// assert_eq!(named.lookup("to", 1), Some("1995"));
///
/// let positional = UrlParams::positional(["1988", "1991"]);
/// assert_eq!(positional.lookup("to", 1), Some("1991"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlParams {
    Named(HashMap<String, String>),
    Positional(Vec<String>),
}

impl UrlParams {
    /// Creates positional parameters matched to capture order
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        UrlParams::Positional(values.into_iter().map(|v| v.to_string()).collect())
    }

    /// Looks up a value by name, or by position for positional parameters
    pub fn lookup(&self, name: &str, position: usize) -> Option<&str> {
        match self {
            UrlParams::Named(map) => map.get(name).map(String::as_str),
            UrlParams::Positional(values) => values.get(position).map(String::as_str),
        }
    }
}

impl Default for UrlParams {
    fn default() -> Self {
        UrlParams::Named(HashMap::new())
    }
}

impl From<()> for UrlParams {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<HashMap<String, String>> for UrlParams {
    fn from(map: HashMap<String, String>) -> Self {
        UrlParams::Named(map)
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for UrlParams
where
    K: Into<String>,
    V: ToString,
{
    fn from(pairs: [(K, V); N]) -> Self {
        UrlParams::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

impl<V: ToString> From<Vec<V>> for UrlParams {
    fn from(values: Vec<V>) -> Self {
        Self::positional(values)
    }
}
