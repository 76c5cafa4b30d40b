//! Identity resolution: find the registration code in the launch context.
//!
//! The client is launched with a URL (or just a query string) that may
//! carry `code=<token>`. [`resolve`] reads it once at startup; the result
//! is handed to the session and never re-derived.

use alertline_protocol::RegistrationToken;
use url::Url;

use crate::SessionError;

/// The query parameter that carries the registration token.
pub const CODE_PARAM: &str = "code";

/// Read-only query parameters the client was launched with.
///
/// Pairs keep their original order. When a key repeats, lookups return the
/// first value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchContext {
    params: Vec<(String, String)>,
}

impl LaunchContext {
    /// Parses an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored, so both `?code=A` and `code=A` work.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            params: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// Extracts the query parameters from an absolute URL.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidLaunchUrl`] if `url` does not parse.
    pub fn from_url(url: &str) -> Result<Self, SessionError> {
        let url = Url::parse(url)?;
        Ok(Self {
            params: url.query_pairs().into_owned().collect(),
        })
    }

    /// Builds a context from already-decoded pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the first value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the context carries no parameters at all.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Resolves the registration token from the launch context.
///
/// Returns the `code` value when the key exists, even if it is empty. When
/// the key is missing the client runs as an observer: a single warning is
/// logged and `None` is returned.
pub fn resolve(context: &LaunchContext) -> Option<RegistrationToken> {
    match context.get(CODE_PARAM) {
        Some(code) => Some(RegistrationToken::new(code)),
        None => {
            tracing::warn!(
                param = CODE_PARAM,
                "no registration code provided, alert registration will not function"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_returns_code_value() {
        let ctx = LaunchContext::from_query("?code=ABC123");
        assert_eq!(resolve(&ctx), Some(RegistrationToken::new("ABC123")));
    }

    #[test]
    fn test_resolve_empty_value_is_present() {
        assert_eq!(
            resolve(&LaunchContext::from_query("code=")),
            Some(RegistrationToken::new(""))
        );
        // A bare key counts as present with an empty value.
        assert_eq!(
            resolve(&LaunchContext::from_query("?code")),
            Some(RegistrationToken::new(""))
        );
    }

    #[test]
    fn test_resolve_missing_key_is_none() {
        assert_eq!(resolve(&LaunchContext::from_query("?other=1")), None);
        assert_eq!(resolve(&LaunchContext::default()), None);
    }

    #[test]
    fn test_query_values_are_form_decoded() {
        let ctx = LaunchContext::from_query("code=a%2Fb+c&x=1");
        assert_eq!(ctx.get("code"), Some("a/b c"));
        assert_eq!(ctx.get("x"), Some("1"));
    }

    #[test]
    fn test_first_value_wins_for_repeated_key() {
        let ctx = LaunchContext::from_query("code=first&code=second");
        assert_eq!(ctx.get("code"), Some("first"));
    }

    #[test]
    fn test_from_url_reads_query() {
        let ctx =
            LaunchContext::from_url("https://alerts.example.com/page?code=XYZ&theme=dark")
                .unwrap();
        assert_eq!(ctx.get("code"), Some("XYZ"));
        assert_eq!(ctx.get("theme"), Some("dark"));
    }

    #[test]
    fn test_from_url_without_query_is_empty() {
        let ctx = LaunchContext::from_url("https://alerts.example.com/page").unwrap();
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_from_url_rejects_relative_input() {
        let result = LaunchContext::from_url("/page?code=1");
        assert!(matches!(result, Err(SessionError::InvalidLaunchUrl(_))));
    }

    #[test]
    fn test_from_pairs() {
        let ctx = LaunchContext::from_pairs([("code", "P1")]);
        assert_eq!(ctx.get("code"), Some("P1"));
        assert_eq!(ctx.get("missing"), None);
    }
}
