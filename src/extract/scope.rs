//! Field scopes: where a field's element lives relative to its container

use crate::ConfigError;
use scraper::{ElementRef, Selector};

const SELF_SCOPE: &str = ":scope";

/// Location of a field's element relative to a matched container
#[derive(Debug, Clone)]
pub enum FieldScope {
    /// The container element itself (`:scope`)
    Container,
    /// First descendant matching the selector
    Descendant(Selector),
    /// Nearest ancestor matching the selector (`closest(<css>)`)
    Ancestor(Selector),
}

impl FieldScope {
    /// Parses a field rule from its configuration form
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_harvest::extract::FieldScope;
    ///
    /// assert!(matches!(FieldScope::parse(":scope"), Ok(FieldScope::Container)));
    /// assert!(matches!(FieldScope::parse("closest(a)"), Ok(FieldScope::Ancestor(_))));
    /// assert!(matches!(FieldScope::parse("h2 a"), Ok(FieldScope::Descendant(_))));
    /// ```
    pub fn parse(rule: &str) -> Result<Self, ConfigError> {
        let rule = rule.trim();

        if rule == SELF_SCOPE {
            return Ok(Self::Container);
        }

        if let Some(inner) = rule
            .strip_prefix("closest(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return compile(inner.trim()).map(Self::Ancestor);
        }

        compile(rule).map(Self::Descendant)
    }

    /// Finds this field's element for the given container
    pub fn locate<'a>(&self, container: ElementRef<'a>) -> Option<ElementRef<'a>> {
        match self {
            Self::Container => Some(container),
            Self::Descendant(selector) => container.select(selector).next(),
            Self::Ancestor(selector) => container
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|element| selector.matches(element)),
        }
    }
}

/// Compiles a CSS selector, reporting the offending text on failure
pub(crate) fn compile(selector: &str) -> Result<Selector, ConfigError> {
    if selector.is_empty() {
        return Err(ConfigError::InvalidSelector(
            "selector cannot be empty".to_string(),
        ));
    }

    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}
