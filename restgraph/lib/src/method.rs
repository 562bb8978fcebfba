//! HTTP verbs used by schema methods.

use strum::{Display, EnumIter, EnumString};

/// HTTP methods a schema method can declare in its `request` field.
///
/// The remote services this crate targets only publish GET and POST
/// methods; anything else is rejected when the method is compiled.
///
/// ## Examples
///
/// ```rust
/// use restgraph_lib::RestMethod;
///
/// let parsed: RestMethod = "post".parse().unwrap();
/// assert_eq!(parsed, RestMethod::Post);
/// assert!(parsed.has_body());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RestMethod {
    /// HTTP GET - read data from the resource.
    Get,
    /// HTTP POST - send data or trigger an action.
    Post,
}

impl RestMethod {
    /// Returns `true` if this method can carry a request body.
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post)
    }

    /// Converts to the equivalent `reqwest::Method`.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
        }
    }
}

impl From<RestMethod> for reqwest::Method {
    fn from(method: RestMethod) -> Self {
        method.to_reqwest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display() {
        assert_eq!(RestMethod::Get.to_string(), "GET");
        assert_eq!(RestMethod::Post.to_string(), "POST");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("GET".parse::<RestMethod>().unwrap(), RestMethod::Get);
        assert_eq!("Post".parse::<RestMethod>().unwrap(), RestMethod::Post);
        assert!("DELETE".parse::<RestMethod>().is_err());
    }

    #[test]
    fn test_has_body() {
        assert!(!RestMethod::Get.has_body());
        assert!(RestMethod::Post.has_body());
    }

    #[test]
    fn test_enum_iteration() {
        assert_eq!(RestMethod::iter().count(), 2);
    }

    #[test]
    fn test_to_reqwest() {
        assert_eq!(RestMethod::Get.to_reqwest(), reqwest::Method::GET);
        assert_eq!(reqwest::Method::from(RestMethod::Post), reqwest::Method::POST);
    }
}
