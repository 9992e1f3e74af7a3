//! Error types for urakawa operations.

use thiserror::Error;

/// Errors returned by [`FilterNavigator`](crate::navigation::FilterNavigator) queries.
///
/// A node that cannot be found below its own filtered parent is not an error
/// value: it means the tree changed during a query or the handle came from
/// another tree, and the navigator panics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// The node handle does not belong to the navigated tree.
    #[error("node {0} is not part of the tree")]
    UnknownNode(String),

    /// A filtered child index past the end of the filtered children.
    #[error("child index {index} is out of bounds (filtered child count is {count})")]
    IndexOutOfBounds { index: usize, count: usize },
}

/// Errors that can occur while building or navigating documents.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavError),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_error_messages() {
        let err = NavError::IndexOutOfBounds { index: 4, count: 4 };
        assert_eq!(
            err.to_string(),
            "child index 4 is out of bounds (filtered child count is 4)"
        );

        let err = NavError::UnknownNode("NodeId(9)".to_string());
        assert_eq!(err.to_string(), "node NodeId(9) is not part of the tree");
    }

    #[test]
    fn test_nav_error_converts_to_crate_error() {
        let err: Error = NavError::UnknownNode("NodeId(1)".to_string()).into();
        assert!(matches!(err, Error::Navigation(NavError::UnknownNode(_))));
    }
}
