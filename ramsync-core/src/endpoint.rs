//! Upstream endpoint kinds.

use std::fmt;

/// A category of entity served by the upstream API.
///
/// # Examples
///
/// ```
/// use ramsync_core::EndpointKind;
///
/// assert_eq!(EndpointKind::Location.path(), "location");
/// assert_eq!(EndpointKind::ALL.len(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    /// `GET <base>/character`
    Character,
    /// `GET <base>/location`
    Location,
    /// `GET <base>/episode`
    Episode,
}

impl EndpointKind {
    /// Every endpoint kind, in fetch order.
    pub const ALL: [Self; 3] = [Self::Character, Self::Location, Self::Episode];

    /// Path segment appended to the API base URL for the first page.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Location => "location",
            Self::Episode => "episode",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
