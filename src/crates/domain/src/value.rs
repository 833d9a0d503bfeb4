use std::fmt::{self, Display};

// Helper macro to define string-backed identifier newtypes and common trait impls
macro_rules! define_id {
    ($name:ident $(, $extra:ident)*) => {
        #[derive(Debug, Clone, PartialEq, Eq $(, $extra)*)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// Web 会话标识（cookie 中携带）
define_id!(SessionId, Hash);
// 曲库中的艺人 ID
define_id!(CatalogArtistId);
// 曲库中的用户 ID
define_id!(CatalogUserId);
// 曲库中的播放列表 ID
define_id!(CatalogPlaylistId);
// 曲目 URI，例如 spotify:track:xxxx
define_id!(TrackUri);
