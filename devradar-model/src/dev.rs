use crate::geo::Coordinates;

use std::fmt;

/// Server-assigned identity of a dev record.
///
/// The backend hands out document ids as strings; numeric ids are accepted and
/// normalised to their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DevId(String);

impl DevId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DevId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DevId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DevId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DevId {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DevId {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        struct DevIdVisitor;

        impl serde::de::Visitor<'_> for DevIdVisitor {
            type Value = DevId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer id")
            }

            fn visit_str<E: serde::de::Error>(
                self,
                value: &str,
            ) -> std::result::Result<DevId, E> {
                Ok(DevId::new(value))
            }

            fn visit_string<E: serde::de::Error>(
                self,
                value: String,
            ) -> std::result::Result<DevId, E> {
                Ok(DevId(value))
            }

            fn visit_u64<E: serde::de::Error>(
                self,
                value: u64,
            ) -> std::result::Result<DevId, E> {
                Ok(DevId(value.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(
                self,
                value: i64,
            ) -> std::result::Result<DevId, E> {
                Ok(DevId(value.to_string()))
            }
        }

        deserializer.deserialize_any(DevIdVisitor)
    }
}

#[cfg(feature = "serde")]
fn point_kind() -> String {
    GeoPoint::POINT.to_string()
}

/// GeoJSON point as stored by the backend: `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    #[cfg_attr(feature = "serde", serde(rename = "type", default = "point_kind"))]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub const POINT: &'static str = "Point";

    pub fn from_coordinates(coordinates: Coordinates) -> Self {
        Self {
            kind: Self::POINT.to_string(),
            coordinates: [coordinates.longitude, coordinates.latitude],
        }
    }
}

/// A discoverable user record returned by the proximity query or pushed by the
/// stream. Immutable once received; identity is [`Dev::id`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dev {
    #[cfg_attr(feature = "serde", serde(rename = "_id"))]
    pub id: DevId,
    #[cfg_attr(feature = "serde", serde(rename = "name", default))]
    pub display_name: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub bio: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "techs", default))]
    pub tags: Vec<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub avatar_url: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub github_username: Option<String>,
    pub location: GeoPoint,
}

impl Dev {
    pub fn new(
        id: impl Into<DevId>,
        display_name: impl Into<String>,
        at: Coordinates,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            bio: None,
            tags: Vec::new(),
            avatar_url: None,
            github_username: None,
            location: GeoPoint::from_coordinates(at),
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    pub fn with_github_username(mut self, username: impl Into<String>) -> Self {
        self.github_username = Some(username.into());
        self
    }

    /// Marker position, converted from the stored `[lon, lat]` pair.
    pub fn coordinates(&self) -> Coordinates {
        let [longitude, latitude] = self.location.coordinates;
        Coordinates {
            latitude,
            longitude,
        }
    }

    /// Tags joined the way a callout lists them.
    pub fn tags_label(&self) -> String {
        self.tags.join(", ")
    }
}

/// Body of the proximity query response.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResponse {
    #[cfg_attr(feature = "serde", serde(default))]
    pub devs: Vec<Dev>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dev {
        Dev::new("a1", "Ada", Coordinates::new(10.0, 20.0).unwrap())
            .with_tags(["go", "rust"])
    }

    #[test]
    fn coordinates_swap_wire_order() {
        let dev = sample();
        assert_eq!(dev.location.coordinates, [20.0, 10.0]);
        assert_eq!(dev.coordinates().latitude, 10.0);
        assert_eq!(dev.coordinates().longitude, 20.0);
    }

    #[test]
    fn tags_label_joins_in_order() {
        assert_eq!(sample().tags_label(), "go, rust");
    }

    #[cfg(feature = "serde")]
    mod wire {
        use super::super::*;

        #[test]
        fn decodes_backend_document() {
            let raw = r#"{
                "devs": [{
                    "_id": "5e6a1f",
                    "name": "Grace",
                    "bio": null,
                    "techs": ["ReactJS", "Node.js"],
                    "avatar_url": "https://avatars.example/u/1",
                    "github_username": "grace",
                    "location": {"type": "Point", "coordinates": [-46.6, -23.5]}
                }]
            }"#;
            let response: SearchResponse = serde_json::from_str(raw).unwrap();
            let dev = &response.devs[0];
            assert_eq!(dev.id.as_str(), "5e6a1f");
            assert_eq!(dev.display_name, "Grace");
            assert_eq!(dev.bio, None);
            assert_eq!(dev.tags, ["ReactJS", "Node.js"]);
            assert_eq!(dev.github_username.as_deref(), Some("grace"));
            assert_eq!(dev.coordinates().latitude, -23.5);
        }

        #[test]
        fn accepts_numeric_ids_and_sparse_documents() {
            let raw = r#"{"_id": 7, "location": {"coordinates": [1.0, 2.0]}}"#;
            let dev: Dev = serde_json::from_str(raw).unwrap();
            assert_eq!(dev.id, DevId::from("7"));
            assert_eq!(dev.location.kind, GeoPoint::POINT);
            assert!(dev.tags.is_empty());
            assert_eq!(dev.avatar_url, None);
        }

        #[test]
        fn missing_devs_key_is_an_empty_result() {
            let response: SearchResponse = serde_json::from_str("{}").unwrap();
            assert!(response.devs.is_empty());
        }
    }
}
