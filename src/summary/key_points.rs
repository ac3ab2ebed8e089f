//! Ordinal-keyed key points that keep insertion order.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single key point with its ordinal label ("1", "2", ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPoint {
    pub ordinal: String,
    pub text: String,
}

/// Key points in presentation order. Serializes as a JSON object keyed by ordinal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPoints(Vec<KeyPoint>);

impl KeyPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number the given texts "1", "2", ... in order.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut points = Self::new();
        for text in texts {
            let ordinal = (points.len() + 1).to_string();
            points.insert(ordinal, text.into());
        }
        points
    }

    /// Insert a point. A repeated ordinal replaces the earlier text in place.
    pub fn insert(&mut self, ordinal: String, text: String) {
        match self.0.iter_mut().find(|p| p.ordinal == ordinal) {
            Some(existing) => existing.text = text,
            None => self.0.push(KeyPoint { ordinal, text }),
        }
    }

    pub fn get(&self, ordinal: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|p| p.ordinal == ordinal)
            .map(|p| p.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyPoint> {
        self.0.iter()
    }

    /// Point texts in order, without ordinals.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|p| p.text.as_str())
    }
}

impl Serialize for KeyPoints {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for point in &self.0 {
            map.serialize_entry(&point.ordinal, &point.text)?;
        }
        map.end()
    }
}

struct KeyPointsVisitor;

impl<'de> Visitor<'de> for KeyPointsVisitor {
    type Value = KeyPoints;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of ordinal to key point text")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<KeyPoints, A::Error> {
        let mut points = KeyPoints::new();
        while let Some((ordinal, text)) = access.next_entry::<String, String>()? {
            points.insert(ordinal, text);
        }
        Ok(points)
    }
}

impl<'de> Deserialize<'de> for KeyPoints {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(KeyPointsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_texts_numbers_in_order() {
        let points = KeyPoints::from_texts(["alpha", "beta", "gamma"]);
        let ordinals: Vec<&str> = points.iter().map(|p| p.ordinal.as_str()).collect();
        assert_eq!(ordinals, vec!["1", "2", "3"]);
        assert_eq!(points.get("2"), Some("beta"));
    }

    #[test]
    fn test_repeated_ordinal_replaces_in_place() {
        let mut points = KeyPoints::new();
        points.insert("1".to_string(), "first".to_string());
        points.insert("2".to_string(), "second".to_string());
        points.insert("1".to_string(), "revised".to_string());
        assert_eq!(points.len(), 2);
        assert_eq!(points.texts().collect::<Vec<_>>(), vec!["revised", "second"]);
    }

    #[test]
    fn test_serializes_with_ten_after_nine() {
        let points = KeyPoints::from_texts((1..=10).map(|i| format!("point {i}")));
        let json = serde_json::to_string(&points).unwrap();
        let nine = json.find("\"9\"").unwrap();
        let ten = json.find("\"10\"").unwrap();
        assert!(nine < ten);

        let back: KeyPoints = serde_json::from_str(&json).unwrap();
        assert_eq!(back, points);
    }
}
