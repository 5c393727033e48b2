/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use geo::MultiPolygon;
use seamless_vector::{AttributeField, FieldData};
use std::collections::BTreeSet;
use std::fmt;

/// Stable identifier of an original input feature.
pub type OriginKey = i64;

/// A polygon feature. `attributes` is aligned with the `fields` of the
/// collection that owns it; the origin key is held apart in `key`.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub key: OriginKey,
    pub geometry: MultiPolygon<f64>,
    pub attributes: Vec<FieldData>,
}

impl Feature {
    pub fn new(key: OriginKey, geometry: MultiPolygon<f64>, attributes: Vec<FieldData>) -> Feature {
        Feature {
            key,
            geometry,
            attributes,
        }
    }
}

/// An ordered set of features sharing one attribute schema.
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub fields: Vec<AttributeField>,
    pub features: Vec<Feature>,
    /// Coordinate reference system, as the WKT found in a .prj file.
    pub projection: String,
    /// Name of the origin-key field. Empty until keys have been assigned.
    pub key_field: String,
}

impl FeatureCollection {
    pub fn new(fields: Vec<AttributeField>, projection: &str) -> FeatureCollection {
        FeatureCollection {
            fields,
            features: vec![],
            projection: projection.to_string(),
            key_field: String::new(),
        }
    }

    /// An empty collection with the same schema, projection and key field.
    pub fn empty_like(&self) -> FeatureCollection {
        FeatureCollection {
            fields: self.fields.clone(),
            features: vec![],
            projection: self.projection.clone(),
            key_field: self.key_field.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn has_keys(&self) -> bool {
        !self.key_field.is_empty()
    }

    /// Case-insensitive field lookup.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn value<'a>(&self, feature: &'a Feature, name: &str) -> Option<&'a FieldData> {
        self.field_index(name)
            .and_then(|i| feature.attributes.get(i))
    }

    /// Appends a feature, padding its attributes to the schema.
    pub fn push(&mut self, mut feature: Feature) {
        feature
            .attributes
            .resize(self.fields.len(), FieldData::Null);
        self.features.push(feature);
    }

    /// Appends a field. Existing features receive a null value.
    pub fn add_field(&mut self, field: AttributeField) {
        self.fields.push(field);
        for f in self.features.iter_mut() {
            f.attributes.push(FieldData::Null);
        }
    }

    /// Stable sort by ascending origin key. This is the iteration order
    /// every stage relies on for first-encountered semantics.
    pub fn sort_by_key(&mut self) {
        self.features.sort_by_key(|f| f.key);
    }

    pub fn keys(&self) -> BTreeSet<OriginKey> {
        self.features.iter().map(|f| f.key).collect()
    }

    /// True for a geographic coordinate system (GEOGCS with no PROJCS).
    pub fn is_geographic(&self) -> bool {
        let wkt = self.projection.to_uppercase();
        wkt.contains("GEOGCS") && !wkt.contains("PROJCS")
    }
}

/// The origin keys that contributed to a fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginSet(BTreeSet<OriginKey>);

impl OriginSet {
    pub fn new() -> OriginSet {
        OriginSet(BTreeSet::new())
    }

    pub fn from_key(key: OriginKey) -> OriginSet {
        let mut s = OriginSet::new();
        s.insert(key);
        s
    }

    pub fn insert(&mut self, key: OriginKey) -> bool {
        self.0.insert(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, key: OriginKey) -> bool {
        self.0.contains(&key)
    }

    /// The smallest key in the set.
    pub fn first(&self) -> Option<OriginKey> {
        self.0.iter().next().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OriginKey> {
        self.0.iter()
    }

    /// Whether two or more originals overlap here.
    pub fn is_merge_product(&self) -> bool {
        self.0.len() > 1
    }
}

impl Extend<OriginKey> for OriginSet {
    fn extend<I: IntoIterator<Item = OriginKey>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl fmt::Display for OriginSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s: Vec<String> = self.0.iter().map(|k| k.to_string()).collect();
        write!(f, "{}", s.join(";"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Existing,
    New,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Classification::Existing => write!(f, "EXISTING"),
            Classification::New => write!(f, "NEW"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Feature, FeatureCollection, OriginSet};
    use geo::MultiPolygon;
    use seamless_vector::{AttributeField, FieldData, FieldDataType};

    #[test]
    fn test_origin_set() {
        let mut s = OriginSet::from_key(7);
        assert!(!s.is_merge_product());
        s.extend(vec![3, 7, 12]);
        assert!(s.is_merge_product());
        assert_eq!(s.len(), 3);
        assert_eq!(s.first(), Some(3));
        assert_eq!(s.to_string(), "3;7;12");
    }

    #[test]
    fn test_collection_schema() {
        let mut fc = FeatureCollection::new(
            vec![AttributeField::new("NAME", FieldDataType::Text, 20, 0)],
            "",
        );
        fc.push(Feature::new(2, MultiPolygon::new(vec![]), vec![]));
        fc.push(Feature::new(
            1,
            MultiPolygon::new(vec![]),
            vec![FieldData::Text("a".to_string())],
        ));
        assert_eq!(fc.features[0].attributes, vec![FieldData::Null]);
        fc.add_field(AttributeField::new("DEPTH", FieldDataType::Real, 12, 3));
        assert_eq!(fc.features[1].attributes.len(), 2);
        assert_eq!(fc.field_index("depth"), Some(1));
        fc.sort_by_key();
        assert_eq!(fc.features[0].key, 1);
        assert_eq!(
            fc.value(&fc.features[0], "name"),
            Some(&FieldData::Text("a".to_string()))
        );
    }

    #[test]
    fn test_is_geographic() {
        let mut fc = FeatureCollection::default();
        fc.projection = "GEOGCS[\"GCS_WGS_1984\",DATUM[\"D_WGS_1984\"]]".to_string();
        assert!(fc.is_geographic());
        fc.projection = "PROJCS[\"WGS_1984_UTM_Zone_31N\",GEOGCS[\"GCS_WGS_1984\"]]".to_string();
        assert!(!fc.is_geographic());
    }
}
