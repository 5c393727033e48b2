/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT

NOTE: Structures and functions for handling the Shapefile attribute table info
contained with the associated .dbf file.
*/
use std::fmt;

#[derive(Debug, Default, Clone)]
pub struct AttributeHeader {
    pub version: u8,
    pub year: u32,
    pub month: u8,
    pub day: u8,
    pub num_records: u32,
    pub num_fields: u32, // not actually stored in file but derived
    pub bytes_in_header: u16,
    pub bytes_in_record: u16,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateData {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for DateData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    Int(i32),
    Int64(i64),
    Real(f64),
    Text(String),
    Date(DateData),
    Bool(bool),
    Null,
}

impl FieldData {
    pub fn is_null(&self) -> bool {
        *self == FieldData::Null
    }

    /// The value as a whole number, if it is one. Reals qualify only when
    /// they have no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldData::Int(v) => Some(*v as i64),
            FieldData::Int64(v) => Some(*v),
            FieldData::Real(v) if v.fract() == 0f64 && v.is_finite() => Some(*v as i64),
            FieldData::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn get_as_string(&self) -> String {
        match self {
            FieldData::Int(v) => v.to_string(),
            FieldData::Int64(v) => v.to_string(),
            FieldData::Real(v) => v.to_string(),
            FieldData::Text(v) => v.clone(),
            FieldData::Date(v) => v.to_string(),
            FieldData::Bool(v) => {
                if *v {
                    "T".to_string()
                } else {
                    "F".to_string()
                }
            }
            FieldData::Null => String::new(),
        }
    }
}

impl fmt::Display for FieldData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.get_as_string())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldDataType {
    Int,
    Real,
    Text,
    Date,
    Bool,
}

impl FieldDataType {
    pub fn to_char(&self) -> char {
        match self {
            FieldDataType::Int | FieldDataType::Real => 'N',
            FieldDataType::Text => 'C',
            FieldDataType::Date => 'D',
            FieldDataType::Bool => 'L',
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AttributeField {
    pub name: String,
    pub field_type: char,
    pub field_length: u8,
    pub decimal_count: u8,
}

impl AttributeField {
    pub fn new(
        name: &str,
        field_type: FieldDataType,
        field_length: u8,
        decimal_count: u8,
    ) -> AttributeField {
        let decimal_count = match field_type {
            FieldDataType::Real => decimal_count,
            _ => 0u8,
        };
        let field_length = match field_type {
            FieldDataType::Date => 8u8,
            FieldDataType::Bool => 1u8,
            _ => field_length,
        };
        AttributeField {
            name: name.to_string(),
            field_type: field_type.to_char(),
            field_length,
            decimal_count,
        }
    }

    pub fn get_data_type(&self) -> FieldDataType {
        match self.field_type {
            'N' | 'F' | 'I' | 'O' => {
                if self.decimal_count == 0 {
                    FieldDataType::Int
                } else {
                    FieldDataType::Real
                }
            }
            'D' => FieldDataType::Date,
            'L' => FieldDataType::Bool,
            _ => FieldDataType::Text,
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct ShapefileAttributes {
    pub header: AttributeHeader,
    pub fields: Vec<AttributeField>,
    data: Vec<Vec<FieldData>>,
    pub is_deleted: Vec<bool>,
}

impl ShapefileAttributes {
    pub fn add_field(&mut self, field: &AttributeField) {
        self.fields.push(field.clone());
        self.header.num_fields = self.fields.len() as u32;
        for rec in self.data.iter_mut() {
            rec.push(FieldData::Null);
        }
    }

    /// Appends a record, padding or truncating it to the field count.
    pub fn add_record(&mut self, mut rec: Vec<FieldData>, deleted: bool) {
        rec.resize(self.fields.len(), FieldData::Null);
        self.data.push(rec);
        self.is_deleted.push(deleted);
        self.header.num_records = self.data.len() as u32;
    }

    pub fn get_num_records(&self) -> usize {
        self.data.len()
    }

    pub fn get_record(&self, index: usize) -> &[FieldData] {
        match self.data.get(index) {
            Some(rec) => rec,
            None => &[],
        }
    }

    pub fn get_value(&self, record_index: usize, field_index: usize) -> FieldData {
        self.data
            .get(record_index)
            .and_then(|r| r.get(field_index))
            .cloned()
            .unwrap_or(FieldData::Null)
    }

    /// Case-insensitive lookup, as dBase field names are commonly upper case.
    pub fn get_field_num(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn is_field_numeric(&self, index: usize) -> bool {
        match self.fields.get(index) {
            Some(f) => matches!(f.field_type, 'N' | 'F' | 'I' | 'O'),
            None => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_add_field_pads_existing_records() {
        let mut atts = ShapefileAttributes::default();
        atts.add_field(&AttributeField::new("NAME", FieldDataType::Text, 20, 0));
        atts.add_record(vec![FieldData::Text("a".to_string())], false);
        atts.add_field(&AttributeField::new("Area", FieldDataType::Real, 12, 4));
        assert_eq!(atts.get_record(0).len(), 2);
        assert!(atts.get_value(0, 1).is_null());
        assert_eq!(atts.get_field_num("area"), Some(1));
        assert!(atts.is_field_numeric(1));
        assert!(atts.get_record(5).is_empty());
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(FieldData::Int(4).as_i64(), Some(4));
        assert_eq!(FieldData::Real(7.0).as_i64(), Some(7));
        assert_eq!(FieldData::Real(7.5).as_i64(), None);
        assert_eq!(FieldData::Text(" 12 ".to_string()).as_i64(), Some(12));
        assert_eq!(FieldData::Null.as_i64(), None);
    }
}
