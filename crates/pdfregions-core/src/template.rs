//! Region templates: an ordered mapping from field label to a point-space box.
//!
//! On disk a template is a JSON object whose keys are labels and whose values
//! are `[x0, y0, x1, y1]` arrays in PDF points (top-left origin):
//!
//! ```json
//! {
//!   "alto": [310.5, 220.0, 390.25, 236.0],
//!   "medio": [310.5, 240.0, 390.25, 256.0]
//! }
//! ```

use std::io::Write;
use std::path::Path;

use serde_json::{Map, Number, Value};

use crate::capture::CaptureRow;
use crate::error::TemplateError;
use crate::geometry::BBox;
use crate::persist::write_atomic;

/// Label → rectangle mapping, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    regions: Vec<(String, BBox)>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a template from capture rows.
    ///
    /// A label seen again replaces the earlier rectangle but keeps the
    /// position where the label first appeared.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a CaptureRow>,
    {
        let mut template = Self::new();
        for row in rows {
            template.insert(row.label.clone(), row.bbox);
        }
        template
    }

    /// Set the rectangle for `label`, overwriting any previous one.
    pub fn insert(&mut self, label: impl Into<String>, bbox: BBox) {
        let label = label.into();
        match self.regions.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => slot.1 = bbox,
            None => self.regions.push((label, bbox)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&BBox> {
        self.regions
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, bbox)| bbox)
    }

    /// Iterate `(label, bbox)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BBox)> {
        self.regions.iter().map(|(l, b)| (l.as_str(), b))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Parse a template from JSON text.
    ///
    /// # Errors
    ///
    /// [`TemplateError::Malformed`] when the text is not JSON, the top level
    /// is not an object, or a value is not exactly four numbers.
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| TemplateError::malformed(format!("not valid JSON: {e}")))?;
        let Value::Object(entries) = value else {
            return Err(TemplateError::malformed(
                "expected a JSON object mapping labels to [x0, y0, x1, y1]",
            ));
        };

        let mut template = Self::new();
        for (label, value) in entries {
            let coords = value.as_array().ok_or_else(|| {
                TemplateError::malformed(format!("value for {label:?} is not an array"))
            })?;
            if coords.len() != 4 {
                return Err(TemplateError::malformed(format!(
                    "value for {label:?} has {} entries, expected 4",
                    coords.len()
                )));
            }
            let mut nums = [0.0f64; 4];
            for (slot, v) in nums.iter_mut().zip(coords) {
                *slot = v.as_f64().ok_or_else(|| {
                    TemplateError::malformed(format!("value for {label:?} contains {v}"))
                })?;
            }
            template.insert(label, BBox::new(nums[0], nums[1], nums[2], nums[3]));
        }
        Ok(template)
    }

    /// Read and parse a template file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Pretty-printed JSON, keys in insertion order, non-ASCII labels verbatim.
    pub fn to_json(&self) -> String {
        let mut map = Map::new();
        for (label, bbox) in &self.regions {
            let coords = bbox
                .to_array()
                .iter()
                .map(|&v| Number::from_f64(v).map_or(Value::Null, Value::Number))
                .collect();
            map.insert(label.clone(), Value::Array(coords));
        }
        // Serializing a Value tree cannot fail.
        serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_default()
    }

    /// Write the whole template to `path`, replacing any previous file atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TemplateError> {
        let json = self.to_json();
        write_atomic(path.as_ref(), |w| {
            w.write_all(json.as_bytes())?;
            w.write_all(b"\n")
        })?;
        Ok(())
    }
}
