//! The recorded observation bundle replayed by the fake environments.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::env::EnvError;

const POV_KEY: &str = "pov";
const INVENTORY_KEY: &str = "inventory";
const METADATA_KEY: &str = "metadata";

/// A point-of-view image, stored row-major as `height x width x channels` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pov {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Pov {
    pub fn new(
        height: usize,
        width: usize,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, String> {
        let expected = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(channels));
        if expected != Some(data.len()) {
            return Err(format!(
                "buffer of {} bytes does not match shape {}x{}x{}",
                data.len(),
                height,
                width,
                channels
            ));
        }
        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// Parses the nested `[row][column][channel]` layout produced by numpy's `tolist()`.
    pub fn from_nested(value: &Value) -> Result<Self, String> {
        let rows = value.as_array().ok_or("pov is not an array of rows")?;
        let height = rows.len();
        let mut width = None;
        let mut channels = None;
        let mut data = Vec::new();

        for (r, row) in rows.iter().enumerate() {
            let pixels = row
                .as_array()
                .ok_or_else(|| format!("pov row {r} is not an array"))?;
            if *width.get_or_insert(pixels.len()) != pixels.len() {
                return Err(format!("pov row {r} has a different width"));
            }
            for (c, pixel) in pixels.iter().enumerate() {
                let values = pixel
                    .as_array()
                    .ok_or_else(|| format!("pov pixel ({r}, {c}) is not an array"))?;
                if *channels.get_or_insert(values.len()) != values.len() {
                    return Err(format!("pov pixel ({r}, {c}) has a different channel count"));
                }
                for v in values {
                    let byte = v
                        .as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| format!("pov pixel ({r}, {c}) holds {v}, not a byte"))?;
                    data.push(byte);
                }
            }
        }

        let width = width.unwrap_or(0);
        let channels = channels.unwrap_or(0);
        if height == 0 || width == 0 || channels == 0 {
            return Err("pov is empty".to_string());
        }
        Self::new(height, width, channels, data)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn row(&self, r: usize) -> &[u8] {
        let len = self.width * self.channels;
        &self.data[r * len..(r + 1) * len]
    }

    pub fn pixel(&self, r: usize, c: usize) -> &[u8] {
        let start = (r * self.width + c) * self.channels;
        &self.data[start..start + self.channels]
    }

    /// Reverses row order. Columns and channel data are untouched.
    pub fn flip_vertical(self) -> Self {
        let row_len = self.width * self.channels;
        if row_len == 0 {
            return self;
        }
        let data = self
            .data
            .chunks_exact(row_len)
            .rev()
            .flatten()
            .copied()
            .collect();
        Self { data, ..self }
    }
}

/// One recorded frame: the image plus every other field the simulator reported.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pov: Pov,
    metadata: Map<String, Value>,
}

impl RecordedFrame {
    pub fn load(path: &Path) -> Result<Self, EnvError> {
        let raw = fs::read_to_string(path).map_err(|e| EnvError::data_load(path, e))?;
        let record: Value = serde_json::from_str(&raw).map_err(|e| EnvError::data_load(path, e))?;
        let frame = Self::from_record(record).map_err(|reason| EnvError::data_load(path, reason))?;

        tracing::info!(
            path = %path.display(),
            shape = ?frame.pov.shape(),
            inventory = frame.inventory().len(),
            "loaded recorded frame"
        );
        Ok(frame)
    }

    /// Builds a frame from a decoded record, giving every inventory stack a
    /// `metadata` field (0 when the recording lacks one).
    pub fn from_record(record: Value) -> Result<Self, String> {
        let Value::Object(mut metadata) = record else {
            return Err("record is not an object".to_string());
        };
        let pov = metadata
            .remove(POV_KEY)
            .ok_or_else(|| format!("record has no `{POV_KEY}` field"))?;
        let pov = Pov::from_nested(&pov)?;

        let inventory = metadata
            .get_mut(INVENTORY_KEY)
            .ok_or_else(|| format!("record has no `{INVENTORY_KEY}` field"))?
            .as_array_mut()
            .ok_or_else(|| format!("`{INVENTORY_KEY}` is not an array"))?;
        for (i, stack) in inventory.iter_mut().enumerate() {
            let stack = stack
                .as_object_mut()
                .ok_or_else(|| format!("inventory entry {i} is not an object"))?;
            let value = stack.entry(METADATA_KEY).or_insert_with(|| Value::from(0));
            if value.as_i64().is_none() {
                return Err(format!("inventory entry {i} has non-integer metadata {value}"));
            }
        }

        Ok(Self { pov, metadata })
    }

    pub fn pov(&self) -> &Pov {
        &self.pov
    }

    /// Everything except the image.
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn inventory(&self) -> &[Value] {
        self.metadata
            .get(INVENTORY_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Splits off the image, leaving the metadata-only record.
    pub fn into_parts(self) -> (Pov, Map<String, Value>) {
        (self.pov, self.metadata)
    }
}
