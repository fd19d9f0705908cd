// Sun Oct 18 2026 - Alex

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub nesting_threshold: usize,
    pub summary_order: Vec<String>,
    pub grouped_sections: Vec<String>,
    pub pointer_size: usize,
    /// Bits per constant pool entry in the shape description.
    pub cp_description_bits: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nesting_threshold: 1,
            summary_order: [
                "romHeader",
                "constantPool",
                "interfacesSRPs",
                "innerClassesSRPs",
                "enclosedInnerClassesSRPs",
                "cpNamesAndSignaturesSRPs",
                "methods",
                "methodDebugInfos",
                "fields",
                "cpShapeDescription",
                "optionalInfo",
                "varHandleMethodTypeLookupTable",
                "staticSplitMethodRefIndexes",
                "specialSplitMethodRefIndexes",
                "intermediateClassDataSection",
                "UTF8",
                "padding",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            grouped_sections: vec!["methodDebugInfo".to_string()],
            pointer_size: 8,
            cp_description_bits: 4,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    pub fn with_nesting_threshold(mut self, threshold: usize) -> Self {
        self.nesting_threshold = threshold;
        self
    }

    pub fn with_summary_order(mut self, order: Vec<String>) -> Self {
        self.summary_order = order;
        self
    }

    pub fn with_grouped_sections(mut self, sections: Vec<String>) -> Self {
        self.grouped_sections = sections;
        self
    }

    pub fn with_pointer_size(mut self, pointer_size: usize) -> Self {
        self.pointer_size = pointer_size;
        self
    }

    pub fn with_cp_description_bits(mut self, bits: u64) -> Self {
        self.cp_description_bits = bits;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.pointer_size != 4 && self.pointer_size != 8 {
            return Err(format!("pointer_size must be 4 or 8, got {}", self.pointer_size));
        }
        if self.cp_description_bits != 4 && self.cp_description_bits != 8 {
            return Err(format!("cp_description_bits must be 4 or 8, got {}", self.cp_description_bits));
        }
        if self.grouped_sections.iter().any(|s| s.is_empty()) {
            return Err("grouped_sections must not contain empty names".to_string());
        }
        Ok(())
    }
}
