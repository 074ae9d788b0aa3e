// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::{ContactPreference, StorageCondition, Urgency};

pub const REQUIRED_FIELDS_MESSAGE: &str =
    "Please fill in required fields: Sample Description and Quantity.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyFlags {
    pub hazardous: bool,
    pub flammable: bool,
    pub toxic: bool,
    pub biological: bool,
    pub air_sensitive: bool,
}

impl SafetyFlags {
    pub const LABELS: [&'static str; 5] = [
        "Hazardous materials",
        "Flammable",
        "Toxic or corrosive",
        "Biological/infectious material",
        "Air/moisture sensitive",
    ];

    pub fn labels(&self) -> Vec<&'static str> {
        [
            self.hazardous,
            self.flammable,
            self.toxic,
            self.biological,
            self.air_sensitive,
        ]
        .into_iter()
        .zip(Self::LABELS)
        .filter_map(|(set, label)| set.then_some(label))
        .collect()
    }

    pub fn toggle(&mut self, index: usize) {
        let flag = match index {
            0 => &mut self.hazardous,
            1 => &mut self.flammable,
            2 => &mut self.toxic,
            3 => &mut self.biological,
            4 => &mut self.air_sensitive,
            _ => return,
        };
        *flag = !*flag;
    }
}

/// What the researcher tells the lab about the sample before pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementsFormInput {
    pub description: String,
    pub quantity: String,
    pub storage: StorageCondition,
    pub urgency: Urgency,
    pub special_instructions: String,
    pub safety: SafetyFlags,
    pub expected_results: String,
    pub contact: ContactPreference,
}

impl Default for RequirementsFormInput {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: String::new(),
            storage: StorageCondition::RoomTemperature,
            urgency: Urgency::Standard,
            special_instructions: String::new(),
            safety: SafetyFlags::default(),
            expected_results: String::new(),
            contact: ContactPreference::Email,
        }
    }
}

impl RequirementsFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() || self.quantity.trim().is_empty() {
            bail!(REQUIRED_FIELDS_MESSAGE);
        }
        Ok(())
    }

    /// Copy with surrounding whitespace stripped from the free-text fields.
    pub fn normalized(&self) -> Self {
        Self {
            description: self.description.trim().to_owned(),
            quantity: self.quantity.trim().to_owned(),
            special_instructions: self.special_instructions.trim().to_owned(),
            expected_results: self.expected_results.trim().to_owned(),
            ..self.clone()
        }
    }
}

/// Text fields of the requirements form, in the order the form walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementsField {
    Description,
    Quantity,
    Storage,
    Urgency,
    SpecialInstructions,
    Safety,
    ExpectedResults,
    Contact,
}

impl RequirementsField {
    pub const ALL: [Self; 8] = [
        Self::Description,
        Self::Quantity,
        Self::Storage,
        Self::Urgency,
        Self::SpecialInstructions,
        Self::Safety,
        Self::ExpectedResults,
        Self::Contact,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Description => "Sample description *",
            Self::Quantity => "Quantity provided *",
            Self::Storage => "Storage conditions",
            Self::Urgency => "Urgency",
            Self::SpecialInstructions => "Special instructions",
            Self::Safety => "Safety flags",
            Self::ExpectedResults => "Expected results",
            Self::Contact => "Contact preference",
        }
    }

    pub const fn is_text(self) -> bool {
        matches!(
            self,
            Self::Description | Self::Quantity | Self::SpecialInstructions | Self::ExpectedResults
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{REQUIRED_FIELDS_MESSAGE, RequirementsFormInput, SafetyFlags};

    #[test]
    fn blank_form_fails_with_required_fields_message() {
        let error = RequirementsFormInput::default()
            .validate()
            .expect_err("blank form should fail");
        assert_eq!(error.to_string(), REQUIRED_FIELDS_MESSAGE);
    }

    #[test]
    fn whitespace_only_quantity_is_rejected() {
        let form = RequirementsFormInput {
            description: "Polymer powder".to_owned(),
            quantity: "   ".to_owned(),
            ..RequirementsFormInput::default()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn filled_form_validates_and_normalizes() {
        let form = RequirementsFormInput {
            description: "  Polymer powder ".to_owned(),
            quantity: "20 mg".to_owned(),
            ..RequirementsFormInput::default()
        };
        assert!(form.validate().is_ok());
        assert_eq!(form.normalized().description, "Polymer powder");
    }

    #[test]
    fn safety_labels_follow_flag_order() {
        let mut flags = SafetyFlags::default();
        assert!(flags.labels().is_empty());
        flags.toggle(4);
        flags.toggle(0);
        flags.toggle(9);
        assert_eq!(
            flags.labels(),
            vec!["Hazardous materials", "Air/moisture sensitive"]
        );
    }
}
