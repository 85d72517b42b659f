//! Data validation rules as carried from the source sheet onto each batch.
//!
//! Rules are kept in their stored form: formulas stay as text and are never
//! evaluated here. Only the ranges a rule applies to may change between the
//! source sheet and a batch, and only in [`ValidationMode::Relocate`].

use serde::{Deserialize, Serialize};

use crate::range::CellRange;

// ============================================================================
// Core Types
// ============================================================================

/// The kind of value a rule accepts (`type` attribute in SpreadsheetML).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationType {
    #[default]
    AnyValue,
    WholeNumber,
    Decimal,
    List,
    Date,
    Time,
    TextLength,
    Custom,
}

impl ValidationType {
    pub fn from_xml(s: &str) -> Self {
        match s {
            "whole" => Self::WholeNumber,
            "decimal" => Self::Decimal,
            "list" => Self::List,
            "date" => Self::Date,
            "time" => Self::Time,
            "textLength" => Self::TextLength,
            "custom" => Self::Custom,
            _ => Self::AnyValue,
        }
    }

    /// Whether the rule compares against `formula1`/`formula2` with an operator.
    pub fn uses_operator(self) -> bool {
        matches!(
            self,
            Self::WholeNumber | Self::Decimal | Self::Date | Self::Time | Self::TextLength
        )
    }
}

/// Comparison operator. SpreadsheetML defaults a missing operator to `between`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[default]
    Between,
    NotBetween,
    EqualTo,
    NotEqualTo,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl ComparisonOperator {
    pub fn from_xml(s: &str) -> Self {
        match s {
            "notBetween" => Self::NotBetween,
            "equal" => Self::EqualTo,
            "notEqual" => Self::NotEqualTo,
            "greaterThan" => Self::GreaterThan,
            "lessThan" => Self::LessThan,
            "greaterThanOrEqual" => Self::GreaterThanOrEqual,
            "lessThanOrEqual" => Self::LessThanOrEqual,
            _ => Self::Between,
        }
    }

    pub fn needs_second_value(self) -> bool {
        matches!(self, Self::Between | Self::NotBetween)
    }
}

/// Severity of the alert shown when input is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorStyle {
    #[default]
    Stop,
    Warning,
    Information,
}

impl ErrorStyle {
    pub fn from_xml(s: &str) -> Self {
        match s {
            "warning" => Self::Warning,
            "information" => Self::Information,
            _ => Self::Stop,
        }
    }
}

/// Prompt shown when a validated cell is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMessage {
    pub title: Option<String>,
    pub message: Option<String>,
}

/// Alert shown when validation fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorAlert {
    pub style: ErrorStyle,
    pub title: Option<String>,
    pub message: Option<String>,
}

/// A validation rule and the ranges it applies to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub rule_type: ValidationType,
    pub operator: ComparisonOperator,
    /// First formula as stored (no leading '='). For lists: `"a,b,c"` or a range.
    pub formula1: Option<String>,
    pub formula2: Option<String>,
    /// If true, empty values are always valid (`allowBlank`).
    pub ignore_blank: bool,
    /// For List type: show the in-cell dropdown arrow.
    pub show_dropdown: bool,
    pub show_input_message: bool,
    pub show_error_message: bool,
    pub input_message: InputMessage,
    pub error_alert: ErrorAlert,
    pub ranges: Vec<CellRange>,
}

impl ValidationRule {
    pub fn new(rule_type: ValidationType) -> Self {
        Self {
            rule_type,
            show_dropdown: rule_type == ValidationType::List,
            ignore_blank: true,
            ..Self::default()
        }
    }

    /// List rule from an inline list (`"Yes,No"`) or a range formula.
    pub fn list(formula: impl Into<String>) -> Self {
        let mut rule = Self::new(ValidationType::List);
        rule.formula1 = Some(formula.into());
        rule
    }

    /// Whole-number rule with an operator and its operand formulas.
    pub fn whole_number(operator: ComparisonOperator, f1: &str, f2: Option<&str>) -> Self {
        let mut rule = Self::new(ValidationType::WholeNumber);
        rule.operator = operator;
        rule.formula1 = Some(f1.to_string());
        rule.formula2 = f2.map(str::to_string);
        rule
    }

    pub fn with_range(mut self, range: CellRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Space-separated sqref text for the rule's ranges.
    pub fn sqref(&self) -> String {
        self.ranges.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(" ")
    }

    /// Same rule, same flags and formulas, different ranges.
    pub fn with_ranges(&self, ranges: Vec<CellRange>) -> Self {
        Self { ranges, ..self.clone() }
    }
}

// ============================================================================
// Range handling per batch
// ============================================================================

/// How a rule's ranges are mapped onto a batch sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Ranges are re-applied with the source coordinates unchanged.
    #[default]
    Verbatim,
    /// Ranges are clipped to the batch's source rows and shifted to the
    /// batch's own row numbers. Rules that miss the batch are dropped.
    Relocate,
}

impl ValidationMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verbatim" => Some(Self::Verbatim),
            "relocate" => Some(Self::Relocate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Verbatim => "verbatim",
            Self::Relocate => "relocate",
        }
    }
}

/// Map one range onto a batch covering source rows `[source_start, source_end]`.
///
/// The header row keeps row 1. Data rows shift so `source_start` lands on row 2.
/// Returns the mapped pieces (zero, one or two ranges: the header part is kept
/// separate when it is not adjacent to the shifted data part).
pub fn relocate_range(range: &CellRange, source_start: u32, source_end: u32) -> Vec<CellRange> {
    let mut out = Vec::new();
    let covers_header = range.contains_row(1);
    let data = range.clip_rows(source_start, source_end).map(|clipped| {
        let shift = source_start - 2;
        CellRange::new(
            clipped.first_row - shift,
            clipped.first_col,
            clipped.last_row - shift,
            clipped.last_col,
        )
    });

    match (covers_header, data) {
        (true, Some(d)) if d.first_row == 2 => {
            out.push(CellRange::new(1, d.first_col, d.last_row, d.last_col));
        }
        (true, Some(d)) => {
            out.push(CellRange::new(1, range.first_col, 1, range.last_col));
            out.push(d);
        }
        (true, None) => out.push(CellRange::new(1, range.first_col, 1, range.last_col)),
        (false, Some(d)) => out.push(d),
        (false, None) => {}
    }
    out
}

/// Rules for one batch, plus the number of source ranges that were dropped.
pub fn rules_for_batch(
    rules: &[ValidationRule],
    mode: ValidationMode,
    source_start: u32,
    source_end: u32,
) -> (Vec<ValidationRule>, usize) {
    match mode {
        ValidationMode::Verbatim => (rules.to_vec(), 0),
        ValidationMode::Relocate => {
            let mut dropped = 0;
            let mut out = Vec::with_capacity(rules.len());
            for rule in rules {
                let mut ranges = Vec::new();
                for range in &rule.ranges {
                    let mapped = relocate_range(range, source_start, source_end);
                    if mapped.is_empty() {
                        dropped += 1;
                    }
                    ranges.extend(mapped);
                }
                if !ranges.is_empty() {
                    out.push(rule.with_ranges(ranges));
                }
            }
            (out, dropped)
        }
    }
}
