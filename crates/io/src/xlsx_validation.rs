//! XLSX data validation import/export.
//!
//! Import reads `<dataValidation>` elements from a worksheet part into
//! [`ValidationRule`]s. Export turns a rule back into a rust_xlsxwriter
//! `DataValidation`. Formulas pass through as text in both directions.
//!
//! ## Key gotchas
//! - Excel's `showDropDown="1"` means HIDE the dropdown (inverted from `show_dropdown`)
//! - Excel's `allowBlank="1"` maps to `ignore_blank: true`

use log::warn;
use quick_xml::events::Event;
use quick_xml::Reader;
use rust_xlsxwriter::{
    DataValidation, DataValidationErrorStyle, DataValidationRule, Formula, XlsxError,
};
use sheetsplit_engine::range::CellRange;
use sheetsplit_engine::validation::{
    ComparisonOperator, ErrorStyle, ValidationRule, ValidationType,
};

use crate::error::LoadError;
use crate::xlsx_package::{attr_bool, attr_string, TextCollector};

// ============================================================================
// Import: worksheet XML -> ValidationRule
// ============================================================================

/// Parse every `<dataValidation>` in a worksheet part, in document order.
/// Rules without a usable sqref, or missing a formula their type requires,
/// are skipped with a warning.
pub fn parse_validations_from_xml(xml: &str, part: &str) -> Result<Vec<ValidationRule>, LoadError> {
    // No trim_text: leading/trailing spaces inside formulas are significant
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut rules = Vec::new();
    let mut current: Option<(ValidationRule, String)> = None;
    let mut in_formula: Option<u8> = None;
    let mut text = TextCollector::default();

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(e) => return Err(LoadError::xml(part, e)),
        };
        match &event {
            Event::Start(e) if e.name().as_ref() == b"dataValidation" => {
                current = Some(rule_from_attrs(e));
            }
            Event::Empty(e) if e.name().as_ref() == b"dataValidation" => {
                let (rule, sqref) = rule_from_attrs(e);
                push_rule(&mut rules, rule, &sqref);
            }
            Event::Start(e) if current.is_some() && e.name().as_ref() == b"formula1" => {
                in_formula = Some(1);
                text.take();
            }
            Event::Start(e) if current.is_some() && e.name().as_ref() == b"formula2" => {
                in_formula = Some(2);
                text.take();
            }
            Event::Text(_) | Event::CData(_) | Event::GeneralRef(_) if in_formula.is_some() => {
                text.push(&event);
            }
            Event::End(e) if e.name().as_ref() == b"formula1" || e.name().as_ref() == b"formula2" => {
                if let (Some(which), Some((rule, _))) = (in_formula.take(), current.as_mut()) {
                    let formula = text.take();
                    if which == 1 {
                        rule.formula1 = Some(formula);
                    } else {
                        rule.formula2 = Some(formula);
                    }
                }
            }
            Event::End(e) if e.name().as_ref() == b"dataValidation" => {
                if let Some((rule, sqref)) = current.take() {
                    push_rule(&mut rules, rule, &sqref);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rules)
}

fn push_rule(rules: &mut Vec<ValidationRule>, mut rule: ValidationRule, sqref: &str) {
    rule.ranges = CellRange::parse_sqref(sqref);
    if rule.ranges.is_empty() {
        warn!("data validation with unusable sqref '{}' skipped", sqref);
        return;
    }
    if rule.rule_type != ValidationType::AnyValue && rule.formula1.is_none() {
        warn!("{:?} validation on {} has no formula1, skipped", rule.rule_type, sqref);
        return;
    }
    rules.push(rule);
}

/// Read the attributes of a `<dataValidation>` element. Returns the rule and
/// its raw sqref.
fn rule_from_attrs(e: &quick_xml::events::BytesStart) -> (ValidationRule, String) {
    let mut rule = ValidationRule {
        // Absent showDropDown means the arrow is shown
        show_dropdown: true,
        ..ValidationRule::default()
    };
    let mut sqref = String::new();

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"type" => rule.rule_type = ValidationType::from_xml(&attr_string(&attr)),
            b"operator" => rule.operator = ComparisonOperator::from_xml(&attr_string(&attr)),
            b"allowBlank" => rule.ignore_blank = attr_bool(&attr),
            // INVERTED: "1" hides the arrow
            b"showDropDown" => rule.show_dropdown = !attr_bool(&attr),
            b"showInputMessage" => rule.show_input_message = attr_bool(&attr),
            b"showErrorMessage" => rule.show_error_message = attr_bool(&attr),
            b"errorStyle" => rule.error_alert.style = ErrorStyle::from_xml(&attr_string(&attr)),
            b"errorTitle" => rule.error_alert.title = Some(attr_string(&attr)),
            b"error" => rule.error_alert.message = Some(attr_string(&attr)),
            b"promptTitle" => rule.input_message.title = Some(attr_string(&attr)),
            b"prompt" => rule.input_message.message = Some(attr_string(&attr)),
            b"sqref" => sqref = attr_string(&attr),
            _ => {}
        }
    }

    (rule, sqref)
}

// ============================================================================
// Export: ValidationRule -> rust_xlsxwriter
// ============================================================================

/// Convert a rule to a rust_xlsxwriter DataValidation. Type, operator,
/// formulas and UI flags are carried unchanged. Ranges are applied by the
/// caller through `Worksheet::add_data_validation`.
pub fn rule_to_xlsx(rule: &ValidationRule) -> Result<DataValidation, XlsxError> {
    let formula1 = || Formula::new(rule.formula1.as_deref().unwrap_or_default());

    let dv = DataValidation::new();
    let mut dv = match rule.rule_type {
        ValidationType::AnyValue => dv.allow_any_value(),
        ValidationType::WholeNumber => dv.allow_whole_number_formula(operator_rule(rule)),
        ValidationType::Decimal => dv.allow_decimal_number_formula(operator_rule(rule)),
        ValidationType::Date => dv.allow_date_formula(operator_rule(rule)),
        ValidationType::Time => dv.allow_time_formula(operator_rule(rule)),
        ValidationType::TextLength => dv.allow_text_length_formula(operator_rule(rule)),
        ValidationType::List => dv.allow_list_formula(formula1()),
        ValidationType::Custom => dv.allow_custom(formula1()),
    };

    dv = dv
        .ignore_blank(rule.ignore_blank)
        .show_input_message(rule.show_input_message)
        .show_error_message(rule.show_error_message);

    // rust_xlsxwriter writes showDropDown="1" when told not to show it
    if rule.rule_type == ValidationType::List {
        dv = dv.show_dropdown(rule.show_dropdown);
    }

    if let Some(title) = non_empty(&rule.input_message.title) {
        dv = dv.set_input_title(title)?;
    }
    if let Some(message) = non_empty(&rule.input_message.message) {
        dv = dv.set_input_message(message)?;
    }
    if let Some(title) = non_empty(&rule.error_alert.title) {
        dv = dv.set_error_title(title)?;
    }
    if let Some(message) = non_empty(&rule.error_alert.message) {
        dv = dv.set_error_message(message)?;
    }

    dv = match rule.error_alert.style {
        ErrorStyle::Stop => dv.set_error_style(DataValidationErrorStyle::Stop),
        ErrorStyle::Warning => dv.set_error_style(DataValidationErrorStyle::Warning),
        ErrorStyle::Information => dv.set_error_style(DataValidationErrorStyle::Information),
    };

    Ok(dv)
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

/// Operator + formula operands as a DataValidationRule<Formula>.
fn operator_rule(rule: &ValidationRule) -> DataValidationRule<Formula> {
    let v1 = Formula::new(rule.formula1.as_deref().unwrap_or_default());
    let v2 = rule.formula2.as_deref().map(|f| Formula::new(f)).unwrap_or_else(|| v1.clone());

    match rule.operator {
        ComparisonOperator::Between => DataValidationRule::Between(v1, v2),
        ComparisonOperator::NotBetween => DataValidationRule::NotBetween(v1, v2),
        ComparisonOperator::EqualTo => DataValidationRule::EqualTo(v1),
        ComparisonOperator::NotEqualTo => DataValidationRule::NotEqualTo(v1),
        ComparisonOperator::GreaterThan => DataValidationRule::GreaterThan(v1),
        ComparisonOperator::LessThan => DataValidationRule::LessThan(v1),
        ComparisonOperator::GreaterThanOrEqual => DataValidationRule::GreaterThanOrEqualTo(v1),
        ComparisonOperator::LessThanOrEqual => DataValidationRule::LessThanOrEqualTo(v1),
    }
}
