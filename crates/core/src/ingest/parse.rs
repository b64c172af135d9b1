//! Typed readers for raw JSON documents.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::IngestError;
use crate::reconciliation::{A07Entry, CodeAnnotation, MappingRule, TrialBalanceEntry};
use crate::sampling::{SamplingConfiguration, SamplingMethod, Transaction};

const METHODS: [SamplingMethod; 3] = [
    SamplingMethod::SimpleRandom,
    SamplingMethod::Stratified,
    SamplingMethod::MonetaryUnit,
];

/// Inputs of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationInput {
    /// A07 declaration rows.
    pub a07: Vec<A07Entry>,
    /// Trial-balance rows.
    pub trial_balance: Vec<TrialBalanceEntry>,
    /// Account-to-code rules.
    pub mapping_rules: Vec<MappingRule>,
    /// Reviewer annotations keyed by code.
    pub annotations: BTreeMap<String, CodeAnnotation>,
}

impl ReconciliationInput {
    /// Reads `{"a07": [...], "trialBalance": [...], "mappingRules": [...], "annotations": {...}}`.
    ///
    /// Absent or `null` sections are empty.
    pub fn from_json(text: &str) -> Result<Self, IngestError> {
        let root: Value = serde_json::from_str(text)?;
        Ok(Self {
            a07: parse_rows(field(&root, &["a07", "a07Data", "a07_data"]), "a07")?,
            trial_balance: parse_rows(
                field(&root, &["trialBalance", "trial_balance", "trialBalanceData"]),
                "trial_balance",
            )?,
            mapping_rules: parse_rows(
                field(&root, &["mappingRules", "mapping_rules"]),
                "mapping_rules",
            )?,
            annotations: parse_annotations(field(&root, &["annotations"]))?,
        })
    }
}

/// Inputs of one sampling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingInput {
    /// Population.
    pub transactions: Vec<Transaction>,
    /// Method and its parameters.
    pub config: SamplingConfiguration,
    /// Seed, when the caller wants a reproducible draw.
    pub seed: Option<u64>,
}

impl SamplingInput {
    /// Reads `{"transactions": [...], "config": {"method": ...}, "seed": 42}`.
    pub fn from_json(text: &str) -> Result<Self, IngestError> {
        let root: Value = serde_json::from_str(text)?;
        let config = field(&root, &["config", "configuration"]).ok_or(IngestError::MissingMethod)?;
        Ok(Self {
            transactions: parse_rows(field(&root, &["transactions"]), "transactions")?,
            config: parse_sampling_configuration(config)?,
            seed: field(&root, &["seed"]).and_then(Value::as_u64),
        })
    }
}

/// Reads a JSON array of rows; `null` or absent is empty.
pub fn parse_rows<T: DeserializeOwned>(
    value: Option<&Value>,
    collection: &'static str,
) -> Result<Vec<T>, IngestError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(rows)) => rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                T::deserialize(row).map_err(|source| IngestError::InvalidRow {
                    collection,
                    index,
                    source,
                })
            })
            .collect(),
        Some(_) => Err(IngestError::ExpectedArray { collection }),
    }
}

/// Reads transactions from a JSON document holding an array.
pub fn parse_transactions(text: &str) -> Result<Vec<Transaction>, IngestError> {
    let root: Value = serde_json::from_str(text)?;
    parse_rows(Some(&root), "transactions")
}

/// Reads trial-balance rows from a JSON document holding an array.
pub fn parse_trial_balance(text: &str) -> Result<Vec<TrialBalanceEntry>, IngestError> {
    let root: Value = serde_json::from_str(text)?;
    parse_rows(Some(&root), "trial_balance")
}

/// Reads A07 rows from a JSON document holding an array.
pub fn parse_a07(text: &str) -> Result<Vec<A07Entry>, IngestError> {
    let root: Value = serde_json::from_str(text)?;
    parse_rows(Some(&root), "a07")
}

/// Reads mapping rules from a JSON document holding an array.
pub fn parse_mapping_rules(text: &str) -> Result<Vec<MappingRule>, IngestError> {
    let root: Value = serde_json::from_str(text)?;
    parse_rows(Some(&root), "mapping_rules")
}

/// Reads annotations keyed by code; `null` or absent is empty.
pub fn parse_annotations(
    value: Option<&Value>,
) -> Result<BTreeMap<String, CodeAnnotation>, IngestError> {
    match value {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Object(entries)) => entries
            .iter()
            .enumerate()
            .map(|(index, (code, raw))| {
                CodeAnnotation::deserialize(raw)
                    .map(|annotation| (code.clone(), annotation))
                    .map_err(|source| IngestError::InvalidRow {
                        collection: "annotations",
                        index,
                        source,
                    })
            })
            .collect(),
        Some(_) => Err(IngestError::ExpectedObject {
            section: "annotations",
        }),
    }
}

/// Reads a tagged sampling configuration.
///
/// The method tag is checked first so an unknown method reports its name.
pub fn parse_sampling_configuration(value: &Value) -> Result<SamplingConfiguration, IngestError> {
    let Value::Object(map) = value else {
        return Err(IngestError::ExpectedObject { section: "config" });
    };
    let method = map
        .get("method")
        .and_then(Value::as_str)
        .ok_or(IngestError::MissingMethod)?;
    if !METHODS.iter().any(|m| m.as_str() == method) {
        return Err(IngestError::UnknownMethod(method.to_string()));
    }
    Ok(SamplingConfiguration::deserialize(value)?)
}

fn field<'a>(root: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| root.get(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reconciliation_input_missing_sections() {
        let input = ReconciliationInput::from_json(r#"{"a07": null}"#).unwrap();
        assert_eq!(input, ReconciliationInput::default());
    }

    #[test]
    fn test_reconciliation_input_full() {
        let input = ReconciliationInput::from_json(
            r#"{
                "a07Data": [{"code": "FP", "description": "Feriepenger", "amount": "119 995"}],
                "trialBalance": [{"accountNumber": "5000", "name": "Lønn", "balance": 120000}],
                "mappingRules": [{"sourceAccount": "5000", "targetCode": "FP"}],
                "annotations": {"FP": {"note": "Sjekket"}}
            }"#,
        )
        .unwrap();
        assert_eq!(input.a07[0].amount, Some(dec!(119995)));
        assert_eq!(input.trial_balance[0].balance, Some(dec!(120000)));
        assert_eq!(input.mapping_rules[0].target_code, "FP");
        assert_eq!(input.annotations["FP"].note.as_deref(), Some("Sjekket"));
    }

    #[test]
    fn test_wrong_collection_type() {
        let err = ReconciliationInput::from_json(r#"{"trialBalance": {"5000": 1}}"#).unwrap_err();
        assert!(matches!(
            err,
            IngestError::ExpectedArray {
                collection: "trial_balance"
            }
        ));
    }

    #[test]
    fn test_invalid_row_reports_index() {
        let err = parse_a07(r#"[{"code": "FP"}, {"amount": 5}]"#).unwrap_err();
        assert!(matches!(
            err,
            IngestError::InvalidRow {
                collection: "a07",
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_garbage_amounts_are_missing() {
        let rows = parse_transactions(
            r#"[
                {"id": "1", "netAmount": "abc"},
                {"id": "2", "netAmount": null},
                {"id": "3"},
                {"id": "4", "netAmount": "-1 250,50"}
            ]"#,
        )
        .unwrap();
        assert_eq!(rows[0].net_amount, None);
        assert_eq!(rows[1].net_amount, None);
        assert_eq!(rows[2].net_amount, None);
        assert_eq!(rows[3].net_amount, Some(dec!(-1250.50)));
    }

    #[test]
    fn test_sampling_input() {
        let input = SamplingInput::from_json(
            r#"{
                "transactions": [{"id": "T1", "netAmount": 100}],
                "config": {"method": "stratified", "coverageTargetPercent": 80},
                "seed": 42
            }"#,
        )
        .unwrap();
        assert_eq!(input.transactions.len(), 1);
        assert_eq!(
            input.config,
            SamplingConfiguration::Stratified {
                coverage_target_percent: Decimal::from(80)
            }
        );
        assert_eq!(input.seed, Some(42));
    }

    #[test]
    fn test_unknown_method() {
        let value = serde_json::json!({"method": "judgmental"});
        assert!(matches!(
            parse_sampling_configuration(&value),
            Err(IngestError::UnknownMethod(m)) if m == "judgmental"
        ));
        let value = serde_json::json!({"sample_size": 5});
        assert!(matches!(
            parse_sampling_configuration(&value),
            Err(IngestError::MissingMethod)
        ));
    }

    #[test]
    fn test_missing_method_parameter() {
        let value = serde_json::json!({"method": "simple_random"});
        assert!(matches!(
            parse_sampling_configuration(&value),
            Err(IngestError::Json(_))
        ));
    }

    #[test]
    fn test_annotations_must_be_object() {
        let value = serde_json::json!([1, 2]);
        assert!(matches!(
            parse_annotations(Some(&value)),
            Err(IngestError::ExpectedObject {
                section: "annotations"
            })
        ));
    }
}
