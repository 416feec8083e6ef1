use crate::core::coercer::{coerce, CoercionRules};
use crate::core::validator::{strip_unknown, validate, validate_items};
use crate::domain::model::{Normalized, OutputRecord, OutputSchema, RawRecord, Tier};
use std::fmt;
use std::sync::Arc;

pub type ViabilityPredicate = Arc<dyn Fn(&OutputRecord) -> bool + Send + Sync>;

/// 三層逐步降級的正規化器：strict → coerced → filtered。
///
/// 回傳型別沒有錯誤分支；失敗資訊只進日誌。
#[derive(Clone)]
pub struct TieredNormalizer {
    name: &'static str,
    schema: OutputSchema,
    rules: CoercionRules,
    viability: ViabilityPredicate,
}

impl TieredNormalizer {
    pub fn new<P>(name: &'static str, schema: OutputSchema, rules: CoercionRules, viability: P) -> Self
    where
        P: Fn(&OutputRecord) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            schema,
            rules,
            viability: Arc::new(viability),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn schema(&self) -> &OutputSchema {
        &self.schema
    }

    pub fn normalize(&self, raw_items: Vec<RawRecord>) -> Vec<OutputRecord> {
        self.normalize_with_report(raw_items).items
    }

    pub fn normalize_with_report(&self, raw_items: Vec<RawRecord>) -> Normalized {
        let span = tracing::info_span!("normalize", normalizer = self.name);
        let _enter = span.enter();
        let total = raw_items.len();

        // Tier 1: 原樣驗證
        match validate_items(raw_items.iter().map(|raw| &raw.0), &self.schema) {
            Ok(()) => {
                tracing::debug!("✅ all {} items passed strict validation", total);
                let items = raw_items
                    .into_iter()
                    .filter_map(RawRecord::into_object)
                    .map(|obj| OutputRecord::new(strip_unknown(obj, &self.schema)))
                    .collect();
                return Normalized {
                    items,
                    tier: Tier::Strict,
                };
            }
            Err(failures) => {
                tracing::warn!(
                    "⚠️ {}/{} items failed strict validation, coercing all items",
                    failures.len(),
                    total
                );
                for failure in &failures {
                    for violation in &failure.violations {
                        tracing::debug!("🔍 item {}: {}", failure.index, violation);
                    }
                }
            }
        }

        // Tier 2: 對每一筆（不只失敗的）套用 coercion
        let candidates: Vec<OutputRecord> = raw_items
            .iter()
            .map(|raw| coerce(raw, &self.schema, &self.rules))
            .collect();

        let candidate_values: Vec<serde_json::Value> = candidates
            .iter()
            .map(|record| serde_json::Value::Object(record.data.clone()))
            .collect();

        let failures = match validate_items(&candidate_values, &self.schema) {
            Ok(()) => {
                tracing::info!("🔧 coerced {} items into schema", total);
                return Normalized {
                    items: candidates,
                    tier: Tier::Coerced,
                };
            }
            Err(failures) => failures,
        };

        tracing::warn!(
            "⚠️ {}/{} items still invalid after coercion, filtering",
            failures.len(),
            total
        );

        // Tier 3: 只留下通過 viability 且符合 schema 的項目
        let items: Vec<OutputRecord> = candidates
            .into_iter()
            .zip(candidate_values.iter())
            .enumerate()
            .filter_map(|(index, (record, value))| {
                if !(self.viability)(&record) {
                    tracing::debug!("🗑️ dropping item {} (not viable)", index);
                    return None;
                }
                if let Err(violations) = validate(value, &self.schema) {
                    tracing::debug!(
                        "🗑️ dropping item {} ({} violations remain)",
                        index,
                        violations.len()
                    );
                    return None;
                }
                Some(record)
            })
            .collect();

        let dropped = total - items.len();
        tracing::warn!("🗑️ kept {} items, dropped {}", items.len(), dropped);

        Normalized {
            items,
            tier: Tier::Filtered { dropped },
        }
    }
}

impl fmt::Debug for TieredNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredNormalizer")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

/// viability 判斷用：欄位存在且為非空字串
pub fn has_non_empty(record: &OutputRecord, field: &str) -> bool {
    record.get_str(field).is_some_and(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FieldSpec, FieldType};
    use serde_json::{json, Value};
    use std::io;
    use std::sync::Mutex;

    fn listing_normalizer() -> TieredNormalizer {
        let schema = OutputSchema::new()
            .field(FieldSpec::required("url", FieldType::String).non_empty().or_default(""))
            .field(FieldSpec::required("name", FieldType::String).non_empty().or_default(""))
            .field(FieldSpec::nullable("rating", FieldType::Number))
            .field(FieldSpec::optional("price", FieldType::String))
            .passthrough();
        let rules = CoercionRules::new().pointer("price", "/fare/display");
        TieredNormalizer::new("listings", schema, rules, |record| {
            has_non_empty(record, "url") && has_non_empty(record, "name")
        })
    }

    fn raws(values: Vec<Value>) -> Vec<RawRecord> {
        values.into_iter().map(RawRecord).collect()
    }

    #[test]
    fn test_strict_tier_returns_input_unchanged() {
        let input = vec![
            json!({"url": "https://a", "name": "A", "rating": 4.0, "extra": [1, 2]}),
            json!({"url": "https://b", "name": "B"}),
        ];
        let result = listing_normalizer().normalize_with_report(raws(input.clone()));

        assert_eq!(result.tier, Tier::Strict);
        let output: Vec<Value> = result
            .items
            .iter()
            .map(|r| serde_json::to_value(r).unwrap())
            .collect();
        assert_eq!(output, input);
        // 不應該補上缺少的選填欄位
        assert!(result.items[1].get("rating").is_none());
    }

    #[test]
    fn test_coerced_tier_applies_to_every_item() {
        let input = raws(vec![
            json!({"url": "https://a", "name": "A"}),
            json!({"url": "https://b", "name": "B", "rating": "4.5", "fare": {"display": "$80"}}),
        ]);
        let result = listing_normalizer().normalize_with_report(input);

        assert_eq!(result.tier, Tier::Coerced);
        assert_eq!(result.items.len(), 2);
        // 第一筆原本合法，仍然經過 coercion（rating 補上 null）
        assert_eq!(result.items[0].get("rating"), Some(&Value::Null));
        assert_eq!(result.items[1].get("rating"), Some(&Value::Null));
        assert_eq!(result.items[1].get_str("price"), Some("$80"));
    }

    #[test]
    fn test_filtered_tier_drops_unsalvageable_items() {
        let input = raws(vec![
            json!({"url": "https://a", "name": "A"}),
            json!({"rating": 3.0}),
            json!(null),
            json!({"url": "https://c", "name": ""}),
        ]);
        let result = listing_normalizer().normalize_with_report(input);

        assert_eq!(result.tier, Tier::Filtered { dropped: 3 });
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].get_str("url"), Some("https://a"));
    }

    #[test]
    fn test_filtered_tier_can_drop_every_item() {
        let input = raws(vec![
            json!({"name": "no url"}),
            json!({"url": "https://b"}),
            json!("not a listing"),
        ]);
        let result = listing_normalizer().normalize_with_report(input);

        assert_eq!(result.tier, Tier::Filtered { dropped: 3 });
        assert!(result.items.is_empty());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_log_events_carry_normalizer_name() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            listing_normalizer().normalize(raws(vec![json!({"name": "no url"})]));
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("normalize{normalizer=\"listings\"}"), "{}", output);
        assert!(output.contains("dropping item 0"), "{}", output);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let result = listing_normalizer().normalize_with_report(Vec::new());
        assert_eq!(result.tier, Tier::Strict);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let normalizer = listing_normalizer();
        let input = raws(vec![
            json!({"url": "https://a", "name": "A", "rating": "bad"}),
            json!({"name": "no url"}),
            json!({"url": "https://c", "name": "C", "vendor": {"id": 9}}),
        ]);

        let once = normalizer.normalize(input);
        let again = normalizer.normalize_with_report(once.iter().cloned().map(RawRecord::from).collect());

        assert_eq!(again.tier, Tier::Strict);
        assert_eq!(again.items, once);
    }

    #[test]
    fn test_output_never_longer_than_input_and_always_valid() {
        let normalizer = listing_normalizer();
        let inputs = vec![
            vec![json!([]), json!("x"), json!({"url": 1, "name": 2})],
            vec![json!({"url": "https://a", "name": "A", "rating": true})],
            vec![json!({"url": "https://a"}), json!({"name": "B"})],
        ];

        for input in inputs {
            let len = input.len();
            let output = normalizer.normalize(raws(input));
            assert!(output.len() <= len);
            for record in &output {
                let value = serde_json::to_value(record).unwrap();
                assert!(validate(&value, normalizer.schema()).is_ok());
            }
        }
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let normalizer = listing_normalizer();
        let input = raws(vec![
            json!({"url": "https://a", "name": "A", "rating": "x", "fare": {"display": "$1"}}),
            json!({"url": "", "name": "B"}),
        ]);
        assert_eq!(normalizer.normalize(input.clone()), normalizer.normalize(input));
    }

    #[test]
    fn test_strict_tier_strips_unknown_fields_without_passthrough() {
        let schema = OutputSchema::new().field(FieldSpec::required("title", FieldType::String));
        let normalizer = TieredNormalizer::new("titles", schema, CoercionRules::new(), |_| true);

        let output = normalizer.normalize(raws(vec![json!({"title": "Paris", "rank": 3})]));
        assert_eq!(serde_json::to_value(&output[0]).unwrap(), json!({"title": "Paris"}));
    }
}
