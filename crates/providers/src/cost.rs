//! Token-usage extraction and cost estimation for metered providers.
//!
//! Estimates are logged for operational visibility only; they are never
//! persisted and never affect control flow.

use serde_json::Value;

/// Token counts reported by a provider, any of which may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageMetrics {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// Per-million-token rates for one model.
#[derive(Debug, Clone, Copy)]
pub struct TokenPricing {
    pub input_cost_per_1m_tokens: f64,
    pub output_cost_per_1m_tokens: f64,
}

/// Known per-model rates, matched by normalized model-id prefix.
const MODEL_PRICING: &[(&str, TokenPricing)] = &[
    (
        "gemini-2.5-flash-image",
        TokenPricing {
            input_cost_per_1m_tokens: 0.30,
            output_cost_per_1m_tokens: 30.00,
        },
    ),
    (
        "gemini-3-pro-image-preview",
        TokenPricing {
            input_cost_per_1m_tokens: 2.00,
            output_cost_per_1m_tokens: 120.00,
        },
    ),
];

/// Model-id prefix identifying the pro image tier.
pub const PRO_IMAGE_MODEL_PREFIX: &str = "gemini-3-pro-image-preview";

/// Lowercase the model id and strip any publisher path prefix.
pub fn normalize_model_id(model: &str) -> String {
    let normalized = model.trim().to_ascii_lowercase();
    match normalized.rsplit_once('/') {
        Some((_, tail)) => tail.to_string(),
        None => normalized,
    }
}

/// Whether the model id names the pro image tier (exact or dash-suffixed).
pub fn is_pro_image_model(model: &str) -> bool {
    let normalized = normalize_model_id(model);
    normalized == PRO_IMAGE_MODEL_PREFIX
        || normalized.starts_with(&format!("{PRO_IMAGE_MODEL_PREFIX}-"))
}

/// Look up built-in pricing for a model, prefix-matched.
pub fn pricing_for_model(model: &str) -> Option<TokenPricing> {
    let normalized = normalize_model_id(model);
    MODEL_PRICING
        .iter()
        .find(|(prefix, _)| {
            normalized == *prefix || normalized.starts_with(&format!("{prefix}-"))
        })
        .map(|(_, pricing)| *pricing)
}

fn first_u64(values: &[Option<&Value>]) -> Option<u64> {
    values.iter().flatten().find_map(|v| v.as_u64())
}

/// Pull token counts out of a response envelope. Accepts both the
/// camelCase and snake_case field spellings providers alternate between.
pub fn extract_usage(payload: &Value) -> UsageMetrics {
    let usage = payload
        .get("usageMetadata")
        .or_else(|| payload.get("usage_metadata"));
    let Some(usage) = usage.filter(|u| u.is_object()) else {
        return UsageMetrics {
            prompt_tokens: None,
            completion_tokens: None,
            total_tokens: None,
        };
    };

    let prompt_tokens = first_u64(&[
        usage.get("promptTokenCount"),
        usage.get("prompt_token_count"),
    ]);
    let completion_tokens = first_u64(&[
        usage.get("candidatesTokenCount"),
        usage.get("candidates_token_count"),
        usage.get("outputTokenCount"),
        usage.get("output_token_count"),
    ]);
    let mut total_tokens = first_u64(&[
        usage.get("totalTokenCount"),
        usage.get("total_token_count"),
    ]);
    if total_tokens.is_none() {
        if let (Some(p), Some(c)) = (prompt_tokens, completion_tokens) {
            total_tokens = Some(p + c);
        }
    }

    UsageMetrics {
        prompt_tokens,
        completion_tokens,
        total_tokens,
    }
}

/// Estimate a dollar cost from usage and per-1M-token rates.
///
/// With split prompt/completion counts, each side is billed at its own
/// rate. With only a total, the configured rates are averaged (or the
/// single configured rate applied). Returns `None` when there is
/// nothing to estimate from.
pub fn estimate_cost_usd(
    usage: UsageMetrics,
    input_cost_per_1m_tokens: f64,
    output_cost_per_1m_tokens: f64,
) -> Option<f64> {
    let input_rate = input_cost_per_1m_tokens.max(0.0);
    let output_rate = output_cost_per_1m_tokens.max(0.0);
    let has_input_rate = input_rate > 0.0;
    let has_output_rate = output_rate > 0.0;

    if let (Some(prompt), Some(completion)) = (usage.prompt_tokens, usage.completion_tokens) {
        if has_input_rate || has_output_rate {
            return Some(
                (prompt as f64 * input_rate + completion as f64 * output_rate) / 1_000_000.0,
            );
        }
    }

    if let Some(total) = usage.total_tokens {
        if has_input_rate && has_output_rate {
            return Some(total as f64 * ((input_rate + output_rate) / 2.0) / 1_000_000.0);
        }
        if has_input_rate {
            return Some(total as f64 * input_rate / 1_000_000.0);
        }
        if has_output_rate {
            return Some(total as f64 * output_rate / 1_000_000.0);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_normalization_strips_publisher_paths() {
        assert_eq!(
            normalize_model_id("publishers/google/Gemini-2.5-Flash-Image"),
            "gemini-2.5-flash-image"
        );
        assert_eq!(normalize_model_id("  grok-2-image "), "grok-2-image");
    }

    #[test]
    fn pro_tier_detection_is_prefix_based() {
        assert!(is_pro_image_model("gemini-3-pro-image-preview"));
        assert!(is_pro_image_model("gemini-3-pro-image-preview-0611"));
        assert!(!is_pro_image_model("gemini-3-pro-image-previewer"));
        assert!(!is_pro_image_model("gemini-2.5-flash-image"));
    }

    #[test]
    fn pricing_lookup_matches_prefixes() {
        let flash = pricing_for_model("gemini-2.5-flash-image-0520").unwrap();
        assert_eq!(flash.input_cost_per_1m_tokens, 0.30);
        assert!(pricing_for_model("unknown-model").is_none());
    }

    #[test]
    fn usage_extraction_handles_both_spellings() {
        let camel = json!({"usageMetadata": {
            "promptTokenCount": 1000, "candidatesTokenCount": 50
        }});
        let usage = extract_usage(&camel);
        assert_eq!(usage.prompt_tokens, Some(1000));
        assert_eq!(usage.completion_tokens, Some(50));
        // Total is synthesized from the parts.
        assert_eq!(usage.total_tokens, Some(1050));

        let snake = json!({"usage_metadata": {
            "prompt_token_count": 10, "output_token_count": 5, "total_token_count": 15
        }});
        let usage = extract_usage(&snake);
        assert_eq!(usage.prompt_tokens, Some(10));
        assert_eq!(usage.completion_tokens, Some(5));
        assert_eq!(usage.total_tokens, Some(15));

        let usage = extract_usage(&json!({}));
        assert_eq!(usage.prompt_tokens, None);
        assert_eq!(usage.total_tokens, None);
    }

    #[test]
    fn split_counts_bill_each_side_at_its_rate() {
        let usage = UsageMetrics {
            prompt_tokens: Some(1_000_000),
            completion_tokens: Some(1_000_000),
            total_tokens: Some(2_000_000),
        };
        let cost = estimate_cost_usd(usage, 0.30, 30.00).unwrap();
        assert!((cost - 30.30).abs() < 1e-9);
    }

    #[test]
    fn total_only_averages_the_rates() {
        let usage = UsageMetrics {
            prompt_tokens: None,
            completion_tokens: None,
            total_tokens: Some(2_000_000),
        };
        let cost = estimate_cost_usd(usage, 1.0, 3.0).unwrap();
        assert!((cost - 4.0).abs() < 1e-9);
        // A single configured rate applies alone.
        let cost = estimate_cost_usd(usage, 1.0, 0.0).unwrap();
        assert!((cost - 2.0).abs() < 1e-9);
    }

    #[test]
    fn no_usage_or_no_rates_yields_none() {
        let empty = UsageMetrics {
            prompt_tokens: None,
            completion_tokens: None,
            total_tokens: None,
        };
        assert!(estimate_cost_usd(empty, 1.0, 1.0).is_none());

        let usage = UsageMetrics {
            prompt_tokens: Some(10),
            completion_tokens: Some(10),
            total_tokens: Some(20),
        };
        assert!(estimate_cost_usd(usage, 0.0, 0.0).is_none());
    }
}
