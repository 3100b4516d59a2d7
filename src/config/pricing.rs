//! Model pricing catalog
//!
//! Static table of selectable chat models with their per-1M-token prices,
//! used to derive the cost field of usage metrics

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Default chat model when the caller does not pick one
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Price of `text-embedding-3-small` per 1M tokens, USD
pub const EMBEDDING_COST_PER_MTOK: f64 = 0.02;

/// Per-1M-token prices in USD
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelPricing {
    pub input: f64,
    pub cached: f64,
    pub output: f64,
}

/// A selectable chat model
#[derive(Debug, Clone, Serialize)]
pub struct ModelProfile {
    /// Name shown to users
    pub display_name: &'static str,
    /// Name sent to the API
    pub api_name: &'static str,
    pub pricing: ModelPricing,
}

static MODEL_CATALOG: Lazy<HashMap<&'static str, ModelProfile>> = Lazy::new(|| {
    HashMap::from([
        (
            "gpt-4o-mini",
            ModelProfile {
                display_name: "GPT-4o Mini (recommended)",
                api_name: "gpt-4o-mini",
                pricing: ModelPricing { input: 0.15, cached: 0.075, output: 0.60 },
            },
        ),
        (
            "gpt-3.5-turbo",
            ModelProfile {
                display_name: "GPT-3.5 Turbo (economy)",
                api_name: "gpt-3.5-turbo",
                pricing: ModelPricing { input: 0.50, cached: 0.25, output: 1.50 },
            },
        ),
        (
            "gpt-4.1-mini",
            ModelProfile {
                display_name: "GPT-4.1 Mini",
                api_name: "gpt-4.1-mini",
                pricing: ModelPricing { input: 0.40, cached: 0.10, output: 1.60 },
            },
        ),
        (
            "gpt-4.1",
            ModelProfile {
                display_name: "GPT-4.1 (powerful)",
                api_name: "gpt-4.1",
                pricing: ModelPricing { input: 2.00, cached: 0.50, output: 8.00 },
            },
        ),
        (
            "gpt-4o",
            ModelProfile {
                display_name: "GPT-4o (most powerful)",
                api_name: "gpt-4o",
                pricing: ModelPricing { input: 5.00, cached: 2.50, output: 15.00 },
            },
        ),
    ])
});

/// Look up a model profile by id
pub fn model_profile(model: &str) -> Option<&'static ModelProfile> {
    MODEL_CATALOG.get(model)
}

/// Look up prices for a model id.
///
/// Unknown models price at zero so a run against an uncatalogued model
/// still completes with token counts intact.
pub fn pricing_for(model: &str) -> ModelPricing {
    MODEL_CATALOG
        .get(model)
        .map(|profile| profile.pricing)
        .unwrap_or(ModelPricing { input: 0.0, cached: 0.0, output: 0.0 })
}

/// Cost in USD for one call: sum of count times unit price, per million tokens
pub fn cost_usd(pricing: ModelPricing, input: u64, cached: u64, output: u64) -> f64 {
    (input as f64 * pricing.input + cached as f64 * pricing.cached + output as f64 * pricing.output)
        / 1_000_000.0
}

/// Ids of all catalogued models
pub fn available_models() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = MODEL_CATALOG.keys().copied().collect();
    ids.sort_unstable();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_contains_default_model() {
        assert!(model_profile(DEFAULT_MODEL).is_some());
        assert!(available_models().contains(&DEFAULT_MODEL));
    }

    #[test]
    fn test_cost_formula() {
        let pricing = pricing_for("gpt-4o-mini");
        // 1M input + 1M cached + 1M output at the catalog rates
        let cost = cost_usd(pricing, 1_000_000, 1_000_000, 1_000_000);
        assert!((cost - (0.15 + 0.075 + 0.60)).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_model_prices_at_zero() {
        let pricing = pricing_for("not-a-model");
        assert_eq!(cost_usd(pricing, 1000, 100, 500), 0.0);
    }
}
