//! Cost estimation for the drafting and manager models.
//!
//! Prices are USD per million tokens. The usage log records GBP, so
//! estimates are converted with the configured exchange rate and shown
//! as approximate (`~£0.12`).

use sdr_types::config::ProviderPricing;

/// USD per million tokens, input then output.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rate {
    input: f64,
    output: f64,
}

impl Rate {
    const fn new(input: f64, output: f64) -> Self {
        Self { input, output }
    }

    fn cost(self, input_tokens: u32, output_tokens: u32) -> f64 {
        (f64::from(input_tokens) * self.input + f64::from(output_tokens) * self.output)
            / 1_000_000.0
    }
}

/// Used when neither the overrides nor the built-in table know the model.
const FALLBACK_RATE: Rate = Rate::new(5.0, 15.0);

/// `(provider, model prefix, rate)`. Longer prefixes first: `gpt-4o-mini`
/// must win over `gpt-4o`.
const BUILT_IN_RATES: &[(&str, &str, Rate)] = &[
    ("openai", "gpt-4o-mini", Rate::new(0.15, 0.60)),
    ("openai", "gpt-4o", Rate::new(2.50, 10.0)),
    ("deepseek", "deepseek-chat", Rate::new(0.27, 1.10)),
    ("gemini", "gemini-2.0-flash", Rate::new(0.10, 0.40)),
    ("groq", "llama-3.3-70b-versatile", Rate::new(0.59, 0.79)),
];

fn rate_for(model: &str, provider: &str, overrides: &[ProviderPricing]) -> Rate {
    let configured = overrides
        .iter()
        .find(|p| p.provider_name == provider && model.starts_with(&p.model_pattern))
        .map(|p| Rate::new(p.input_cost_per_million, p.output_cost_per_million));
    let built_in = || {
        BUILT_IN_RATES
            .iter()
            .find(|(p, prefix, _)| *p == provider && model.starts_with(prefix))
            .map(|(_, _, rate)| *rate)
    };
    configured.or_else(built_in).unwrap_or_else(|| {
        tracing::debug!(provider, model, "No pricing entry, using fallback rates");
        FALLBACK_RATE
    })
}

/// Estimated USD cost of one call.
///
/// Overrides from `sdr.toml` are consulted first, then the built-in table,
/// then a high fallback rate.
pub fn estimate_cost_usd(
    input_tokens: u32,
    output_tokens: u32,
    model: &str,
    provider: &str,
    overrides: &[ProviderPricing],
) -> f64 {
    rate_for(model, provider, overrides).cost(input_tokens, output_tokens)
}

pub fn usd_to_gbp(usd: f64, rate: f64) -> f64 {
    usd * rate
}

/// Estimate in GBP, the unit of the usage log.
pub fn estimate_cost_gbp(
    input_tokens: u32,
    output_tokens: u32,
    model: &str,
    provider: &str,
    overrides: &[ProviderPricing],
    rate: f64,
) -> f64 {
    usd_to_gbp(
        estimate_cost_usd(input_tokens, output_tokens, model, provider, overrides),
        rate,
    )
}

/// Format a GBP estimate.
///
/// - Below £0.01: 3 decimal places, `~£0.001`
/// - Otherwise: 2 decimal places, `~£0.12`
pub fn format_cost_gbp(cost: f64) -> String {
    if cost < 0.01 {
        format!("~£{cost:.3}")
    } else {
        format!("~£{cost:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_cost_known_model_returns_correct_value() {
        // deepseek-chat: $0.27 input, $1.10 output per million
        let cost = estimate_cost_usd(1_000_000, 100_000, "deepseek-chat", "deepseek", &[]);
        assert!((cost - 0.38).abs() < 0.001, "Expected ~$0.38, got ${cost}");
    }

    #[test]
    fn estimate_cost_mini_matches_before_regular() {
        let cost = estimate_cost_usd(1_000_000, 1_000_000, "gpt-4o-mini-2024-07-18", "openai", &[]);
        assert!((cost - 0.75).abs() < 0.001, "Expected ~$0.75, got ${cost}");
    }

    #[test]
    fn estimate_cost_user_override_takes_priority() {
        let user_pricing = vec![ProviderPricing {
            provider_name: "groq".to_string(),
            model_pattern: "llama-3.3".to_string(),
            input_cost_per_million: 1.0,
            output_cost_per_million: 5.0,
        }];
        let cost = estimate_cost_usd(
            1_000_000,
            100_000,
            "llama-3.3-70b-versatile",
            "groq",
            &user_pricing,
        );
        assert!((cost - 1.50).abs() < 0.001, "Expected ~$1.50, got ${cost}");
    }

    #[test]
    fn estimate_cost_provider_must_match() {
        // Same model name under an unknown provider falls back.
        let cost = estimate_cost_usd(1_000_000, 0, "gpt-4o-mini", "azure", &[]);
        assert!((cost - FALLBACK_RATE.input).abs() < 0.001);
    }

    #[test]
    fn estimate_cost_gbp_applies_rate() {
        let gbp = estimate_cost_gbp(1_000_000, 0, "gemini-2.0-flash", "gemini", &[], 0.79);
        assert!((gbp - 0.079).abs() < 1e-9);
    }

    #[test]
    fn format_cost_gbp_precision() {
        assert_eq!(format_cost_gbp(0.0), "~£0.000");
        assert_eq!(format_cost_gbp(0.0054), "~£0.005");
        assert_eq!(format_cost_gbp(0.12), "~£0.12");
        assert_eq!(format_cost_gbp(4.5), "~£4.50");
    }

    #[test]
    fn built_in_rates_cover_default_providers() {
        for config in sdr_types::config::default_providers() {
            assert_ne!(
                rate_for(&config.model, &config.name, &[]),
                FALLBACK_RATE,
                "no built-in rate for {}",
                config.model
            );
        }
    }
}
