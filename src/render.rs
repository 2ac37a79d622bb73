use goal_odds::metrics::definitions::{self, MetricDefinition, MetricDomain};
use goal_odds::metrics::{
    CategoricalKind, Detection, Direction, EffectMode, MetricCategory, MetricStore,
    PatternCatalog,
};
use goal_odds::prediction::{PredictionResult, ShareMessage};

pub fn render_prediction(result: &PredictionResult, show_reasoning: bool) {
    println!("Success probability: {}%", result.probability_percent());
    if let Some((low, high)) = result.confidence_interval {
        println!(
            "Range: {}% - {}%",
            (low * 100.0).round(),
            (high * 100.0).round()
        );
    }
    if let Some(comparison) = &result.probability_comparison {
        if let Some(baseline) = comparison.baseline {
            let advantage = comparison
                .advantage()
                .map(|advantage| format!(" ({advantage})"))
                .unwrap_or_default();
            println!("Baseline: {}%{}", (baseline * 100.0).round(), advantage);
        }
    }

    let outcome = result
        .outcome_category
        .as_deref()
        .map(|outcome| format!(", outcome {outcome}"))
        .unwrap_or_default();
    println!(
        "Domain: {} (confidence {}{})",
        result.domain, result.confidence_level, outcome
    );

    println!("\n{}", result.narrative);

    if !result.si_factors_extracted.is_empty() {
        println!("\nFactors the service extracted");
        for (name, value) in &result.si_factors_extracted {
            println!("- {name}: {value}");
        }
    }

    render_list("Key success factors", &result.key_success_factors);
    render_list("Factors", &result.factors);
    render_list("Risks", &result.risks);

    if !show_reasoning {
        return;
    }

    match &result.chain_of_thought {
        Some(chain) if !chain.reasoning_steps.is_empty() => {
            println!("\nChain of thought");
            for (index, step) in chain.reasoning_steps.iter().enumerate() {
                println!("{}. {}", index + 1, step);
            }
        }
        _ => println!("\nChain of thought: none"),
    }

    match &result.math_breakdown {
        Some(math) => {
            println!("\nMath breakdown");
            let figure = |value: Option<f64>| {
                value
                    .map(|value| format!("{value:.3}"))
                    .unwrap_or_else(|| "n/a".to_string())
            };
            println!("- base probability: {}", figure(math.base_probability));
            println!("- logit score: {}", figure(math.logit_score));
            println!("- final probability: {}", figure(math.final_probability));
            for factor in &math.positive_factors {
                println!("  + {}: {:+.3}", factor.name, factor.contribution);
            }
            for factor in &math.negative_factors {
                println!("  - {}: {:+.3}", factor.name, factor.contribution);
            }
        }
        None => println!("\nMath breakdown: none"),
    }
}

fn render_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{title}");
    for item in items {
        println!("- {item}");
    }
}

pub fn render_share(message: &ShareMessage) {
    println!("\n{}", message.title);
    println!("{}", message.message);
}

pub fn render_suggestions(suggestions: &[MetricCategory]) {
    if suggestions.is_empty() {
        return;
    }
    println!("\nWorth adding");
    for category in suggestions {
        println!("- {} ({})", category.label(), category.key());
    }
}

pub fn render_detections(text: &str, detections: &[Detection]) {
    if detections.is_empty() {
        println!("No metric recognised in \"{text}\"");
        return;
    }
    for detection in detections {
        println!(
            "- {}: {} {} (matched \"{}\")",
            detection.category.key(),
            detection.value,
            detection.unit,
            detection.matched
        );
    }
}

pub fn render_context(store: &MetricStore, effect_mode: EffectMode, context: &str) {
    if store.is_empty() {
        println!("No metrics entered");
        return;
    }
    for metric in store.metrics() {
        println!(
            "- [{}] {}: {} {}",
            metric.id, metric.label, metric.value, metric.unit
        );
    }
    for factor in store.qualitative() {
        let effect = match (effect_mode, factor.direction()) {
            (EffectMode::Scalar, _) => format!("confidence {:.2}", factor.confidence),
            (EffectMode::Directional, Some(Direction::Helps)) => {
                format!("helps, strength {:.2}", factor.strength())
            }
            (EffectMode::Directional, Some(Direction::Hurts)) => {
                format!("hurts, strength {:.2}", factor.strength())
            }
            (EffectMode::Directional, None) => "neutral".to_string(),
        };
        println!(
            "- [{}] {} ({}, weight {:.2})",
            factor.id, factor.tag, effect, factor.weight
        );
    }
    for choice in store.categorical() {
        println!("- [{}] {}: {}", choice.id, choice.kind.label(), choice.label);
    }
    println!("\nContext: {context}");
}

pub fn render_catalog(
    catalog: &PatternCatalog,
    domain: Option<MetricDomain>,
    flat: bool,
    categories: bool,
) {
    if categories {
        println!("Detectable categories (first match wins)");
        for entry in catalog.entries() {
            println!(
                "- {} [{}]: {}",
                entry.spec.category.key(),
                entry.spec.units.join(", "),
                entry.spec.description
            );
        }
        return;
    }

    let selected: Vec<&MetricDefinition> = match (domain, flat) {
        (Some(domain), _) => definitions::by_domain(domain).collect(),
        (None, true) => definitions::flat().collect(),
        (None, false) => definitions::all().iter().collect(),
    };

    println!("Metric definitions");
    let mut current = None;
    for definition in selected {
        if current != Some(definition.domain) {
            current = Some(definition.domain);
            println!("\n{}", definition.domain.label());
        }
        println!(
            "- {} ({}): {}, e.g. {}",
            definition.key, definition.unit, definition.label, definition.placeholder
        );
    }

    println!("\nTimeline units: {}", definitions::TIMELINE_UNITS.join(", "));

    println!("\nCategorical options");
    for kind in CategoricalKind::ordered() {
        let options: Vec<&str> = kind.options().iter().map(|(value, _)| *value).collect();
        println!("- {}: {}", kind.key(), options.join(", "));
    }
}
