mod render;

use clap::{Args, Parser, Subcommand};
use goal_odds::config::AppConfig;
use goal_odds::error::AppError;
use goal_odds::metrics::definitions::{self, MetricDomain};
use goal_odds::metrics::{
    CategoricalKind, ContextListener, Direction, EffectInput, Extractor, MetricInput,
    PatternCatalog,
};
use goal_odds::prediction::{AuthSession, ConfidenceLevel, Domain, HttpPredictionClient};
use goal_odds::session::{PredictionSession, Profile};
use goal_odds::telemetry;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "goal-odds",
    about = "Collect goal metrics and ask the prediction service for success odds",
    version
)]
struct Cli {
    /// Screen profile: simple, smart, organized, or flat
    #[arg(long, global = true, default_value = "organized", value_parser = parse_profile)]
    profile: Profile,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Request a success probability for a goal
    Predict(PredictArgs),
    /// Run the metric extractor over free text
    Extract(ExtractArgs),
    /// Print the context string the given metrics serialize to
    Context(MetricArgs),
    /// List metric definitions, detectable categories, and options (default command)
    Catalog(CatalogArgs),
}

#[derive(Args, Debug, Default, Clone)]
struct MetricArgs {
    /// Quantitative metric as key=value (see `catalog` for keys)
    #[arg(long = "metric", value_parser = parse_pair)]
    metrics: Vec<(String, String)>,
    /// Free-text metric run through the extractor, e.g. "I make $85k"
    #[arg(long = "describe")]
    descriptions: Vec<String>,
    /// Qualitative factor as tag:confidence:weight or tag:helps|hurts:strength:weight
    #[arg(long = "factor", value_parser = parse_factor)]
    factors: Vec<FactorArg>,
    /// Categorical choice as kind=value, e.g. gender=female
    #[arg(long = "category", value_parser = parse_category)]
    categories: Vec<(CategoricalKind, String)>,
    /// Timeline value
    #[arg(long)]
    timeline: Option<String>,
    /// Timeline unit: days, weeks, months, or years
    #[arg(long)]
    timeline_unit: Option<String>,
}

impl MetricArgs {
    fn is_empty(&self) -> bool {
        self.metrics.is_empty()
            && self.descriptions.is_empty()
            && self.factors.is_empty()
            && self.categories.is_empty()
            && self.timeline.is_none()
            && self.timeline_unit.is_none()
    }
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// The goal to estimate
    #[arg(long)]
    goal: String,
    /// Free-form context; replaced by the metric context when metric flags are given
    #[arg(long)]
    context: Option<String>,
    #[command(flatten)]
    metrics: MetricArgs,
    /// Domain hint
    #[arg(long, default_value = "auto", value_parser = parse_domain)]
    domain: Domain,
    /// standard, high, or conservative
    #[arg(long, default_value = "standard", value_parser = parse_confidence_level)]
    confidence_level: ConfidenceLevel,
    /// Skip evidence grounding on the service side
    #[arg(long)]
    no_enhanced_grounding: bool,
    /// Skip LLM-based domain detection on the service side
    #[arg(long)]
    no_llm_domain_detection: bool,
    /// Print the chain of thought and math breakdown
    #[arg(long)]
    show_reasoning: bool,
    /// Also request shareable text for the result
    #[arg(long)]
    share: bool,
    /// Print the mapped result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Text to classify
    text: String,
    /// Report every category found instead of the first match
    #[arg(long)]
    all: bool,
    /// Goal used to suggest further metrics
    #[arg(long)]
    goal: Option<String>,
    /// Print detections as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Default)]
struct CatalogArgs {
    /// Only list definitions for this domain
    #[arg(long, value_parser = parse_metric_domain)]
    domain: Option<MetricDomain>,
    /// Only list the flat picker subset
    #[arg(long)]
    flat: bool,
    /// List extractor categories instead of definitions
    #[arg(long)]
    categories: bool,
}

#[derive(Debug, Clone)]
struct FactorArg {
    tag: String,
    effect: EffectInput,
    weight: f64,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(
        environment = config.environment.label(),
        profile = cli.profile.key(),
        "configuration loaded"
    );

    let command = cli
        .command
        .unwrap_or_else(|| Command::Catalog(CatalogArgs::default()));

    match command {
        Command::Predict(args) => run_predict(&config, cli.profile, args).await,
        Command::Extract(args) => run_extract(args),
        Command::Context(args) => run_context(cli.profile, &args),
        Command::Catalog(args) => {
            render::render_catalog(
                PatternCatalog::standard()?,
                args.domain,
                args.flat,
                args.categories,
            );
            Ok(())
        }
    }
}

async fn run_predict(config: &AppConfig, profile: Profile, args: PredictArgs) -> Result<(), AppError> {
    let client = HttpPredictionClient::new(config.api.clone())?;
    let mut session = PredictionSession::new(
        client,
        profile.capabilities(),
        AuthSession::new(config.demo_mode),
    )?;

    session.set_domain(args.domain)?;
    session.set_confidence_level(args.confidence_level);
    session.set_enhanced_grounding(!args.no_enhanced_grounding);
    session.set_llm_domain_detection(!args.no_llm_domain_detection);
    if let Some(context) = &args.context {
        session.set_context(context.as_str());
    }
    if args.context.is_some() && !args.metrics.is_empty() {
        warn!("metric flags replace the --context text");
    }
    session.edit_metrics(|input| apply_metrics(input, &args.metrics))?;
    session.set_goal(args.goal.as_str());

    let suggestions = session.suggestions();
    info!(
        base_url = %config.api.base_url,
        domain = args.domain.key(),
        "requesting prediction"
    );
    let result = session.predict().await?.clone();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render::render_prediction(&result, args.show_reasoning);
        render::render_suggestions(&suggestions);
    }

    if args.share {
        match session.share().await {
            Ok(message) => render::render_share(&message),
            Err(err) => {
                let alert = err.alert();
                warn!(error = %err, "sharing failed");
                eprintln!("{}: {}", alert.title, alert.message);
            }
        }
    }

    Ok(())
}

fn run_extract(args: ExtractArgs) -> Result<(), AppError> {
    let extractor = Extractor::standard()?;
    let detections = if args.all {
        extractor.detect_all(&args.text)
    } else {
        extractor.detect(&args.text).into_iter().collect()
    };
    let present: Vec<_> = detections.iter().map(|detection| detection.category).collect();
    let suggestions = args
        .goal
        .as_deref()
        .map(|goal| goal_odds::metrics::extractor::suggest_categories(goal, &present))
        .unwrap_or_default();

    if args.json {
        let body = serde_json::json!({
            "detections": detections,
            "suggestions": suggestions.iter().map(|category| category.key()).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        render::render_detections(&args.text, &detections);
        render::render_suggestions(&suggestions);
    }
    Ok(())
}

fn run_context(profile: Profile, args: &MetricArgs) -> Result<(), AppError> {
    let capabilities = profile.capabilities().metrics;
    let effect_mode = capabilities.effect_mode;
    let mut input = MetricInput::new(capabilities, |context: &str| {
        debug!(context, "context updated");
    })?;
    apply_metrics(&mut input, args)?;
    render::render_context(input.store(), effect_mode, &input.context());
    Ok(())
}

fn apply_metrics<L>(input: &mut MetricInput<L>, args: &MetricArgs) -> Result<(), AppError>
where
    L: ContextListener,
{
    for (key, value) in &args.metrics {
        input.add_metric(key, value)?;
    }
    for description in &args.descriptions {
        input.add_text(description)?;
    }
    for factor in &args.factors {
        input.add_qualitative(&factor.tag, factor.effect, factor.weight)?;
    }
    for (kind, value) in &args.categories {
        input.select_categorical(*kind, value)?;
    }
    if let Some(unit) = &args.timeline_unit {
        input.set_timeline_unit(unit)?;
    }
    if let Some(value) = &args.timeline {
        input.set_timeline(value)?;
    }
    Ok(())
}

fn parse_profile(raw: &str) -> Result<Profile, String> {
    Profile::from_key(raw).ok_or_else(|| {
        format!(
            "unknown profile '{raw}' (expected one of: {})",
            Profile::ordered().map(Profile::key).join(", ")
        )
    })
}

fn parse_domain(raw: &str) -> Result<Domain, String> {
    Domain::from_key(raw).ok_or_else(|| {
        format!(
            "unknown domain '{raw}' (expected one of: {})",
            Domain::ordered().map(Domain::key).join(", ")
        )
    })
}

fn parse_confidence_level(raw: &str) -> Result<ConfidenceLevel, String> {
    ConfidenceLevel::from_key(raw).ok_or_else(|| {
        format!(
            "unknown confidence level '{raw}' (expected one of: {})",
            ConfidenceLevel::ordered().map(ConfidenceLevel::key).join(", ")
        )
    })
}

fn parse_metric_domain(raw: &str) -> Result<MetricDomain, String> {
    MetricDomain::from_key(raw).ok_or_else(|| {
        format!(
            "unknown metric domain '{raw}' (expected one of: {})",
            MetricDomain::ordered().map(MetricDomain::key).join(", ")
        )
    })
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if definitions::find(key).is_none() {
        return Err(format!("no metric definition named '{key}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn parse_category(raw: &str) -> Result<(CategoricalKind, String), String> {
    let (kind, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected kind=value, got '{raw}'"))?;
    let kind = CategoricalKind::from_key(kind).ok_or_else(|| {
        format!(
            "unknown category '{}' (expected one of: {})",
            kind.trim(),
            CategoricalKind::ordered().map(CategoricalKind::key).join(", ")
        )
    })?;
    Ok((kind, value.trim().to_string()))
}

fn parse_factor(raw: &str) -> Result<FactorArg, String> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    let number = |field: &str, value: &str| {
        value
            .parse::<f64>()
            .map_err(|_| format!("{field} '{value}' is not a number"))
    };

    match parts.as_slice() {
        &[tag, confidence, weight] => Ok(FactorArg {
            tag: tag.to_string(),
            effect: EffectInput::Scalar(number("confidence", confidence)?),
            weight: number("weight", weight)?,
        }),
        &[tag, direction, strength, weight] => {
            let direction = match direction.to_ascii_lowercase().as_str() {
                "helps" | "help" | "+" => Direction::Helps,
                "hurts" | "hurt" | "-" => Direction::Hurts,
                other => return Err(format!("direction must be helps or hurts, got '{other}'")),
            };
            Ok(FactorArg {
                tag: tag.to_string(),
                effect: EffectInput::Directional {
                    direction,
                    strength: number("strength", strength)?,
                },
                weight: number("weight", weight)?,
            })
        }
        _ => Err(format!(
            "expected tag:confidence:weight or tag:helps|hurts:strength:weight, got '{raw}'"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_factor_parses() {
        let factor = parse_factor("motivation:0.8:0.6").expect("valid factor");
        assert_eq!(factor.tag, "motivation");
        assert_eq!(factor.effect, EffectInput::Scalar(0.8));
        assert_eq!(factor.weight, 0.6);
    }

    #[test]
    fn directional_factor_parses() {
        let factor = parse_factor("family support:helps:0.5:0.9").expect("valid factor");
        assert_eq!(
            factor.effect,
            EffectInput::Directional {
                direction: Direction::Helps,
                strength: 0.5,
            }
        );
        assert!(parse_factor("grit:sideways:0.5:0.5").is_err());
        assert!(parse_factor("grit").is_err());
    }

    #[test]
    fn pairs_require_known_definitions() {
        assert_eq!(
            parse_pair("age = 25").expect("known key"),
            ("age".to_string(), "25".to_string())
        );
        assert!(parse_pair("shoe_size=10").is_err());
        assert!(parse_pair("age").is_err());
    }

    #[test]
    fn categories_parse_kind_and_value() {
        assert_eq!(
            parse_category("gender=female").expect("valid category"),
            (CategoricalKind::Gender, "female".to_string())
        );
        assert!(parse_category("star_sign=leo").is_err());
    }

    #[test]
    fn context_command_serializes_metrics() {
        let args = MetricArgs {
            metrics: vec![("age".to_string(), "25".to_string())],
            factors: vec![parse_factor("motivation:0.8:0.6").expect("valid factor")],
            ..MetricArgs::default()
        };
        let mut input = MetricInput::new(Profile::Organized.capabilities().metrics, |_: &str| {})
            .expect("input builds");
        apply_metrics(&mut input, &args).expect("metrics apply");

        assert_eq!(
            input.context(),
            "age: 25 years, motivation_ratio: 0.80, motivation_weight: 0.60"
        );
    }

    #[test]
    fn cli_parses_a_full_predict_invocation() {
        let cli = Cli::try_parse_from([
            "goal-odds",
            "--profile",
            "flat",
            "predict",
            "--goal",
            "Buy a house",
            "--metric",
            "monthly_savings=1500",
            "--factor",
            "stable job:helps:0.6:0.7",
            "--category",
            "relationship_status=married",
            "--timeline",
            "18",
            "--domain",
            "finance",
            "--no-enhanced-grounding",
        ])
        .expect("arguments parse");

        assert_eq!(cli.profile, Profile::Flat);
        match cli.command {
            Some(Command::Predict(args)) => {
                assert_eq!(args.domain, Domain::Finance);
                assert!(args.no_enhanced_grounding);
                assert_eq!(args.metrics.factors.len(), 1);
                assert_eq!(args.metrics.timeline.as_deref(), Some("18"));
            }
            other => panic!("expected predict command, got {other:?}"),
        }
    }
}
