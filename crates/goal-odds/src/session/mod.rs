//! One prediction screen: goal, context, options, metric input, and the
//! lifecycle of a single result.

mod capabilities;

pub use capabilities::{Capabilities, Profile};

use tracing::{debug, info, warn};

use crate::metrics::{CatalogError, ContextListener, MetricCategory, MetricInput};
use crate::prediction::{
    ApiError, AuthSession, ConfidenceLevel, Domain, PredictionApi, PredictionOptions,
    PredictionRequest, PredictionResult, ShareError, ShareMessage, ShareRequest,
    PREDICTION_FAILED_ALERT,
};

const DEFAULT_SHARE_NAME: &str = "Goal Odds User";

/// Holds the most recent context emitted by the metric input until the
/// session picks it up.
#[derive(Debug, Default)]
pub struct LatestContext {
    pending: Option<String>,
}

impl LatestContext {
    fn take(&mut self) -> Option<String> {
        self.pending.take()
    }
}

impl ContextListener for LatestContext {
    fn context_changed(&mut self, context: &str) {
        self.pending = Some(context.to_string());
    }
}

/// Title and message for a modal alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    pub title: &'static str,
    pub message: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Please enter a goal to predict")]
    InputRequired,
    #[error("a prediction is already in progress")]
    Busy,
    #[error("domain '{0}' is not offered on this screen")]
    DomainDisabled(&'static str),
    #[error("prediction request failed: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Share(#[from] ShareError),
    #[error("metric patterns are unavailable: {0}")]
    Catalog(#[from] CatalogError),
}

impl SessionError {
    pub fn alert(&self) -> Alert {
        match self {
            Self::InputRequired => Alert {
                title: "Input Required",
                message: "Please enter a goal to predict",
            },
            Self::Busy => Alert {
                title: "Please wait",
                message: "A prediction is already in progress.",
            },
            Self::DomainDisabled(_) => Alert {
                title: "Error",
                message: "That domain is not available here.",
            },
            Self::Api(_) => Alert {
                title: "Error",
                message: PREDICTION_FAILED_ALERT,
            },
            Self::Share(ShareError::NoResult) => Alert {
                title: "Share Error",
                message: "There is no prediction to share yet",
            },
            Self::Share(ShareError::Unavailable { .. }) => Alert {
                title: "Share Error",
                message: "Could not generate shareable content",
            },
            Self::Share(ShareError::Failed { .. }) => Alert {
                title: "Share Error",
                message: "Could not share prediction",
            },
            Self::Catalog(_) => Alert {
                title: "Error",
                message: "Metric input is unavailable.",
            },
        }
    }
}

/// A prediction screen bound to one [`PredictionApi`].
///
/// The context text is last-write-wins between [`PredictionSession::set_context`]
/// and metric edits made through [`PredictionSession::edit_metrics`].
pub struct PredictionSession<A> {
    api: A,
    capabilities: Capabilities,
    metrics: MetricInput<LatestContext>,
    goal: String,
    context: String,
    options: PredictionOptions,
    auth: AuthSession,
    loading: bool,
    result: Option<PredictionResult>,
    share_name: String,
}

impl<A> PredictionSession<A>
where
    A: PredictionApi,
{
    pub fn new(
        api: A,
        capabilities: Capabilities,
        auth: AuthSession,
    ) -> Result<Self, SessionError> {
        let metrics = MetricInput::new(capabilities.metrics.clone(), LatestContext::default())?;
        Ok(Self {
            api,
            capabilities,
            metrics,
            goal: String::new(),
            context: String::new(),
            options: PredictionOptions::default(),
            auth,
            loading: false,
            result: None,
            share_name: DEFAULT_SHARE_NAME.to_string(),
        })
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn set_goal(&mut self, goal: impl Into<String>) {
        self.goal = goal.into();
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = context.into();
    }

    pub fn options(&self) -> PredictionOptions {
        self.options
    }

    pub fn set_domain(&mut self, domain: Domain) -> Result<(), SessionError> {
        if !self.capabilities.allows_domain(domain) {
            return Err(SessionError::DomainDisabled(domain.key()));
        }
        self.options.domain = domain;
        Ok(())
    }

    pub fn set_confidence_level(&mut self, level: ConfidenceLevel) {
        self.options.confidence_level = level;
    }

    pub fn set_enhanced_grounding(&mut self, enabled: bool) {
        self.options.enhanced_grounding = enabled;
    }

    pub fn set_llm_domain_detection(&mut self, enabled: bool) {
        self.options.llm_domain_detection = enabled;
    }

    pub fn set_share_name(&mut self, name: impl Into<String>) {
        self.share_name = name.into();
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn metrics(&self) -> &MetricInput<LatestContext> {
        &self.metrics
    }

    /// Apply an edit to the metric input. When the edit emits a new context it
    /// replaces the session's context text.
    pub fn edit_metrics<T>(
        &mut self,
        edit: impl FnOnce(&mut MetricInput<LatestContext>) -> T,
    ) -> T {
        let outcome = edit(&mut self.metrics);
        if let Some(context) = self.metrics.listener_mut().take() {
            self.context = context;
        }
        outcome
    }

    pub fn suggestions(&self) -> Vec<MetricCategory> {
        self.metrics.suggestions(&self.goal)
    }

    /// Submit the goal and context.
    ///
    /// Without a token (and with demo login enabled) one demo login runs first.
    /// A 401 on an authenticated request clears the token, logs in once more,
    /// and retries exactly once.
    pub async fn predict(&mut self) -> Result<&PredictionResult, SessionError> {
        if self.goal.trim().is_empty() {
            return Err(SessionError::InputRequired);
        }
        if self.loading {
            return Err(SessionError::Busy);
        }
        self.loading = true;
        self.result = None;
        let outcome = self.submit().await;
        self.loading = false;

        match outcome {
            Ok(result) => {
                info!(
                    probability = result.probability,
                    domain = %result.domain,
                    "prediction received"
                );
                Ok(self.result.insert(result))
            }
            Err(err) => {
                warn!(error = %err, "prediction failed");
                Err(SessionError::Api(err))
            }
        }
    }

    async fn submit(&mut self) -> Result<PredictionResult, ApiError> {
        let request = PredictionRequest::new(&self.goal, &self.context, self.options);
        self.auth.ensure(&self.api).await;
        debug!(
            domain = request.domain.key(),
            context_len = request.context.len(),
            "submitting prediction"
        );

        let first = self.api.predict(&request, self.auth.token()).await;
        match first {
            Err(err)
                if err.is_unauthorized()
                    && self.auth.token().is_some()
                    && self.auth.demo_login_enabled() =>
            {
                info!("access token rejected; logging in again");
                self.auth.clear();
                self.auth.login(&self.api).await;
                self.api.predict(&request, self.auth.token()).await
            }
            other => other,
        }
    }

    /// Build a share message for the current result.
    pub async fn share(&self) -> Result<ShareMessage, SessionError> {
        let result = self.result.as_ref().ok_or(ShareError::NoResult)?;
        let request = ShareRequest::new(&self.goal, &self.context, &self.share_name);
        let odds = self
            .api
            .shareable_odds(&request, self.auth.token())
            .await
            .map_err(ShareError::from)?;
        Ok(ShareMessage::compose(&odds, result.probability_percent()))
    }

    /// Drop the result, goal, and context. Metrics stay as entered.
    pub fn clear(&mut self) {
        self.result = None;
        self.goal.clear();
        self.context.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::metrics::{EffectInput, InputError};
    use crate::prediction::{ShareableOdds, PredictionRequest};

    #[derive(Default)]
    struct FakeApi {
        predict_calls: AtomicUsize,
        login_calls: AtomicUsize,
        tokens_seen: Mutex<Vec<Option<String>>>,
        requests: Mutex<Vec<PredictionRequest>>,
        reject_first_token: bool,
        fail_login: bool,
        fail_predict: bool,
    }

    fn status(code: u16) -> ApiError {
        ApiError::Status {
            endpoint: "http://fake/predict".to_string(),
            status: code,
            message: "fake".to_string(),
        }
    }

    #[async_trait]
    impl PredictionApi for FakeApi {
        async fn predict(
            &self,
            request: &PredictionRequest,
            token: Option<&str>,
        ) -> Result<PredictionResult, ApiError> {
            let call = self.predict_calls.fetch_add(1, Ordering::SeqCst);
            self.tokens_seen
                .lock()
                .expect("lock")
                .push(token.map(str::to_string));
            self.requests.lock().expect("lock").push(request.clone());
            if self.fail_predict {
                return Err(status(500));
            }
            if self.reject_first_token && call == 0 && token.is_some() {
                return Err(status(401));
            }
            Ok(PredictionResult::from_value(&json!({ "probability": 0.64 })))
        }

        async fn demo_login(&self) -> Result<String, ApiError> {
            let call = self.login_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_login {
                return Err(status(503));
            }
            Ok(format!("token-{call}"))
        }

        async fn shareable_odds(
            &self,
            _request: &ShareRequest,
            _token: Option<&str>,
        ) -> Result<ShareableOdds, ApiError> {
            Ok(ShareableOdds::default())
        }
    }

    fn session(api: FakeApi) -> PredictionSession<FakeApi> {
        PredictionSession::new(api, Capabilities::organized(), AuthSession::new(true))
            .expect("session builds")
    }

    #[tokio::test]
    async fn blank_goal_is_rejected_before_any_call() {
        let mut session = session(FakeApi::default());
        session.set_goal("   ");

        let err = session.predict().await.expect_err("goal required");
        assert!(matches!(err, SessionError::InputRequired));
        assert_eq!(err.alert().title, "Input Required");
        assert_eq!(session.api().predict_calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.api().login_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_token_triggers_one_demo_login() {
        let mut session = session(FakeApi::default());
        session.set_goal("Run a marathon");

        let result = session.predict().await.expect("prediction succeeds");
        assert_eq!(result.probability_percent(), 64);
        assert_eq!(session.api().login_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            session.api().tokens_seen.lock().expect("lock").as_slice(),
            &[Some("token-0".to_string())]
        );
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn rejected_token_is_refreshed_and_retried_once() {
        let mut session = PredictionSession::new(
            FakeApi {
                reject_first_token: true,
                ..FakeApi::default()
            },
            Capabilities::organized(),
            AuthSession::with_token("stale"),
        )
        .expect("session builds");
        session.set_goal("Get promoted");

        session.predict().await.expect("retry succeeds");
        assert_eq!(session.api().predict_calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.api().login_calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.auth().token(), Some("token-0"));
    }

    #[tokio::test]
    async fn failed_login_proceeds_unauthenticated() {
        let mut session = session(FakeApi {
            fail_login: true,
            ..FakeApi::default()
        });
        session.set_goal("Learn Spanish");

        session.predict().await.expect("unauthenticated call succeeds");
        assert_eq!(
            session.api().tokens_seen.lock().expect("lock").as_slice(),
            &[None]
        );
    }

    #[tokio::test]
    async fn api_failure_resets_loading_and_keeps_form_state() {
        let mut session = session(FakeApi {
            fail_predict: true,
            ..FakeApi::default()
        });
        session.set_goal("Buy a house");
        session.set_context("savings: 40000 dollars");

        let err = session.predict().await.expect_err("server error");
        assert_eq!(err.alert().message, PREDICTION_FAILED_ALERT);
        assert!(!session.is_loading());
        assert_eq!(session.goal(), "Buy a house");
        assert_eq!(session.context(), "savings: 40000 dollars");
        assert_eq!(session.api().predict_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn in_flight_prediction_blocks_resubmission() {
        let mut session = session(FakeApi::default());
        session.set_goal("Write a novel");
        session.loading = true;

        assert!(matches!(session.predict().await, Err(SessionError::Busy)));
        assert_eq!(session.api().predict_calls.load(Ordering::SeqCst), 0);
        assert!(session.is_loading());
    }

    #[tokio::test]
    async fn metric_edits_feed_the_request_context() {
        let mut session = session(FakeApi::default());
        session.set_goal("  Lose weight  ");
        session.set_context("typed by hand");
        session
            .edit_metrics(|input| input.add_metric("age", "25"))
            .expect("metric");
        session
            .edit_metrics(|input| {
                input.add_qualitative("motivation", EffectInput::Scalar(0.8), 0.6)
            })
            .expect("factor");

        session.predict().await.expect("prediction");
        let requests = session.api().requests.lock().expect("lock");
        assert_eq!(requests[0].goal, "Lose weight");
        assert_eq!(
            requests[0].context,
            "age: 25 years, motivation_ratio: 0.80, motivation_weight: 0.60"
        );
    }

    #[tokio::test]
    async fn rejected_metric_edit_keeps_typed_context() {
        let mut session = session(FakeApi::default());
        session.set_context("typed by hand");

        let err = session
            .edit_metrics(|input| input.add_qualitative("!!!", EffectInput::Scalar(0.5), 0.5))
            .expect_err("empty tag");
        assert_eq!(err, InputError::EmptyTag("!!!".to_string()));
        assert_eq!(session.context(), "typed by hand");
    }

    #[tokio::test]
    async fn clear_keeps_metrics() {
        let mut session = session(FakeApi::default());
        session.set_goal("Start a company");
        session
            .edit_metrics(|input| input.add_metric("current_employees", "4"))
            .expect("metric");
        session.predict().await.expect("prediction");

        session.clear();
        assert!(session.result().is_none());
        assert!(session.goal().is_empty());
        assert!(session.context().is_empty());
        assert_eq!(session.metrics().store().metrics().len(), 1);
    }

    #[tokio::test]
    async fn share_needs_a_result_and_falls_back_to_probability() {
        let mut session = session(FakeApi::default());
        let err = session.share().await.expect_err("nothing to share");
        assert!(matches!(err, SessionError::Share(ShareError::NoResult)));

        session.set_goal("Pass the bar exam");
        session.predict().await.expect("prediction");
        let message = session.share().await.expect("share message");
        assert!(message
            .message
            .starts_with("My prediction: 64% success probability for my goal!"));
    }

    #[test]
    fn domains_outside_the_profile_are_rejected() {
        let mut session = PredictionSession::new(
            FakeApi::default(),
            Capabilities::simple(),
            AuthSession::default(),
        )
        .expect("session builds");
        assert!(matches!(
            session.set_domain(Domain::Finance),
            Err(SessionError::DomainDisabled("finance"))
        ));
        session.set_domain(Domain::Auto).expect("auto is offered");
    }
}
