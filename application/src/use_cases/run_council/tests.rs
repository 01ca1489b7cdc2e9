use super::*;
use crate::ports::conversation_logger::MemoryConversationLogger;
use crate::ports::llm_gateway::GatewayError;
use crate::ports::tool_executor::NoTools;
use async_trait::async_trait;
use council_domain::{
    Council, LlmResponse, Message, ModelPrice, ModelRequest, PipelineState, PreviousIteration,
    TokenUsage,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Collect,
    Rank,
    Synthesize,
    Reflect,
}

fn phase_of(prompt: &str) -> Phase {
    if prompt.contains("reviewing your own synthesis") {
        Phase::Reflect
    } else if prompt.contains("STAGE 1 - Individual Responses") {
        Phase::Synthesize
    } else if prompt.contains("You are evaluating different responses") {
        Phase::Rank
    } else {
        Phase::Collect
    }
}

fn prompt_of(request: &ModelRequest) -> String {
    match request.messages.first() {
        Some(Message::User { text, .. }) => text.clone(),
        _ => String::new(),
    }
}

type Responder = dyn Fn(&str, Phase) -> Result<String, GatewayError> + Send + Sync;

/// Answers by model and phase; optional per-model delay fixes arrival order.
struct CouncilGateway {
    responder: Box<Responder>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl CouncilGateway {
    fn new(responder: impl Fn(&str, Phase) -> Result<String, GatewayError> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            delays: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn standard() -> Self {
        Self::new(standard_answer)
    }

    fn with_delay(mut self, model: &str, millis: u64) -> Self {
        self.delays.insert(model.to_string(), Duration::from_millis(millis));
        self
    }

    fn prompts(&self, phase: Phase) -> Vec<(String, String)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.model.to_string(), prompt_of(r)))
            .filter(|(_, p)| phase_of(p) == phase)
            .collect()
    }
}

#[async_trait]
impl LlmGateway for CouncilGateway {
    async fn send(&self, request: &ModelRequest) -> Result<LlmResponse, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        let phase = phase_of(&prompt_of(request));
        if phase == Phase::Collect
            && let Some(delay) = self.delays.get(request.model.as_str())
        {
            tokio::time::sleep(*delay).await;
        }
        let text = (self.responder)(request.model.as_str(), phase)?;
        Ok(LlmResponse::from_text(text).with_usage(TokenUsage::new(100, 50)))
    }
}

fn standard_answer(model: &str, phase: Phase) -> Result<String, GatewayError> {
    Ok(match phase {
        Phase::Collect => format!("Answer #{}", answer_number(model)),
        Phase::Rank => "Solid work overall.\n\nFINAL RANKING:\n1. Response A\n2. Response B\n3. Response C"
            .to_string(),
        Phase::Synthesize => "The council agrees.".to_string(),
        Phase::Reflect => "CRITIQUE:\nToo brief.\n\nCOMPARISON:\nMore focused than before.\n\nSUGGESTED_SYSTEM_PROMPT:\nBe thorough.\n\nSUGGESTED_QUERY:\nWhy, exactly?"
            .to_string(),
    })
}

/// Stage 1 answers carry a number, never the model id.
fn answer_number(model: &str) -> usize {
    ["alpha", "beta", "gamma"]
        .iter()
        .position(|m| *m == model)
        .map_or(0, |i| i + 1)
}

fn council() -> Council {
    Council::from_strs(&["alpha", "beta", "gamma"], "chair").unwrap()
}

fn use_case(gateway: Arc<CouncilGateway>) -> RunCouncilUseCase {
    RunCouncilUseCase::new(gateway, Arc::new(NoTools::default()), ExecutionParams::default())
}

async fn run_collecting(
    use_case: &RunCouncilUseCase,
    input: RunCouncilInput,
) -> (Result<PipelineRun, RunCouncilError>, Vec<PipelineEvent>) {
    let (tx, mut rx) = mpsc::channel(64);
    let result = use_case.execute_streaming(input, tx, &NoProgress).await;
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    (result, events)
}

fn names(events: &[PipelineEvent]) -> Vec<&'static str> {
    events.iter().map(|e| e.name()).collect()
}

#[tokio::test]
async fn test_full_run_event_order() {
    let gateway = Arc::new(CouncilGateway::standard());
    let uc = use_case(gateway.clone());

    let (result, events) = run_collecting(&uc, RunCouncilInput::new(council(), "What is Rust?")).await;
    let run = result.unwrap();

    assert_eq!(
        names(&events),
        vec![
            "stage1_start",
            "stage1_complete",
            "cost_summary",
            "stage2_start",
            "stage2_complete",
            "cost_summary",
            "stage3_start",
            "stage3_complete",
            "cost_summary",
            "stage4_start",
            "stage4_complete",
            "cost_summary",
            "complete",
        ]
    );
    assert_eq!(run.state(), PipelineState::Complete);
    assert_eq!(run.stage1().len(), 3);
    assert_eq!(run.stage2().len(), 3);
    assert_eq!(run.synthesis().unwrap().response, "The council agrees.");
    assert_eq!(run.synthesis().unwrap().model.as_str(), "chair");

    let reflection = run.reflection().unwrap();
    assert_eq!(reflection.critique, "Too brief.");
    assert_eq!(reflection.suggested_system_prompt, "Be thorough.");
    assert_eq!(reflection.suggested_query, "Why, exactly?");
    // Not a shared rerun, so no comparison is kept.
    assert!(reflection.comparison_to_previous.is_none());
    assert!(run.failure().is_none());
}

#[tokio::test]
async fn test_labels_are_a_bijection_over_responders() {
    let uc = use_case(Arc::new(CouncilGateway::standard()));
    let (result, events) = run_collecting(&uc, RunCouncilInput::new(council(), "q")).await;
    let run = result.unwrap();

    let metadata = events
        .iter()
        .find_map(|e| match e {
            PipelineEvent::Stage2Complete { metadata, .. } => Some(metadata.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(metadata.label_to_model.len(), 3);
    for entry in run.stage1() {
        assert!(metadata.label_to_model.label_for(&entry.model).is_some());
    }
    assert_eq!(metadata.aggregate_rankings.len(), 3);
    assert_eq!(metadata.aggregate_rankings[0].average_rank, 1.0);
    assert_eq!(metadata.aggregate_rankings[0].evaluation_count, 3);
}

#[tokio::test(start_paused = true)]
async fn test_labels_follow_arrival_order() {
    let gateway = CouncilGateway::standard()
        .with_delay("alpha", 30)
        .with_delay("beta", 10)
        .with_delay("gamma", 20);
    let uc = use_case(Arc::new(gateway));

    let run = uc.execute(RunCouncilInput::new(council(), "q")).await.unwrap();

    let order: Vec<&str> = run.stage1().iter().map(|e| e.model.as_str()).collect();
    assert_eq!(order, vec!["beta", "gamma", "alpha"]);
    let labelled: Vec<(String, String)> = run
        .label_map()
        .iter()
        .map(|(l, m)| (l.to_string(), m.to_string()))
        .collect();
    assert_eq!(
        labelled,
        vec![
            ("Response A".to_string(), "beta".to_string()),
            ("Response B".to_string(), "gamma".to_string()),
            ("Response C".to_string(), "alpha".to_string()),
        ]
    );
    // Everyone ranked A first, so the earliest responder wins.
    assert_eq!(run.aggregate_rankings()[0].model.as_str(), "beta");
}

#[tokio::test]
async fn test_ranking_prompt_hides_model_names() {
    let gateway = Arc::new(CouncilGateway::standard());
    let uc = use_case(gateway.clone());
    uc.execute(RunCouncilInput::new(council(), "q")).await.unwrap();

    let rank_requests: Vec<ModelRequest> = gateway
        .requests
        .lock()
        .unwrap()
        .iter()
        .filter(|r| phase_of(&prompt_of(r)) == Phase::Rank)
        .cloned()
        .collect();
    assert_eq!(rank_requests.len(), 3);

    for request in rank_requests {
        let prompt = prompt_of(&request);
        assert!(prompt.contains("Response A:"));
        assert!(prompt.contains("Answer #1"));
        let system = request.system_prompt.clone().unwrap_or_default();
        for id in ["alpha", "beta", "gamma", "chair"] {
            assert!(!prompt.contains(id), "{id} leaked into a ranking prompt");
            assert!(!system.contains(id), "{id} leaked into a ranking system prompt");
        }
    }
}

#[tokio::test]
async fn test_partial_stage1_failure_continues() {
    let gateway = Arc::new(CouncilGateway::new(|model, phase| {
        if model == "beta" && phase == Phase::Collect {
            Err(GatewayError::Transport("connection reset".to_string()))
        } else {
            standard_answer(model, phase)
        }
    }));
    let uc = use_case(gateway.clone());

    let run = uc.execute(RunCouncilInput::new(council(), "q")).await.unwrap();

    assert_eq!(run.state(), PipelineState::Complete);
    assert_eq!(run.stage1().len(), 2);
    assert!(run.stage1().iter().all(|e| e.model.as_str() != "beta"));
    assert_eq!(run.label_map().len(), 2);
    // Only successful members evaluate.
    assert_eq!(gateway.prompts(Phase::Rank).len(), 2);
}

/// Records every finished task as (stage number, model, success).
#[derive(Default)]
struct RecordingProgress {
    finished: Mutex<Vec<(u8, String, bool)>>,
}

impl ProgressNotifier for RecordingProgress {
    fn on_stage_start(&self, _stage: Stage, _total_tasks: usize) {}

    fn on_task_complete(&self, stage: Stage, model: &council_domain::ModelId, success: bool) {
        self.finished
            .lock()
            .unwrap()
            .push((stage.number(), model.to_string(), success));
    }

    fn on_stage_complete(&self, _stage: Stage) {}
}

#[tokio::test]
async fn test_panicking_member_still_reported_to_progress() {
    let gateway = Arc::new(CouncilGateway::new(|model, phase| {
        if model == "beta" && phase == Phase::Collect {
            panic!("adapter bug");
        }
        standard_answer(model, phase)
    }));
    let uc = use_case(gateway);
    let progress = RecordingProgress::default();

    let (tx, mut rx) = mpsc::channel(64);
    let run = uc
        .execute_streaming(RunCouncilInput::new(council(), "q"), tx, &progress)
        .await
        .unwrap();
    while rx.recv().await.is_some() {}

    assert_eq!(run.stage1().len(), 2);
    let finished = progress.finished.lock().unwrap();
    let stage1: Vec<&(u8, String, bool)> = finished.iter().filter(|f| f.0 == 1).collect();
    assert_eq!(stage1.len(), 3);
    assert!(stage1.contains(&&(1, "beta".to_string(), false)));
    assert_eq!(finished.iter().filter(|f| f.0 == 2).count(), 2);
}

#[tokio::test]
async fn test_total_stage1_failure() {
    let gateway = Arc::new(CouncilGateway::new(|model, phase| match phase {
        Phase::Collect => Err(GatewayError::Timeout),
        _ => standard_answer(model, phase),
    }));
    let uc = use_case(gateway.clone());

    let (result, events) = run_collecting(&uc, RunCouncilInput::new(council(), "q")).await;
    let run = result.unwrap();

    assert_eq!(names(&events), vec!["stage1_start", "error"]);
    match &events[1] {
        PipelineEvent::Error { stage, message } => {
            assert_eq!(*stage, Stage::Collect);
            assert!(message.contains("All council members failed"));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(run.state(), PipelineState::Failed);
    assert!(run.stage1().is_empty());
    assert!(gateway.prompts(Phase::Rank).is_empty());
}

#[tokio::test]
async fn test_all_evaluators_fail_still_synthesizes() {
    let uc = use_case(Arc::new(CouncilGateway::new(|model, phase| match phase {
        Phase::Rank => Err(GatewayError::ProviderRejected("rate limited".to_string())),
        _ => standard_answer(model, phase),
    })));

    let run = uc.execute(RunCouncilInput::new(council(), "q")).await.unwrap();

    assert_eq!(run.state(), PipelineState::Complete);
    assert!(run.stage2().is_empty());
    assert!(run.aggregate_rankings().is_empty());
    assert!(run.synthesis().is_some());
}

#[tokio::test]
async fn test_synthesis_failure_is_terminal() {
    let uc = use_case(Arc::new(CouncilGateway::new(|model, phase| match phase {
        Phase::Synthesize => Err(GatewayError::Timeout),
        _ => standard_answer(model, phase),
    })));

    let (result, events) = run_collecting(&uc, RunCouncilInput::new(council(), "q")).await;
    let run = result.unwrap();

    let tail: Vec<_> = names(&events).into_iter().skip(6).collect();
    assert_eq!(tail, vec!["stage3_start", "error"]);
    assert_eq!(run.state(), PipelineState::Failed);
    assert_eq!(run.failure().unwrap().stage, Stage::Synthesize);
    assert_eq!(run.stage1().len(), 3);
    assert_eq!(run.stage2().len(), 3);
    assert!(run.reflection().is_none());
}

#[tokio::test]
async fn test_reflection_failure_still_completes() {
    let uc = use_case(Arc::new(CouncilGateway::new(|model, phase| match phase {
        Phase::Reflect => Err(GatewayError::MissingCredential("anthropic".to_string())),
        _ => standard_answer(model, phase),
    })));

    let (result, events) = run_collecting(&uc, RunCouncilInput::new(council(), "q")).await;
    let run = result.unwrap();

    let tail: Vec<_> = names(&events).into_iter().skip(9).collect();
    assert_eq!(tail, vec!["stage4_start", "error", "cost_summary", "complete"]);
    assert_eq!(run.state(), PipelineState::Complete);
    assert!(run.synthesis().is_some());
    assert!(run.reflection().is_none());
    assert_eq!(run.failure().unwrap().stage, Stage::Reflect);
    assert!(run.to_previous_iteration().is_some());
}

#[tokio::test]
async fn test_shared_rerun_includes_previous_context() {
    let gateway = Arc::new(CouncilGateway::standard());
    let uc = use_case(gateway.clone());
    let previous = PreviousIteration {
        query: "What is Rust?".to_string(),
        system_prompt: None,
        stage3_response: "A systems language.".to_string(),
        critique: "Missed ownership.".to_string(),
    };
    let input = RunCouncilInput::new(council(), "Explain ownership")
        .with_previous_iteration(Some(previous), true);

    let run = uc.execute(input).await.unwrap();

    for (_, prompt) in gateway.prompts(Phase::Collect) {
        assert!(prompt.starts_with("[CONTEXT FROM PREVIOUS ANALYSIS]"));
        assert!(prompt.contains("Missed ownership."));
        assert!(prompt.ends_with("Explain ownership"));
    }
    // Evaluators see the bare query.
    for (_, prompt) in gateway.prompts(Phase::Rank) {
        assert!(!prompt.contains("[CONTEXT FROM PREVIOUS ANALYSIS]"));
    }
    let reflect = gateway.prompts(Phase::Reflect);
    assert!(reflect[0].1.contains("PREVIOUS ITERATION"));
    assert_eq!(
        run.reflection().unwrap().comparison_to_previous.as_deref(),
        Some("More focused than before.")
    );
}

#[tokio::test]
async fn test_unshared_rerun_keeps_previous_private() {
    let gateway = Arc::new(CouncilGateway::standard());
    let uc = use_case(gateway.clone());
    let previous = PreviousIteration {
        query: "old".to_string(),
        system_prompt: None,
        stage3_response: "old answer".to_string(),
        critique: "old critique".to_string(),
    };
    let input =
        RunCouncilInput::new(council(), "new").with_previous_iteration(Some(previous), false);

    let run = uc.execute(input).await.unwrap();

    for (_, prompt) in gateway.prompts(Phase::Collect) {
        assert_eq!(prompt, "new");
    }
    assert!(!gateway.prompts(Phase::Reflect)[0].1.contains("PREVIOUS ITERATION"));
    assert!(run.reflection().unwrap().comparison_to_previous.is_none());
}

#[tokio::test]
async fn test_system_prompt_and_files_reach_stage1_only() {
    let gateway = Arc::new(CouncilGateway::standard());
    let uc = use_case(gateway.clone());
    let input = RunCouncilInput::new(council(), "Summarise")
        .with_system_prompt(Some("You are terse.".to_string()))
        .with_file_context(Some("--- notes.txt ---\nhello".to_string()), Vec::new());

    uc.execute(input).await.unwrap();

    let requests = gateway.requests.lock().unwrap().clone();
    for request in &requests {
        let prompt = prompt_of(request);
        match phase_of(&prompt) {
            Phase::Collect => {
                assert_eq!(request.system_prompt.as_deref(), Some("You are terse."));
                assert!(prompt.starts_with("[ATTACHED FILES]"));
            }
            _ => assert!(request.system_prompt.is_none()),
        }
    }
}

#[tokio::test]
async fn test_cost_is_cumulative() {
    let pricing = PricingTable::empty()
        .with_price("alpha", ModelPrice::new(1, 2))
        .with_price("beta", ModelPrice::new(1, 2))
        .with_price("gamma", ModelPrice::new(1, 2))
        .with_price("chair", ModelPrice::new(10, 10));
    let uc = use_case(Arc::new(CouncilGateway::standard())).with_pricing(pricing);

    let (result, events) = run_collecting(&uc, RunCouncilInput::new(council(), "q")).await;
    let run = result.unwrap();

    let totals: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::CostSummary { data } => Some(data.total.0),
            _ => None,
        })
        .collect();
    // Each member call: 100*1 + 50*2 = 200; chairman calls: 150*10 = 1500.
    assert_eq!(totals, vec![600, 1200, 2700, 4200]);
    assert_eq!(run.cost().total.0, 4200);
    assert_eq!(run.cost().stage(Stage::Rank).0, 600);
}

#[tokio::test]
async fn test_empty_query_rejected() {
    let uc = use_case(Arc::new(CouncilGateway::standard()));
    let result = uc.execute(RunCouncilInput::new(council(), "   ")).await;
    assert!(matches!(result, Err(RunCouncilError::InvalidInput(_))));
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let gateway = Arc::new(CouncilGateway::standard());
    let uc = use_case(gateway.clone());
    let token = CancellationToken::new();
    token.cancel();

    let result = uc
        .execute(RunCouncilInput::new(council(), "q").with_cancellation(token))
        .await;

    assert!(result.unwrap_err().is_cancelled());
    assert!(gateway.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dropped_consumer_stops_run() {
    let gateway = Arc::new(CouncilGateway::standard());
    let uc = use_case(gateway.clone());

    let (rx, handle) = uc.spawn(RunCouncilInput::new(council(), "q"), Arc::new(NoProgress));
    drop(rx);
    let result = handle.await.unwrap();

    assert!(matches!(result, Err(RunCouncilError::Cancelled)));
    assert!(gateway.prompts(Phase::Synthesize).is_empty());
}

#[tokio::test]
async fn test_conversation_log_records() {
    let logger = Arc::new(MemoryConversationLogger::new());
    let uc = use_case(Arc::new(CouncilGateway::standard())).with_conversation_logger(logger.clone());

    uc.execute(RunCouncilInput::new(council(), "q")).await.unwrap();

    assert_eq!(logger.count("council_response"), 3);
    assert_eq!(logger.count("peer_evaluation"), 3);
    assert_eq!(logger.count("synthesis"), 1);
    assert_eq!(logger.count("reflection"), 1);
    assert_eq!(logger.count("cost_summary"), 1);
}
