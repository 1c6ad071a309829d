//! Reveal Scenario Tests
//!
//! End-to-end checks of the renderer, the list aggregator and the
//! controller against a logical clock. Nothing here sleeps: time moves only
//! through `TimerQueue::pop_due` and `RevealController::advance`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use reveal_core::{
    CharacterStreamRenderer, CompletionCallback, ListItemAggregator, RendererId,
    RevealController, RevealSettings, SequencerPhase, Stage, StageContent, StageSource,
    StructuredResult, TimerQueue,
};

const INTERVAL: Duration = Duration::from_millis(10);

// =============================================================================
// Helpers
// =============================================================================

fn counting_hook(count: &Arc<AtomicUsize>) -> CompletionCallback {
    let count = Arc::clone(count);
    Box::new(move || {
        count.fetch_add(1, Ordering::SeqCst);
    })
}

/// Fire every due timer for a single renderer, returning how many fired
fn drain(renderer: &mut CharacterStreamRenderer, timers: &mut TimerQueue<RendererId>) -> usize {
    let mut fired = 0;
    while let Some((handle, _)) = timers.pop_due(Duration::MAX) {
        if renderer.on_timer(handle, timers) {
            fired += 1;
        }
    }
    fired
}

/// Everything a stage reveals once it has finished, list items one per line
fn full_text(result: &StructuredResult, stage: Stage, search_complete: &str) -> String {
    match result.source_for(stage, search_complete) {
        StageSource::Text(text) => text.to_string(),
        StageSource::List(items) => items.join("\n"),
    }
}

fn settings() -> RevealSettings {
    RevealSettings::default()
        .with_char_delay(INTERVAL)
        .with_list_item_char_delay(INTERVAL)
}

fn scenario_result() -> StructuredResult {
    StructuredResult::new("Q")
        .with_refined_questions(["A", "B"])
        .with_thinking("T")
        .with_final_answer("F")
        .with_citations(Vec::<String>::new())
}

const BASE_ORDER: [Stage; 6] = [
    Stage::OriginalQuestion,
    Stage::RefinedThinking,
    Stage::RefinedQuestions,
    Stage::SearchComplete,
    Stage::ThinkingProcess,
    Stage::FinalAnswer,
];

// =============================================================================
// Character Stream Renderer
// =============================================================================

#[test]
fn test_renderer_completes_once_after_one_reveal_per_code_point() {
    for text in ["", "x", "hello", "héllo 世界", "🦀🦀"] {
        let mut timers = TimerQueue::new();
        let mut renderer = CharacterStreamRenderer::new(RendererId::text(Stage::FinalAnswer));
        let count = Arc::new(AtomicUsize::new(0));

        renderer.start(text, INTERVAL, &mut timers, Some(counting_hook(&count)));
        let reveals = drain(&mut renderer, &mut timers);

        assert_eq!(reveals, text.chars().count(), "reveals for {text:?}");
        assert_eq!(count.load(Ordering::SeqCst), 1, "completions for {text:?}");
        assert_eq!(renderer.revealed(), text);
        assert!(!renderer.is_active());
    }
}

#[test]
fn test_empty_text_completes_without_ticks() {
    let mut timers = TimerQueue::new();
    let mut renderer = CharacterStreamRenderer::new(RendererId::text(Stage::FinalAnswer));
    let count = Arc::new(AtomicUsize::new(0));

    renderer.start("", INTERVAL, &mut timers, Some(counting_hook(&count)));

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(timers.is_empty());
    assert_eq!(timers.now(), Duration::ZERO);
}

#[test]
fn test_second_start_does_not_disturb_progress() {
    let mut timers = TimerQueue::new();
    let mut renderer = CharacterStreamRenderer::new(RendererId::text(Stage::FinalAnswer));
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    renderer.start("abcd", INTERVAL, &mut timers, Some(counting_hook(&first)));
    let (handle, _) = timers.pop_due(INTERVAL).unwrap();
    renderer.on_timer(handle, &mut timers);
    assert_eq!(renderer.revealed(), "a");

    assert!(!renderer.start("zzzz", INTERVAL, &mut timers, Some(counting_hook(&second))));
    assert_eq!(renderer.revealed(), "a");
    assert_eq!(renderer.source(), "abcd");
    assert_eq!(timers.len(), 1);

    drain(&mut renderer, &mut timers);
    assert_eq!(renderer.revealed(), "abcd");
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

#[test]
fn test_reset_then_start_emits_nothing_from_old_text() {
    let mut timers = TimerQueue::new();
    let mut renderer = CharacterStreamRenderer::new(RendererId::text(Stage::FinalAnswer));
    let old = Arc::new(AtomicUsize::new(0));

    renderer.start("old text", INTERVAL, &mut timers, Some(counting_hook(&old)));
    for _ in 0..3 {
        let (handle, _) = timers.pop_due(Duration::MAX).unwrap();
        renderer.on_timer(handle, &mut timers);
    }
    assert_eq!(renderer.revealed(), "old");

    renderer.reset(&mut timers);
    assert_eq!(renderer.revealed(), "");
    renderer.start("new", INTERVAL, &mut timers, None);

    let mut seen = Vec::new();
    while let Some((handle, _)) = timers.pop_due(Duration::MAX) {
        renderer.on_timer(handle, &mut timers);
        seen.push(renderer.revealed().to_string());
    }
    assert_eq!(seen, vec!["n", "ne", "new"]);
    assert_eq!(old.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cancelled_callback_never_fires() {
    let mut timers = TimerQueue::new();
    let mut renderer = CharacterStreamRenderer::new(RendererId::text(Stage::FinalAnswer));
    let count = Arc::new(AtomicUsize::new(0));

    renderer.start("ab", INTERVAL, &mut timers, Some(counting_hook(&count)));
    let (handle, _) = timers.pop_due(Duration::MAX).unwrap();
    renderer.on_timer(handle, &mut timers);

    // Cancel while the final reveal is pending
    renderer.stop(&mut timers);
    assert!(timers.pop_due(Duration::MAX).is_none());
    assert!(!renderer.on_timer(handle, &mut timers));
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(renderer.revealed(), "a");
}

// =============================================================================
// List Item Aggregator
// =============================================================================

#[test]
fn test_aggregate_completion_for_zero_one_and_many_items() {
    let cases: [&[&str]; 3] = [&[], &["abc"], &["a", "bb", "ccc"]];
    for items in cases {
        let items: Vec<String> = items.iter().map(|s| (*s).to_string()).collect();
        let mut timers = TimerQueue::new();
        let mut agg = ListItemAggregator::new(Stage::RefinedQuestions);
        let count = Arc::new(AtomicUsize::new(0));

        agg.start(&items, INTERVAL, &mut timers, counting_hook(&count));

        let last_len = items.last().map_or(0, |s| s.chars().count());
        let mut completed_at = (count.load(Ordering::SeqCst) == 1).then_some(Duration::ZERO);
        while let Some((handle, id)) = timers.pop_due(Duration::MAX) {
            agg.on_timer(id, handle, &mut timers);
            if completed_at.is_none() && count.load(Ordering::SeqCst) == 1 {
                completed_at = Some(handle.deadline());
            }
        }

        assert_eq!(count.load(Ordering::SeqCst), 1, "items {items:?}");
        assert_eq!(completed_at, Some(INTERVAL * last_len as u32), "items {items:?}");
    }
}

// =============================================================================
// Controller Scenarios
// =============================================================================

#[test]
fn test_end_to_end_without_citations() {
    let mut controller = RevealController::new(settings());
    controller.install(scenario_result());

    assert_eq!(controller.plan().stages(), &BASE_ORDER);
    assert_eq!(controller.state().visible_stages, vec![Stage::OriginalQuestion]);

    // "Q" done at 10ms; empty thinking passes straight through to the list
    controller.advance(INTERVAL);
    assert_eq!(controller.active_stage(), Some(Stage::RefinedQuestions));
    assert_eq!(&controller.state().visible_stages[..], &BASE_ORDER[..3]);

    // Both items reveal their only character at 20ms; "B" completes the list
    controller.advance(INTERVAL);
    assert_eq!(controller.active_stage(), Some(Stage::SearchComplete));
    let snapshot = controller.snapshot();
    assert_eq!(
        snapshot.stage(Stage::RefinedQuestions).unwrap().content,
        StageContent::Items(vec!["A".into(), "B".into()])
    );

    controller.run_to_completion();
    assert!(controller.is_done());
    assert_eq!(controller.state().visible_stages, BASE_ORDER.to_vec());

    let snapshot = controller.snapshot();
    assert!(snapshot.stage(Stage::Citations).is_none());
    assert_eq!(snapshot.stage(Stage::ThinkingProcess).unwrap().text(), "T");
    assert_eq!(snapshot.stage(Stage::FinalAnswer).unwrap().text(), "F");
    assert_eq!(
        snapshot.stage(Stage::SearchComplete).unwrap().text(),
        settings().search_complete_text
    );
}

#[test]
fn test_list_completion_bound_to_last_item() {
    let mut controller = RevealController::new(settings());
    controller.install(StructuredResult::new("").with_refined_questions(["a long item", "B"]));
    assert_eq!(controller.active_stage(), Some(Stage::RefinedQuestions));

    controller.advance(INTERVAL);

    // "B" is done, so the sequencer moves on while the first item still types
    assert_eq!(controller.active_stage(), Some(Stage::SearchComplete));
    let snapshot = controller.snapshot();
    assert_eq!(
        snapshot.stage(Stage::RefinedQuestions).unwrap().content,
        StageContent::Items(vec!["a".into(), "B".into()])
    );

    controller.run_to_completion();
    assert_eq!(
        controller.snapshot().stage(Stage::RefinedQuestions).unwrap().text(),
        "a long item\nB"
    );
}

#[test]
fn test_end_to_end_with_citations() {
    let mut controller = RevealController::new(settings());
    controller.install(scenario_result().with_citations(["c1"]));

    let mut expected = BASE_ORDER.to_vec();
    expected.push(Stage::Citations);
    assert_eq!(controller.plan().stages(), &expected[..]);

    // Citations stay hidden until the final answer is done
    while controller.active_stage() != Some(Stage::FinalAnswer) {
        let next = controller.next_deadline().unwrap();
        controller.advance(next);
    }
    assert!(!controller.state().is_visible(Stage::Citations));

    controller.run_to_completion();
    assert!(controller.is_done());
    assert_eq!(controller.state().visible_stages, expected);
    assert_eq!(
        controller.snapshot().stage(Stage::Citations).unwrap().content,
        StageContent::Items(vec!["c1".into()])
    );
}

#[test]
fn test_stages_activate_strictly_in_order() {
    let result = StructuredResult::new("question")
        .with_refined_thinking("thinking")
        .with_refined_questions(["one", "two"])
        .with_thinking("more")
        .with_final_answer("answer")
        .with_citations(["src"]);
    let search_complete = settings().search_complete_text;
    let mut controller = RevealController::new(settings());
    controller.install(result.clone());

    let mut order = vec![controller.active_stage().unwrap()];
    while let Some(next) = controller.next_deadline() {
        controller.advance(next);
        let snapshot = controller.snapshot();

        // Every stage shown before the active one has finished typing
        for view in snapshot.visible().filter(|v| !v.active) {
            assert_eq!(
                view.text(),
                full_text(&result, view.stage, &search_complete),
                "{} visible before it finished",
                view.stage
            );
        }
        if let Some(stage) = controller.active_stage() {
            if order.last() != Some(&stage) {
                order.push(stage);
            }
        }
    }

    assert_eq!(order, controller.plan().stages());
    assert!(controller.is_done());
}

#[test]
fn test_new_install_supersedes_running_sequence() {
    let mut controller = RevealController::new(settings());
    controller.install(
        StructuredResult::new("first question")
            .with_refined_thinking("first thinking")
            .with_refined_questions(["first a", "first b"])
            .with_final_answer("first answer"),
    );
    controller.advance(INTERVAL * 20);
    assert!(controller.state().is_visible(Stage::RefinedThinking));
    let r1_generation = controller.state().generation;

    controller.install(StructuredResult::new("2nd").with_final_answer("done"));

    assert_eq!(controller.state().generation, r1_generation + 1);
    assert_eq!(controller.phase(), SequencerPhase::Active(0));
    assert_eq!(controller.state().visible_stages, vec![Stage::OriginalQuestion]);
    // Only the new question's first reveal is pending
    assert_eq!(controller.pending_timers(), 1);
    assert_eq!(controller.next_deadline(), Some(INTERVAL));

    let mut observed = Vec::new();
    while let Some(next) = controller.next_deadline() {
        controller.advance(next);
        observed.extend(controller.snapshot().stages.iter().map(|v| v.text()));
    }

    assert!(controller.is_done());
    assert!(
        observed.iter().all(|text| !text.contains("first")),
        "stale text leaked: {observed:?}"
    );
    assert_eq!(
        controller.snapshot().stage(Stage::FinalAnswer).unwrap().text(),
        "done"
    );
}

#[test]
fn test_reinstall_during_list_stage() {
    let mut controller = RevealController::new(settings());
    controller.install(StructuredResult::new("").with_refined_questions(["xyz", "uvw"]));
    controller.advance(INTERVAL * 2);
    assert_eq!(controller.active_stage(), Some(Stage::RefinedQuestions));

    controller.install(StructuredResult::new("Q"));
    controller.advance(INTERVAL);

    // Nothing of the old list survives
    assert_eq!(controller.active_stage(), Some(Stage::SearchComplete));
    assert_eq!(
        controller.snapshot().stage(Stage::RefinedQuestions).unwrap().content,
        StageContent::Items(Vec::new())
    );
}
