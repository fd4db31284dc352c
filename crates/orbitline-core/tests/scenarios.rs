//! End-to-end flows through the controller with a recording host.

use orbitline_core::flow::FlowState;
use orbitline_core::id::SpawnHandle;
use orbitline_core::matcher::MatchMode;
use orbitline_core::test_utils::*;
use orbitline_core::timeline::{Day, EventConfig, Loop};
use orbitline_core::{ColorKind, FlowError, Outcome, ShapeKind};

// ===========================================================================
// Single demand
// ===========================================================================

#[test]
fn single_demand_delivers_and_advances() {
    let mut c = controller();
    c.start_loop(single_day_loop(vec![
        gameplay("first_order", vec![red_circle()]),
        narrative("debrief"),
    ]));

    c.on_resource_produced(SpawnHandle(1), ShapeKind::Circle, ColorKind::Red);
    assert!(c.check_demand_satisfaction());
    assert!(c.deliver().is_applied());

    assert_eq!(c.timeline().cursor().event, 1);
    assert_eq!(c.current_event().unwrap().name, "debrief");
}

// ===========================================================================
// Two demands, produced one at a time
// ===========================================================================

#[test]
fn partial_production_is_not_enough() {
    let mut c = controller();
    c.start_loop(single_day_loop(vec![gameplay(
        "pair",
        vec![red_circle(), blue_square()],
    )]));

    c.on_resource_produced(SpawnHandle(1), ShapeKind::Square, ColorKind::Blue);
    assert!(!c.check_demand_satisfaction());
    assert_eq!(c.missing_demands(), vec![red_circle()]);

    c.on_resource_produced(SpawnHandle(2), ShapeKind::Circle, ColorKind::Red);
    assert!(c.check_demand_satisfaction());
    assert!(c.missing_demands().is_empty());
}

#[test]
fn extra_resource_breaks_the_match() {
    let mut c = controller();
    c.start_loop(single_day_loop(vec![gameplay("one", vec![red_circle()])]));

    c.on_resource_produced(SpawnHandle(1), ShapeKind::Circle, ColorKind::Red);
    c.on_resource_produced(SpawnHandle(2), ShapeKind::Triangle, ColorKind::Green);
    assert!(!c.check_demand_satisfaction());

    c.on_resource_removed(SpawnHandle(2));
    assert!(c.check_demand_satisfaction());
}

// ===========================================================================
// Positional sequence
// ===========================================================================

fn sequence_event() -> EventConfig {
    gameplay(
        "sequence",
        vec![
            demand(ShapeKind::Triangle, ColorKind::Red),
            demand(ShapeKind::Circle, ColorKind::Blue),
            demand(ShapeKind::Square, ColorKind::Green),
        ],
    )
    .with_match_mode(MatchMode::Positional)
}

#[test]
fn sequence_in_wrong_order_fails() {
    let mut c = controller();
    c.start_loop(single_day_loop(vec![sequence_event()]));

    c.on_resource_produced(SpawnHandle(1), ShapeKind::Circle, ColorKind::Blue);
    c.on_resource_produced(SpawnHandle(2), ShapeKind::Triangle, ColorKind::Red);
    c.on_resource_produced(SpawnHandle(3), ShapeKind::Square, ColorKind::Green);

    assert!(!c.check_demand_satisfaction());
    assert!(c.missing_demands().is_empty());
    assert!(!c.deliver().is_applied());
}

#[test]
fn sequence_in_order_delivers() {
    let mut c = controller();
    c.start_loop(single_day_loop(vec![sequence_event(), narrative("done")]));

    c.on_resource_produced(SpawnHandle(1), ShapeKind::Triangle, ColorKind::Red);
    c.on_resource_produced(SpawnHandle(2), ShapeKind::Circle, ColorKind::Blue);
    c.on_resource_produced(SpawnHandle(3), ShapeKind::Square, ColorKind::Green);

    assert!(c.deliver().is_applied());
    assert_eq!(c.state(), FlowState::RunningNarrative);
}

#[test]
fn removing_a_middle_slot_keeps_later_handles_addressable() {
    let mut c = controller();
    c.start_loop(single_day_loop(vec![sequence_event()]));

    c.on_resource_produced(SpawnHandle(1), ShapeKind::Triangle, ColorKind::Red);
    c.on_resource_produced(SpawnHandle(2), ShapeKind::Square, ColorKind::Red);
    c.on_resource_produced(SpawnHandle(3), ShapeKind::Circle, ColorKind::Blue);
    c.on_resource_removed(SpawnHandle(2));

    // Handle 3 still refers to the third resource produced.
    assert!(
        c.on_machine_transform(SpawnHandle(3), None, Some(ColorKind::Blue))
            .is_applied()
    );
    c.on_resource_produced(SpawnHandle(4), ShapeKind::Square, ColorKind::Green);
    assert!(c.check_demand_satisfaction());
}

// ===========================================================================
// Exhaustion
// ===========================================================================

#[test]
fn two_events_then_menu() {
    let mut c = controller();
    c.start_loop(Loop::new(
        "loop_one",
        vec![Day::new("day_one", vec![narrative("a"), narrative("b")])],
    ));

    c.advance_event();
    c.advance_event();

    assert!(c.timeline().current_event().is_none());
    assert_eq!(c.state(), FlowState::Exhausted);
    assert_eq!(c.host().count(&HostCall::GotoMenu), 1);
}

// ===========================================================================
// Time-up
// ===========================================================================

#[test]
fn completion_is_refused_during_time_up_interrupt() {
    let mut c = controller();
    c.start_loop(single_day_loop(vec![
        gameplay("rush", vec![red_circle()]).with_time_limit(5.0),
        narrative("never"),
    ]));
    c.on_time_expired();

    assert!(matches!(
        c.complete_current_event(),
        Outcome::Ignored(FlowError::WrongState { .. })
    ));
    assert_eq!(c.timeline().cursor().event, 0);
    assert!(!c.current_event().unwrap().completed);
}

#[test]
fn full_day_with_every_event_kind() {
    let mut c = controller();
    c.start_loop(Loop::new(
        "loop",
        vec![
            Day::new(
                "monday",
                vec![
                    narrative("wake_up"),
                    gameplay("orders", vec![red_circle(), red_circle()]),
                    dialog("boss"),
                ],
            ),
            Day::new("tuesday", vec![narrative("again")]),
        ],
    ));

    let run = c.current_run();
    c.on_narrative_complete(run);
    assert_eq!(c.state(), FlowState::RunningGameplay);

    let handles = c.spawned().to_vec();
    c.on_resource_produced(handles[0], ShapeKind::Triangle, ColorKind::Red);
    c.on_resource_produced(handles[1], ShapeKind::Circle, ColorKind::Green);
    c.on_machine_transform(handles[0], Some(ShapeKind::Circle), None);
    c.on_machine_transform(handles[1], None, Some(ColorKind::Red));
    assert!(c.deliver().is_applied());

    assert_eq!(c.state(), FlowState::RunningDialog);
    let (_, run) = c.host().dialogs().last().cloned().unwrap();
    c.on_dialog_complete(run);

    assert_eq!(c.timeline().cursor().day, 1);
    assert_eq!(c.host().count(&HostCall::GotoDay), 2);
    let monday = &c.timeline().current_loop().days[0];
    assert!(monday.events.iter().all(|e| e.completed));
}
