//! End-to-end transition tests driven by explicit ticks

use std::cell::RefCell;
use std::rc::Rc;

use eqform::{
    CurveDirection, Equation, EquationConfig, FormOptions, GoToForm, MotionMode, MotionPath,
    OverrideOptions, PropertyPatch, PulseConfig, RestartPolicy, StageKind, StopMode,
    TransitionOutcome,
};
use eqform_core::{Color, Element, ElementId, Point, SceneCollection, SceneElement, Transform};
use eqform_layout::FixedAdvanceMetrics;

const DT: f32 = 0.01;

fn equation_with(config: EquationConfig) -> Equation {
    let mut eq = Equation::with_metrics(config, FixedAdvanceMetrics::new(0.04));
    for name in ["a", "b", "c"] {
        eq.add_element(Element::text(name, name));
    }
    eq
}

/// `f1 = a b`, `f2 = b a`, `f3 = c`
fn equation() -> Equation {
    let mut eq = equation_with(EquationConfig::default());
    eq.add_form("f1", vec!["a", "b"], FormOptions::new()).unwrap();
    eq.add_form("f2", vec!["b", "a"], FormOptions::new()).unwrap();
    eq.add_form("f3", vec!["c"], FormOptions::new()).unwrap();
    eq
}

fn id(eq: &Equation, name: &str) -> ElementId {
    eq.element(name).unwrap()
}

fn x_of(eq: &Equation, name: &str) -> f32 {
    eq.scene().get(id(eq, name)).unwrap().transform().translation.x
}

fn visible(eq: &Equation, name: &str) -> bool {
    eq.scene().is_visible(id(eq, name))
}

fn ticks(eq: &mut Equation, n: usize) {
    for _ in 0..n {
        eq.tick(DT);
    }
}

fn recorder() -> (Rc<RefCell<Vec<TransitionOutcome>>>, impl FnOnce(TransitionOutcome)) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    (log, move |o| sink.borrow_mut().push(o))
}

#[test]
fn test_sequence_positions() {
    let mut eq = equation_with(EquationConfig::default());
    eq.add_form("abc", vec!["a", "b", "c"], FormOptions::new()).unwrap();
    eq.show_form("abc");

    assert!((x_of(&eq, "a") - 0.0).abs() < 1e-6);
    assert!((x_of(&eq, "b") - 0.04).abs() < 1e-6);
    assert!((x_of(&eq, "c") - 0.08).abs() < 1e-6);
    assert_eq!(eq.scene().shown_elements().len(), 3);
}

#[test]
fn test_zero_duration_is_synchronous() {
    let mut eq = equation();
    eq.show_form("f1");
    let (log, done) = recorder();

    eq.go_to_form(GoToForm::name("f3").with_duration(0.0).with_callback(done));

    assert!(!eq.is_animating());
    assert_eq!(*log.borrow(), vec![TransitionOutcome::Finished]);
    assert!(visible(&eq, "c"));
    assert!(!visible(&eq, "a"));
    assert!(!visible(&eq, "b"));
    assert_eq!(eq.current_form_name(), Some("f3"));
}

#[test]
fn test_dissolve_timing() {
    let mut eq = equation();
    eq.show_form("f1");
    let (log, done) = recorder();

    eq.go_to_form(
        GoToForm::name("f3")
            .with_duration(1.0)
            .with_animate(MotionMode::Dissolve)
            .with_callback(done),
    );
    let plan = eq.transition();
    assert_eq!(plan.planned(StageKind::FadeOut), Some(0.4));
    assert!((plan.planned(StageKind::Blank).unwrap() - 0.2).abs() < 1e-6);
    assert_eq!(plan.planned(StageKind::FadeIn), Some(0.4));
    assert_eq!(eq.current_form_name(), Some("f3"));

    ticks(&mut eq, 39);
    assert!(visible(&eq, "a"));
    ticks(&mut eq, 2);
    assert!(!visible(&eq, "a"));
    assert!(!visible(&eq, "c"));

    ticks(&mut eq, 14);
    assert!(!visible(&eq, "c"));
    ticks(&mut eq, 10);
    assert!(visible(&eq, "c"));
    let opacity = eq.scene().get(id(&eq, "c")).unwrap().opacity();
    assert!(opacity > 0.0 && opacity < 1.0);
    assert!(log.borrow().is_empty());

    ticks(&mut eq, 40);
    assert!(!eq.is_animating());
    assert_eq!(*log.borrow(), vec![TransitionOutcome::Finished]);
    assert_eq!(eq.scene().get(id(&eq, "c")).unwrap().opacity(), 1.0);
}

#[test]
fn test_move_uses_velocity() {
    let mut eq = equation();
    eq.show_form("f1");
    eq.go_to_form(GoToForm::name("f2"));

    assert_eq!(eq.transition().diff().to_move.len(), 2);
    assert!(eq.transition().diff().to_show.is_empty());
    assert!(eq.transition().diff().to_hide.is_empty());

    // 0.04 units at 0.35 units/s
    ticks(&mut eq, 10);
    assert!(eq.is_animating());
    let ax = x_of(&eq, "a");
    assert!(ax > 0.0 && ax < 0.04);
    ticks(&mut eq, 3);
    assert!(!eq.is_animating());
    assert!((x_of(&eq, "a") - 0.04).abs() < 1e-6);
    assert!(x_of(&eq, "b").abs() < 1e-6);
}

#[test]
fn test_move_fades_out_before_moving() {
    let mut eq = equation_with(EquationConfig::default());
    eq.add_form("ab", vec!["a", "b"], FormOptions::new()).unwrap();
    eq.add_form("b", vec!["b"], FormOptions::new()).unwrap();
    eq.show_form("ab");

    eq.go_to_form(GoToForm::name("b").with_duration(1.0));
    ticks(&mut eq, 20);
    assert!(visible(&eq, "a"));
    assert!((x_of(&eq, "b") - 0.04).abs() < 1e-6);

    ticks(&mut eq, 30);
    assert!(!visible(&eq, "a"));
    assert!(x_of(&eq, "b") < 0.04);

    while eq.tick(DT) {}
    assert_eq!(eq.current_form_name(), Some("b"));
    assert!(x_of(&eq, "b").abs() < 1e-6);
}

#[test]
fn test_skip_to_target_while_animating() {
    let mut eq = equation();
    eq.show_form("f1");
    let (log, done) = recorder();
    eq.go_to_form(GoToForm::name("f2").with_duration(1.0).with_callback(done));
    ticks(&mut eq, 10);
    assert!(eq.is_animating());

    // default policy: complete the running transition and drop this request
    eq.go_to_form(GoToForm::name("f3"));
    assert!(!eq.is_animating());
    assert_eq!(*log.borrow(), vec![TransitionOutcome::Cancelled]);
    assert_eq!(eq.current_form_name(), Some("f2"));
    assert!((x_of(&eq, "a") - 0.04).abs() < 1e-6);
    assert!(!visible(&eq, "c"));
}

#[test]
fn test_cancel_and_proceed_while_animating() {
    let mut eq = equation();
    eq.show_form("f1");
    let (log, done) = recorder();
    eq.go_to_form(GoToForm::name("f2").with_duration(1.0).with_callback(done));
    ticks(&mut eq, 30);
    let frozen = x_of(&eq, "a");
    assert!(frozen > 0.0 && frozen < 0.04);

    let (next_log, next_done) = recorder();
    eq.go_to_form(
        GoToForm::name("f1")
            .with_duration(0.5)
            .with_if_animating(false, false)
            .with_callback(next_done),
    );
    assert!(eq.is_animating());
    assert!((x_of(&eq, "a") - frozen).abs() < 1e-6);

    while eq.tick(DT) {}
    assert!(log.borrow().is_empty());
    assert_eq!(*next_log.borrow(), vec![TransitionOutcome::Finished]);
    assert!(x_of(&eq, "a").abs() < 1e-6);
    assert_eq!(eq.current_form_name(), Some("f1"));
}

#[test]
fn test_request_stop_completes_at_tick() {
    let mut eq = equation();
    eq.show_form("f1");
    let (log, done) = recorder();
    eq.go_to_form(GoToForm::name("f3").with_duration(1.0).with_callback(done));
    ticks(&mut eq, 5);

    eq.request_stop(StopMode::Complete);
    assert!(eq.is_animating());
    assert!(log.borrow().is_empty());

    eq.tick(DT);
    assert!(!eq.is_animating());
    assert_eq!(*log.borrow(), vec![TransitionOutcome::Cancelled]);
    assert!(visible(&eq, "c"));
    assert!(!visible(&eq, "a"));
}

#[test]
fn test_series_wrap_uses_restart_mode() {
    let mut eq = equation_with(EquationConfig::default());
    eq.add_form("0", vec!["a"], FormOptions::new()).unwrap();
    eq.add_form("1", vec!["b"], FormOptions::new()).unwrap();
    eq.show_form("1");

    eq.next_form(None, 0.0);
    assert_eq!(eq.current_form_name(), Some("0"));
    assert_eq!(eq.navigator().index_of_current(), Some(0));
    assert_eq!(eq.transition().mode(), Some(MotionMode::Dissolve));

    while eq.tick(DT) {}
    assert!(visible(&eq, "a"));
    assert!(!visible(&eq, "b"));

    eq.next_form(None, 0.0);
    assert_eq!(eq.transition().mode(), Some(MotionMode::Move));
    assert_eq!(eq.current_form_name(), Some("1"));
}

#[test]
fn test_custom_series() {
    let mut eq = equation();
    eq.add_form_series("short", ["f3", "f1"]);
    eq.show_form("f3");

    eq.next_form(Some(0.0), 0.0);
    assert_eq!(eq.current_form_name(), Some("f1"));
    eq.next_form(Some(0.0), 0.0);
    assert_eq!(eq.current_form_name(), Some("f3"));

    // f2 is outside the active series
    eq.show_form("f2");
    eq.next_form(Some(0.0), 0.0);
    assert_eq!(eq.current_form_name(), Some("f2"));
}

#[test]
fn test_prev_uses_from_next_override() {
    let mut eq = equation_with(EquationConfig::default());
    eq.add_form(
        "f1",
        vec!["a", "b"],
        FormOptions::new().from_next(OverrideOptions::new().with_duration(0.0)),
    )
    .unwrap();
    eq.add_form("f2", vec!["b", "a"], FormOptions::new()).unwrap();
    eq.show_form("f2");

    eq.prev_form(Some(2.0), 0.0);
    assert!(!eq.is_animating());
    assert_eq!(eq.current_form_name(), Some("f1"));
    assert!(x_of(&eq, "a").abs() < 1e-6);
}

#[test]
fn test_replay_current_form() {
    let mut eq = equation();
    eq.show_form("f2");

    eq.replay_current_form(Some(0.5));
    assert!(eq.is_animating());
    assert_eq!(eq.current_form_name(), Some("f2"));
    // jumped back to f1; the forward move waits for the replay delay
    ticks(&mut eq, 40);
    assert!(x_of(&eq, "a").abs() < 1e-6);

    while eq.tick(DT) {}
    assert!((x_of(&eq, "a") - 0.04).abs() < 1e-6);

    // while animating a replay completes the running transition
    eq.replay_current_form(Some(0.5));
    eq.replay_current_form(Some(0.5));
    assert!(!eq.is_animating());
    assert!((x_of(&eq, "a") - 0.04).abs() < 1e-6);
}

#[test]
fn test_unknown_names_are_ignored() {
    let mut eq = equation();
    eq.show_form("f1");
    let (log, done) = recorder();

    eq.go_to_form(GoToForm::name("nope").with_callback(done));
    eq.show_form("nope");
    eq.go_to_form(GoToForm::index(99));

    assert!(!eq.is_animating());
    assert!(log.borrow().is_empty());
    assert_eq!(eq.current_form_name(), Some("f1"));

    eq.add_form("partial", vec!["a", "missing"], FormOptions::new().with_mod("ghost", PropertyPatch::opacity(0.5)))
        .unwrap();
    assert_eq!(eq.form("partial").unwrap().elements, vec![id(&eq, "a")]);
}

#[test]
fn test_element_mods_applied_after_fade_out() {
    let mut eq = equation_with(EquationConfig::default());
    eq.add_form("f1", vec!["a", "b"], FormOptions::new()).unwrap();
    eq.add_form(
        "f2",
        vec!["b"],
        FormOptions::new().with_mod("b", PropertyPatch::color(Color::RED)),
    )
    .unwrap();
    eq.show_form("f1");

    eq.go_to_form(GoToForm::name("f2").with_duration(1.0));
    ticks(&mut eq, 20);
    assert_ne!(eq.scene().get(id(&eq, "b")).unwrap().color(), Color::RED);
    ticks(&mut eq, 25);
    assert_eq!(eq.scene().get(id(&eq, "b")).unwrap().color(), Color::RED);
}

#[test]
fn test_curved_motion_leaves_the_baseline() {
    let mut eq = equation_with(EquationConfig::default());
    eq.add_form("f1", vec!["a", "b"], FormOptions::new()).unwrap();
    eq.add_form(
        "f2",
        vec!["b", "a"],
        FormOptions::new().with_motion("a", MotionPath::curved(CurveDirection::Up, 0.5)),
    )
    .unwrap();
    eq.show_form("f1");

    eq.go_to_form(GoToForm::name("f2").with_duration(1.0));
    ticks(&mut eq, 50);
    let a = eq.scene().get(id(&eq, "a")).unwrap().transform();
    let b = eq.scene().get(id(&eq, "b")).unwrap().transform();
    assert!(a.translation.y.abs() > 1e-4);
    assert!(b.translation.y.abs() < 1e-6);

    while eq.tick(DT) {}
    assert!(eq.scene().get(id(&eq, "a")).unwrap().transform().translation.y.abs() < 1e-5);
}

#[test]
fn test_move_from_restart() {
    let config = EquationConfig::default().with_restart(RestartPolicy::move_from(Point::new(0.0, -1.0)));
    let mut eq = equation_with(config);
    eq.add_form("0", vec!["a"], FormOptions::new()).unwrap();
    eq.add_form("1", vec!["b"], FormOptions::new()).unwrap();
    eq.show_form("1");

    eq.next_form(Some(1.0), 0.0);
    assert_eq!(eq.transition().mode(), Some(MotionMode::MoveFrom));
    ticks(&mut eq, 60);
    assert!(visible(&eq, "a"));
    assert!(!visible(&eq, "b"));
    assert!(eq.scene().transform().translation.y < 0.0);

    while eq.tick(DT) {}
    assert_eq!(eq.scene().transform(), Transform::IDENTITY);
}

#[test]
fn test_pulse_restart() {
    let config = EquationConfig::default().with_restart(RestartPolicy::pulse(PulseConfig::default()));
    let mut eq = equation_with(config);
    eq.add_form("0", vec!["a", "b"], FormOptions::new()).unwrap();
    eq.add_form("1", vec!["c"], FormOptions::new()).unwrap();
    eq.show_form("1");

    eq.next_form(Some(1.0), 0.0);
    assert_eq!(eq.transition().mode(), Some(MotionMode::Pulse));
    assert_eq!(eq.transition().planned(StageKind::Pulse), Some(1.0));

    // dissolve takes one second, then the pulse peaks half a second later
    ticks(&mut eq, 150);
    let scale = eq.scene().transform().scale;
    assert!(scale.x > 1.05);

    while eq.tick(DT) {}
    let t = eq.scene().transform();
    assert!((t.scale.x - 1.0).abs() < 1e-4);
    assert!(t.translation.length() < 1e-4);
}

#[test]
fn test_animate_to_form_replaces_running_transition() {
    let mut eq = equation();
    eq.show_form("f1");
    let (log, done) = recorder();
    eq.go_to_form(GoToForm::name("f2").with_duration(1.0).with_callback(done));
    ticks(&mut eq, 10);

    eq.animate_to_form("f1", Some(0.2), 0.0);
    assert!(eq.is_animating());
    while eq.tick(DT) {}
    assert!(log.borrow().is_empty());
    assert_eq!(eq.current_form_name(), Some("f1"));
    assert!(x_of(&eq, "a").abs() < 1e-6);
}

#[test]
fn test_move_from_without_restart_point_dissolves() {
    let mut eq = equation_with(EquationConfig::default());
    eq.add_form("0", vec!["a"], FormOptions::new()).unwrap();
    eq.add_form("1", vec!["b"], FormOptions::new()).unwrap();
    eq.show_form("1");

    eq.go_to_form(GoToForm::name("0").with_animate(MotionMode::MoveFrom).with_duration(1.0));
    assert_eq!(eq.transition().mode(), Some(MotionMode::Dissolve));
    assert_eq!(eq.transition().planned(StageKind::MoveCollection), None);
    assert_eq!(eq.transition().planned(StageKind::FadeOut), Some(0.4));
    assert_eq!(eq.transition().planned(StageKind::Blank), Some(0.2));
    assert_eq!(eq.transition().planned(StageKind::FadeIn), Some(0.4));

    ticks(&mut eq, 45);
    assert!(!visible(&eq, "a"));
    assert!(!visible(&eq, "b"));

    ticks(&mut eq, 20);
    let a = eq.scene().get(id(&eq, "a")).unwrap();
    assert!(a.is_visible() && a.opacity() < 1.0);

    while eq.tick(DT) {}
    assert_eq!(eq.scene().get(id(&eq, "a")).unwrap().opacity(), 1.0);
    assert_eq!(eq.scene().transform(), Transform::IDENTITY);
}

#[test]
fn test_pulse_without_pulse_config_dissolves() {
    let mut eq = equation_with(EquationConfig::default());
    eq.add_form("0", vec!["a"], FormOptions::new()).unwrap();
    eq.add_form("1", vec!["b"], FormOptions::new()).unwrap();
    eq.show_form("1");

    eq.go_to_form(GoToForm::name("0").with_animate(MotionMode::Pulse).with_duration(1.0));
    assert_eq!(eq.transition().mode(), Some(MotionMode::Dissolve));
    assert_eq!(eq.transition().planned(StageKind::Pulse), None);

    while eq.tick(DT) {}
    assert!(visible(&eq, "a"));
    assert_eq!(eq.scene().transform(), Transform::IDENTITY);
}

#[test]
fn test_form_hooks_fire_around_transitions() {
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    let hook = |tag: &'static str| {
        let log = log.clone();
        move |form: &str| log.borrow_mut().push(format!("{}:{}", tag, form))
    };

    let mut eq = equation_with(EquationConfig::default());
    eq.add_form("f1", vec!["a", "b"], FormOptions::new()).unwrap();
    eq.add_form(
        "f2",
        vec!["b", "a"],
        FormOptions::new()
            .on_transition(hook("transition"))
            .on_show(hook("show"))
            .from_form("f1", OverrideOptions::new().on_transition(hook("from_f1"))),
    )
    .unwrap();
    eq.add_form("f3", vec!["c"], FormOptions::new()).unwrap();

    // jumps run no hooks
    eq.show_form("f3");
    eq.go_to_form(GoToForm::name("f2").with_duration(0.0));
    assert!(log.borrow().is_empty());

    eq.show_form("f3");
    let sink = log.clone();
    eq.go_to_form(
        GoToForm::name("f2")
            .with_duration(0.5)
            .with_callback(move |_| sink.borrow_mut().push("done".to_string())),
    );
    assert_eq!(*log.borrow(), vec!["transition:f2"]);
    while eq.tick(DT) {}
    assert_eq!(*log.borrow(), vec!["transition:f2", "show:f2", "done"]);

    // arriving from f1 uses the override's transition hook
    log.borrow_mut().clear();
    eq.show_form("f1");
    eq.go_to_form(GoToForm::name("f2").with_duration(0.5));
    assert_eq!(*log.borrow(), vec!["from_f1:f2"]);
    while eq.tick(DT) {}
    assert_eq!(*log.borrow(), vec!["from_f1:f2", "show:f2"]);
}
