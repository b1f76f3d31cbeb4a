//! Tests for the locator, click dispatch and routine runner

use crate::error::AutomationError;
use crate::input::{ClickConfig, ClickDispatcher};
use crate::routine::{
    Locator, Routine, RoutineConfig, RoutineStep, default_steps,
};
use crate::template_matching::{MatchConfig, Point, Template, TemplateMatcher};
use crate::testing::{
    FakeScreen, RecordingPointer, RecordingSleeper, TestDir, noise_image, paste,
};
use image::RgbImage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::time::Duration;

fn frame_with(patch: &RgbImage, x: u32, y: u32) -> RgbImage {
    let mut frame = noise_image(100, 100, 1);
    paste(&mut frame, patch, x, y);
    frame
}

fn locator(screen: FakeScreen) -> Locator<FakeScreen, RecordingSleeper> {
    Locator::new(screen, RecordingSleeper::default(), MatchConfig::default())
}

fn clicker(pointer: RecordingPointer) -> ClickDispatcher<RecordingPointer> {
    ClickDispatcher::with_rng(pointer, ClickConfig::default(), StdRng::seed_from_u64(7))
}

fn routine(
    screen: FakeScreen,
    pic_dir: PathBuf,
) -> Routine<FakeScreen, RecordingPointer, RecordingSleeper> {
    Routine::with_rng(
        locator(screen),
        clicker(RecordingPointer::default()),
        RoutineConfig {
            pic_dir,
            ..RoutineConfig::default()
        },
        StdRng::seed_from_u64(11),
    )
}

#[test]
fn test_locate_exact_match_in_one_attempt() {
    let patch = noise_image(10, 10, 2);
    let mut locator = locator(FakeScreen::new(frame_with(&patch, 40, 40)));

    let found = locator
        .locate(&Template::from_image("button", patch))
        .unwrap()
        .expect("template on screen");

    assert_eq!(found.position, Point::new(45, 45));
    assert_eq!(found.score, 1.0);
    assert_eq!(locator.screen().captures, 1);
    assert!(locator.sleeper().recorded().is_empty());
}

#[test]
fn test_locate_offsets_by_frame_origin() {
    let patch = noise_image(10, 10, 2);
    let screen = FakeScreen::new(frame_with(&patch, 40, 40)).with_origin(Point::new(-1280, 0));
    let mut locator = locator(screen);

    let found = locator
        .locate(&Template::from_image("button", patch))
        .unwrap()
        .unwrap();
    assert_eq!(found.position, Point::new(-1280 + 45, 45));
}

#[test]
fn test_locate_maps_backing_pixels_to_pointer_units() {
    let patch = noise_image(10, 10, 2);
    let screen = FakeScreen::new(frame_with(&patch, 40, 40))
        .with_origin(Point::new(100, 0))
        .with_scale(2.0);
    let mut locator = locator(screen);

    let found = locator
        .locate(&Template::from_image("button", patch))
        .unwrap()
        .unwrap();

    // Center (45, 45) in backing pixels is (22.5, 22.5) in points
    assert_eq!(found.position, Point::new(100 + 23, 23));
}

#[test]
fn test_locate_accepts_score_equal_to_threshold() {
    let frame = noise_image(100, 100, 1);
    let template = Template::from_image("near", noise_image(10, 10, 3));
    let best = TemplateMatcher::from_config(&MatchConfig::default())
        .best_match(&frame, &template)
        .unwrap();

    let mut at_threshold = Locator::new(
        FakeScreen::new(frame.clone()),
        RecordingSleeper::default(),
        MatchConfig {
            confidence_threshold: best.correlation,
            ..MatchConfig::default()
        },
    );
    let found = at_threshold.locate(&template).unwrap().expect("score equals threshold");
    assert_eq!(found.score, best.correlation);
    assert_eq!(found.position, Point::new(best.x as i32 + 5, best.y as i32 + 5));
    assert_eq!(at_threshold.screen().captures, 1);

    let mut just_above = Locator::new(
        FakeScreen::new(frame),
        RecordingSleeper::default(),
        MatchConfig {
            confidence_threshold: best.correlation.next_up(),
            max_retries: 3,
            ..MatchConfig::default()
        },
    );
    assert!(just_above.locate(&template).unwrap().is_none());
    assert_eq!(just_above.screen().captures, 3);
}

#[test]
fn test_locate_absent_exhausts_retries() {
    let mut locator = locator(FakeScreen::new(noise_image(100, 100, 1)));

    let found = locator
        .locate(&Template::from_image("missing", noise_image(10, 10, 3)))
        .unwrap();

    assert!(found.is_none());
    assert_eq!(locator.screen().captures, 10);
    assert_eq!(
        locator.sleeper().recorded(),
        vec![Duration::from_millis(500); 10]
    );
}

#[test]
fn test_locate_appears_on_third_frame() {
    let patch = noise_image(10, 10, 2);
    let frames = vec![
        noise_image(100, 100, 1),
        noise_image(100, 100, 4),
        frame_with(&patch, 12, 70),
    ];
    let mut locator = locator(FakeScreen::sequence(frames));

    let found = locator
        .locate(&Template::from_image("button", patch))
        .unwrap()
        .unwrap();

    assert_eq!(found.position, Point::new(17, 75));
    assert_eq!(locator.screen().captures, 3);
    assert_eq!(locator.sleeper().recorded().len(), 2);
}

#[test]
fn test_locate_with_zero_retries() {
    let mut locator = Locator::new(
        FakeScreen::new(noise_image(100, 100, 1)),
        RecordingSleeper::default(),
        MatchConfig {
            max_retries: 0,
            ..MatchConfig::default()
        },
    );

    let found = locator
        .locate(&Template::from_image("button", noise_image(10, 10, 2)))
        .unwrap();
    assert!(found.is_none());
    assert_eq!(locator.screen().captures, 0);
}

#[test]
fn test_locate_propagates_capture_failure() {
    let mut locator = locator(FakeScreen::failing());
    let err = locator
        .locate(&Template::from_image("button", noise_image(10, 10, 2)))
        .unwrap_err();
    assert!(matches!(err, AutomationError::Capture { .. }));
}

#[test]
fn test_find_image_missing_file_is_not_found() {
    let dir = TestDir::new("find-missing");
    let mut locator = locator(FakeScreen::new(noise_image(100, 100, 1)));

    let found = locator.find_image(&dir.path().join("nope.png")).unwrap();

    assert!(found.is_none());
    assert_eq!(locator.screen().captures, 0);
}

#[test]
fn test_find_image_end_to_end() {
    let dir = TestDir::new("find-e2e");
    let patch = noise_image(10, 10, 2);
    let path = dir.save_image("pic/start.png", &patch);
    let mut locator = locator(FakeScreen::new(frame_with(&patch, 40, 40)));

    assert_eq!(locator.find_image(&path).unwrap(), Some(Point::new(45, 45)));
}

#[test]
fn test_click_lands_within_jitter() {
    let mut clicker = clicker(RecordingPointer::default());
    let target = Point::new(300, 200);

    for _ in 0..500 {
        let clicked = clicker.random_click(target).unwrap();
        assert!(target.chebyshev_distance(&clicked) <= 5, "{clicked}");
    }

    let pointer = clicker.pointer();
    assert_eq!(pointer.clicks.len(), 500);
    for (point, duration) in &pointer.moves {
        assert!(target.chebyshev_distance(point) <= 5);
        assert!(*duration >= Duration::from_millis(100));
        assert!(*duration <= Duration::from_millis(300));
    }
}

#[test]
fn test_click_without_jitter_is_exact() {
    let mut clicker = ClickDispatcher::with_rng(
        RecordingPointer::default(),
        ClickConfig {
            jitter: 0,
            ..ClickConfig::default()
        },
        StdRng::seed_from_u64(1),
    );

    assert_eq!(clicker.random_click(Point::new(45, 45)).unwrap(), Point::new(45, 45));
    assert_eq!(clicker.pointer().clicks, vec![Point::new(45, 45)]);
}

#[test]
fn test_fail_safe_in_corner_aborts_click() {
    for corner in [
        Point::new(0, 0),
        Point::new(1919, 0),
        Point::new(0, 1079),
        Point::new(1919, 1079),
    ] {
        let mut clicker = clicker(RecordingPointer::at(corner));
        let err = clicker.random_click(Point::new(300, 200)).unwrap_err();
        assert!(matches!(err, AutomationError::FailSafeTriggered { .. }));
        assert!(clicker.pointer().moves.is_empty());
        assert!(clicker.pointer().clicks.is_empty());
    }
}

#[test]
fn test_fail_safe_edge_is_not_corner() {
    let mut clicker = clicker(RecordingPointer::at(Point::new(0, 500)));
    assert!(clicker.random_click(Point::new(300, 200)).is_ok());
}

#[test]
fn test_fail_safe_disabled() {
    let mut clicker = ClickDispatcher::with_rng(
        RecordingPointer::at(Point::new(0, 0)),
        ClickConfig {
            fail_safe: false,
            ..ClickConfig::default()
        },
        StdRng::seed_from_u64(1),
    );
    assert!(clicker.random_click(Point::new(300, 200)).is_ok());
    assert_eq!(clicker.pointer().clicks.len(), 1);
}

#[test]
fn test_run_step_found_clicks_and_waits() {
    let dir = TestDir::new("step-found");
    let patch = noise_image(10, 10, 2);
    dir.save_image("pic/start.png", &patch);
    let mut routine = routine(
        FakeScreen::new(frame_with(&patch, 40, 40)),
        dir.path().to_path_buf(),
    );

    let step = RoutineStep::new("pic/start.png", "open terminal");
    assert!(routine.run_step(&step).unwrap());

    let clicks = &routine.clicker().pointer().clicks;
    assert_eq!(clicks.len(), 1);
    assert!(Point::new(45, 45).chebyshev_distance(&clicks[0]) <= 5);

    let sleeps = routine.locator().sleeper().recorded();
    assert_eq!(sleeps.len(), 1);
    assert!(sleeps[0] >= Duration::from_secs(2));
    assert!(sleeps[0] < Duration::from_secs(3));
}

#[test]
fn test_run_step_custom_wait() {
    let dir = TestDir::new("step-wait");
    let patch = noise_image(10, 10, 2);
    dir.save_image("ok.png", &patch);
    let mut routine = routine(
        FakeScreen::new(frame_with(&patch, 40, 40)),
        dir.path().to_path_buf(),
    );

    let step = RoutineStep::new("ok.png", "collect").with_wait(Duration::from_secs(5));
    assert!(routine.run_step(&step).unwrap());
    assert!(routine.locator().sleeper().recorded()[0] >= Duration::from_secs(5));
}

#[test]
fn test_run_step_not_found_skips_wait() {
    let dir = TestDir::new("step-missing");
    dir.save_image("pic/start.png", &noise_image(10, 10, 3));
    let mut routine = routine(
        FakeScreen::new(noise_image(100, 100, 1)),
        dir.path().to_path_buf(),
    );

    let step = RoutineStep::new("pic/start.png", "open terminal");
    assert!(!routine.run_step(&step).unwrap());

    assert!(routine.clicker().pointer().clicks.is_empty());
    let sleeps = routine.locator().sleeper().recorded();
    assert!(sleeps.iter().all(|d| *d == Duration::from_millis(500)));
}

#[test]
fn test_run_step_capture_failure_is_step_failure() {
    let dir = TestDir::new("step-capture");
    dir.save_image("a.png", &noise_image(10, 10, 2));
    let mut routine = routine(FakeScreen::failing(), dir.path().to_path_buf());

    assert!(!routine.run_step(&RoutineStep::new("a.png", "a")).unwrap());
    assert_eq!(routine.locator().screen().captures, 1);
    assert!(routine.locator().sleeper().recorded().is_empty());
    assert!(routine.clicker().pointer().clicks.is_empty());
}

#[test]
fn test_run_stops_at_first_failure() {
    let dir = TestDir::new("run-stop");
    let patch = noise_image(10, 10, 2);
    dir.save_image("first.png", &patch);
    dir.save_image("third.png", &patch);
    let mut routine = routine(
        FakeScreen::new(frame_with(&patch, 40, 40)),
        dir.path().to_path_buf(),
    );

    let steps = vec![
        RoutineStep::new("first.png", "first"),
        RoutineStep::new("second.png", "second"),
        RoutineStep::new("third.png", "third"),
    ];
    let report = routine.run(&steps).unwrap();

    assert_eq!(report.completed, vec!["first".to_string()]);
    assert_eq!(report.failed.as_deref(), Some("second"));
    assert!(!report.is_complete());
    assert_eq!(routine.clicker().pointer().clicks.len(), 1);
}

#[test]
fn test_run_all_steps() {
    let dir = TestDir::new("run-all");
    let patch = noise_image(10, 10, 2);
    dir.save_image("a.png", &patch);
    dir.save_image("b.png", &patch);
    let mut routine = routine(
        FakeScreen::new(frame_with(&patch, 40, 40)),
        dir.path().to_path_buf(),
    );

    let report = routine
        .run(&[RoutineStep::new("a.png", "a"), RoutineStep::new("b.png", "b")])
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.completed.len(), 2);
}

#[test]
fn test_run_aborts_on_fail_safe() {
    let dir = TestDir::new("run-failsafe");
    let patch = noise_image(10, 10, 2);
    dir.save_image("a.png", &patch);
    let mut routine = Routine::with_rng(
        locator(FakeScreen::new(frame_with(&patch, 40, 40))),
        clicker(RecordingPointer::at(Point::new(0, 0))),
        RoutineConfig {
            pic_dir: dir.path().to_path_buf(),
            ..RoutineConfig::default()
        },
        StdRng::seed_from_u64(3),
    );

    let err = routine.run(&[RoutineStep::new("a.png", "a")]).unwrap_err();
    assert!(matches!(err, AutomationError::FailSafeTriggered { x: 0, y: 0 }));
}

#[test]
fn test_default_steps() {
    let steps = default_steps();
    let templates: Vec<_> = steps.iter().map(|s| s.template.to_string_lossy().into_owned()).collect();
    assert_eq!(
        templates,
        vec![
            "pic/start.png",
            "pic/all citys.png",
            "pic/citys/darktime.png",
            "pic/citys/darktime/01.png",
        ]
    );
    assert!(steps.iter().all(|s| s.wait == Duration::from_secs(2)));
}
