use std::{cell::RefCell, rc::Rc};

use thengill_shared::{
    names, EventData, FrameTime, LocalInput, Scene, SceneDirector, Score, System, Transform,
    Transition,
};
use thengill_test::EventLog;

fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// Records the frame times it is handed and the callbacks it sees.
#[derive(Clone, Default)]
struct FrameRecorder {
    calls: Rc<RefCell<Vec<String>>>,
    times: Rc<RefCell<Vec<FrameTime>>>,
}

impl System for FrameRecorder {
    fn name(&self) -> &str {
        "FrameRecorder"
    }

    fn update(&mut self, _scene: &mut Scene, time: &FrameTime) {
        self.calls.borrow_mut().push("update".to_string());
        self.times.borrow_mut().push(*time);
    }

    fn draw(&mut self, _scene: &Scene, _time: &FrameTime) {
        self.calls.borrow_mut().push("draw".to_string());
    }

    fn teardown(&mut self, _scene: &mut Scene) {
        self.calls.borrow_mut().push("teardown".to_string());
    }
}

#[test]
fn test_component_round_trip_and_absence() {
    let mut scene = Scene::new("components");
    scene.init();
    let entity = scene.add_entity();
    let transform = Transform::from_position(glam::Vec3::new(1.0, 2.0, 3.0));

    scene.add_component(&entity, transform);

    assert_eq!(
        scene.get_component_from_entity::<Transform>(&entity),
        Some(&transform)
    );
    assert_eq!(scene.get_component_from_entity::<Score>(&entity), None);
    assert!(!scene.entity_has_component::<LocalInput>(&entity));
}

#[test]
fn test_handlers_fire_in_subscription_order() {
    let mut scene = Scene::new("events");
    let order = Rc::new(RefCell::new(Vec::new()));

    for label in ["first", "second", "third"] {
        let order = order.clone();
        scene.on_event(names::HIT, move |_, _| {
            order.borrow_mut().push(label);
            Ok(())
        });
    }
    scene.raise(names::HIT, EventData::None);

    assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_handler_added_during_raise_waits_for_the_next_one() {
    let mut scene = Scene::new("events");
    let late_calls = Rc::new(RefCell::new(0));

    let counter = late_calls.clone();
    let mut subscribed = false;
    scene.on_event(names::HIT, move |scene, _| {
        if !subscribed {
            subscribed = true;
            let counter = counter.clone();
            scene.on_event(names::HIT, move |_, _| {
                *counter.borrow_mut() += 1;
                Ok(())
            });
        }
        Ok(())
    });

    scene.raise(names::HIT, EventData::None);
    assert_eq!(*late_calls.borrow(), 0);
    scene.raise(names::HIT, EventData::None);
    assert_eq!(*late_calls.borrow(), 1);
}

#[test]
fn test_frames_advance_by_dt_and_never_backwards() {
    init_logging();
    let recorder = FrameRecorder::default();
    let mut scene = Scene::new("time");
    scene.add_system(recorder.clone());
    scene.init();

    scene.update(0.016, 0.016);
    scene.update(0.032, 0.016);
    scene.update(0.01, -0.5);
    scene.update(0.05, f64::NAN);

    let times = recorder.times.borrow();
    assert!((times[0].t - 0.016).abs() < 1e-12);
    assert!((times[1].t - times[0].t - 0.016).abs() < 1e-12);
    for time in times.iter() {
        assert!(time.dt >= 0.0);
    }
    for pair in times.windows(2) {
        assert!(pair[1].t >= pair[0].t);
    }
}

#[test]
fn test_director_clock_advances_by_dt() {
    let mut director = SceneDirector::new();
    director.enter(Scene::new("idle"));

    let first = director.frame(0.016).unwrap();
    let second = director.frame(0.016).unwrap();

    assert!((first.t - 0.016).abs() < 1e-12);
    assert!((second.t - first.t - 0.016).abs() < 1e-12);
}

#[test]
fn test_game_end_twice_ends_once_and_leaves_after_draw() {
    init_logging();
    let recorder = FrameRecorder::default();
    let mut scene = Scene::new("round");
    scene.add_system(recorder.clone());
    scene.on_event(names::GAME_END, |scene, data| {
        let winner = data.entity(names::GAME_END)?;
        if scene.end_game(winner) {
            scene.request_transition(Transition::Pop);
        }
        Ok(())
    });

    let mut director = SceneDirector::new();
    director.enter(scene);
    let (winner, other) = {
        let scene = director.current_mut().unwrap();
        let winner = scene.add_entity();
        scene.add_component(&winner, LocalInput);
        (winner, scene.add_entity())
    };

    {
        let scene = director.current_mut().unwrap();
        scene.raise(names::GAME_END, EventData::Entity(winner));
        scene.raise(names::GAME_END, EventData::Entity(other));
        let outcome = scene.outcome().unwrap();
        assert_eq!(outcome.winner, winner);
        assert!(outcome.local_win);
    }

    director.frame(0.016);

    assert!(director.is_empty());
    assert_eq!(
        *recorder.calls.borrow(),
        vec!["update".to_string(), "draw".to_string(), "teardown".to_string()]
    );
}

#[test]
fn test_torn_down_scene_ignores_frames_and_events() {
    let recorder = FrameRecorder::default();
    let mut scene = Scene::new("gone");
    scene.add_system(recorder.clone());
    let hits = EventLog::attach(&mut scene, names::HIT);
    scene.init();
    scene.teardown();

    scene.update(1.0, 1.0);
    scene.draw(1.0, 1.0);
    scene.raise(names::HIT, EventData::None);

    assert_eq!(*recorder.calls.borrow(), vec!["teardown".to_string()]);
    assert!(hits.is_empty());
}
