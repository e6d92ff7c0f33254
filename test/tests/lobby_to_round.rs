use thengill_game::{
    lobby::CLICK_SOUND,
    scenes::{LOBBY_SCENE, SUMMARY_SCENE, WORLD_SCENE},
    world::{ANIMAL_MODEL, END_SOUND, GOAL_MODEL, PLAYER_MODEL, START_SOUND},
};
use thengill_peer::LocalHub;
use thengill_shared::{
    names, EntityId, EventData, Label, LocalInput, MenuCommand, Model, Scene, SyncObject,
};
use thengill_test::{run_director_frames, TestGame};

fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init()
        .ok();
}

fn label_texts(scene: &Scene) -> Vec<String> {
    scene
        .get_components::<Label>()
        .into_iter()
        .map(|(_, label)| label.text)
        .collect()
}

fn synced_files(scene: &Scene, file_name: &str) -> usize {
    scene
        .get_components::<SyncObject>()
        .into_iter()
        .filter(|(_, sync_object)| sync_object.file_name == file_name)
        .count()
}

fn local_player(scene: &Scene) -> EntityId {
    scene.entities_with::<LocalInput>()[0]
}

fn goal(scene: &Scene) -> EntityId {
    scene
        .get_components::<Model>()
        .into_iter()
        .find(|(_, model)| model.file_name == GOAL_MODEL)
        .map(|(entity, _)| entity)
        .expect("the goal is spawned")
}

/// Master `a` (joined first) and slave `b`, both in the lobby with the menu
/// mirrored.
fn connected_lobbies(hub: &LocalHub) -> (TestGame, TestGame) {
    let mut master = TestGame::networked(hub, "a", 10, &[]);
    let mut slave = TestGame::networked(hub, "b", 20, &["a"]);
    master.enter_lobby();
    slave.enter_lobby();
    run_director_frames(&mut [&mut master, &mut slave], 4);
    (master, slave)
}

#[test]
fn test_slave_mirrors_the_master_menu() {
    init_logging();
    let hub = LocalHub::new();
    let (mut master, mut slave) = connected_lobbies(&hub);

    let texts = label_texts(slave.scene());
    assert!(texts.contains(&"Flocks of Animals: 0".to_string()));
    assert!(texts.contains(&"M a".to_string()));
    assert!(texts.contains(&"b".to_string()));

    master.press(vec![MenuCommand::Down, MenuCommand::Increase]);
    run_director_frames(&mut [&mut master, &mut slave], 2);

    assert!(label_texts(master.scene()).contains(&"Flocks of Animals: 5".to_string()));
    assert!(label_texts(slave.scene()).contains(&"Flocks of Animals: 5".to_string()));
    assert_eq!(master.audio.borrow().count(CLICK_SOUND), 1);
    assert_eq!(slave.audio.borrow().count(CLICK_SOUND), 0);
}

#[test]
fn test_slave_input_does_not_change_settings() {
    let hub = LocalHub::new();
    let (mut master, mut slave) = connected_lobbies(&hub);

    slave.press(vec![MenuCommand::Down, MenuCommand::Increase, MenuCommand::Select]);
    run_director_frames(&mut [&mut master, &mut slave], 2);

    assert_eq!(slave.scene_name().as_deref(), Some(LOBBY_SCENE));
    assert!(label_texts(master.scene()).contains(&"Flocks of Animals: 0".to_string()));
    assert!(label_texts(slave.scene()).contains(&"Flocks of Animals: 0".to_string()));
}

#[test]
fn test_round_is_played_and_summarized_on_both_peers() {
    init_logging();
    let hub = LocalHub::new();
    let (mut master, mut slave) = connected_lobbies(&hub);

    // one flock, then down to "Start Game"
    master.press(vec![MenuCommand::Down, MenuCommand::Increase]);
    run_director_frames(&mut [&mut master, &mut slave], 1);
    master.press(vec![
        MenuCommand::Down,
        MenuCommand::Down,
        MenuCommand::Down,
        MenuCommand::Select,
    ]);
    run_director_frames(&mut [&mut master, &mut slave], 1);

    assert_eq!(master.scene_name().as_deref(), Some(WORLD_SCENE));
    assert_eq!(slave.scene_name().as_deref(), Some(WORLD_SCENE));
    assert_eq!(master.director.depth(), 2);

    run_director_frames(&mut [&mut master, &mut slave], 3);

    // the master owns the world content, the slave only sees replicas
    assert_eq!(synced_files(master.scene(), ANIMAL_MODEL), 5);
    assert_eq!(synced_files(slave.scene(), ANIMAL_MODEL), 5);
    assert_eq!(synced_files(slave.scene(), GOAL_MODEL), 1);
    assert_eq!(synced_files(master.scene(), PLAYER_MODEL), 2);
    assert_eq!(synced_files(slave.scene(), PLAYER_MODEL), 2);
    assert_eq!(master.audio.borrow().count(START_SOUND), 1);
    assert_eq!(slave.audio.borrow().count(START_SOUND), 1);

    let player = local_player(master.scene());
    let goal = goal(master.scene());
    master.scene_mut().raise(
        names::COLLISION,
        EventData::Collision {
            first: player,
            second: goal,
        },
    );
    run_director_frames(&mut [&mut master, &mut slave], 2);

    assert_eq!(master.scene_name().as_deref(), Some(SUMMARY_SCENE));
    assert_eq!(slave.scene_name().as_deref(), Some(SUMMARY_SCENE));
    assert!(label_texts(master.scene()).contains(&"You won!".to_string()));
    assert!(label_texts(slave.scene()).contains(&"You lost!".to_string()));
    assert_eq!(master.audio.borrow().count(END_SOUND), 1);
    assert_eq!(slave.audio.borrow().count(END_SOUND), 1);

    master.press(vec![MenuCommand::Select]);
    slave.press(vec![MenuCommand::Select]);
    run_director_frames(&mut [&mut master, &mut slave], 1);

    assert_eq!(master.scene_name().as_deref(), Some(LOBBY_SCENE));
    assert_eq!(slave.scene_name().as_deref(), Some(LOBBY_SCENE));
}

#[test]
fn test_offline_round_renders_and_returns_to_the_lobby() {
    init_logging();
    let mut game = TestGame::offline();
    game.enter_lobby();
    game.frame();

    game.press(vec![MenuCommand::Up, MenuCommand::Up, MenuCommand::Select]);
    game.frame();
    assert_eq!(game.scene_name().as_deref(), Some(WORLD_SCENE));

    game.frame();
    {
        let renderer = game.renderer.borrow();
        let (items, camera) = renderer.frames.last().expect("the world was drawn");
        assert!(items.iter().any(|item| item.entity == local_player(game.scene())));
        assert!(camera.position.y > 0.0);
    }

    let player = local_player(game.scene());
    let goal = goal(game.scene());
    game.scene_mut().raise(
        names::COLLISION,
        EventData::Collision {
            first: goal,
            second: player,
        },
    );
    game.frame();
    assert_eq!(game.scene_name().as_deref(), Some(SUMMARY_SCENE));
    assert!(label_texts(game.scene()).contains(&"You won!".to_string()));

    game.press(vec![MenuCommand::Back]);
    game.frame();
    game.frame();
    assert_eq!(game.scene_name().as_deref(), Some(LOBBY_SCENE));

    game.press(vec![MenuCommand::Back]);
    game.frame();
    assert!(game.director.is_empty());
}
