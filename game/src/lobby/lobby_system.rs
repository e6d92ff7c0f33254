use std::{cell::RefCell, mem, rc::Rc};

use log::{debug, info, warn};

use thengill_shared::{
    names, Authority, EntityId, EventData, FrameTime, HandlerError, Label, MenuCommand, MenuItem,
    NetworkPeer, Scene, System, Transition,
};

use crate::{scenes, services::GameServices};

use super::{
    error::LobbyError,
    lobby_settings::LobbySettings,
    menu_action::{dispatch, MenuAction, MenuEffect, MenuRow},
};

pub const CLICK_SOUND: &str = "Sounds/Effects/Click";

/// Commands are ignored for this long after the lobby appears, so a key
/// still held from the previous screen does not trigger a row.
const INPUT_COOLDOWN: f64 = 0.2;
const MASTER_PREFIX: &str = "M ";

/// What this peer does in the lobby. Decided once, from the scene authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LobbyRole {
    /// Owns the settings and broadcasts every change
    Host,
    /// Displays the host's settings and follows it into the round
    Mirror,
}

struct LobbyState {
    settings: LobbySettings,
    role: Option<LobbyRole>,
    rows: Vec<(MenuRow, EntityId)>,
    selected: usize,
    roster_labels: Vec<EntityId>,
}

struct Lobby {
    state: RefCell<LobbyState>,
    services: GameServices,
}

/// Runs the pre-round menu: settings rows, the peer roster, and entry into
/// the world scene.
pub struct LobbySystem {
    lobby: Rc<Lobby>,
    elapsed: f64,
}

impl LobbySystem {
    pub fn new(services: GameServices, settings: LobbySettings) -> Self {
        Self {
            lobby: Rc::new(Lobby {
                state: RefCell::new(LobbyState {
                    settings,
                    role: None,
                    rows: Vec::new(),
                    selected: 0,
                    roster_labels: Vec::new(),
                }),
                services,
            }),
            elapsed: 0.0,
        }
    }

    pub fn role(&self) -> Option<LobbyRole> {
        self.lobby.role()
    }

    pub fn settings(&self) -> LobbySettings {
        self.lobby.state.borrow().settings.clone()
    }
}

impl System for LobbySystem {
    fn name(&self) -> &str {
        "LobbySystem"
    }

    fn init(&mut self, scene: &mut Scene) {
        let audio = self.lobby.services.audio.clone();
        scene.on_event(names::SELECTION_CHANGED, move |_, _| {
            audio.borrow_mut().play_sound(CLICK_SOUND);
            Ok(())
        });

        let lobby = self.lobby.clone();
        scene.on_event(names::UPDATE_PEERS, move |scene, data| {
            let peers = data.peers(names::UPDATE_PEERS)?;
            let was_host = lobby.role() == Some(LobbyRole::Host);
            lobby.decide_role(scene);
            lobby.rebuild_roster(scene, peers);
            if was_host {
                // someone may have joined after the menu was first sent
                lobby.send_menu(scene);
            }
            Ok(())
        });

        if let Some(network) = &self.lobby.services.network {
            let peers = network.session.borrow().peers();
            self.lobby.rebuild_roster(scene, &peers);
        }
        self.lobby.decide_role(scene);
    }

    fn update(&mut self, scene: &mut Scene, time: &FrameTime) {
        // a seed may have answered since the last frame
        self.lobby.decide_role(scene);

        self.elapsed += time.dt;
        let commands = self.lobby.services.input.borrow_mut().poll();
        if self.elapsed < INPUT_COOLDOWN {
            return;
        }
        for command in commands {
            if scene.has_pending_transition() {
                break;
            }
            self.lobby.handle_command(scene, command);
        }
    }
}

impl Lobby {
    fn role(&self) -> Option<LobbyRole> {
        self.state.borrow().role
    }

    fn decide_role(self: &Rc<Self>, scene: &mut Scene) {
        if self.state.borrow().role.is_some() {
            return;
        }
        let role = match scene.authority() {
            Authority::Undecided => return,
            authority if authority.is_authoritative() => LobbyRole::Host,
            _ => LobbyRole::Mirror,
        };
        self.state.borrow_mut().role = Some(role);
        info!("Lobby in scene `{}` acts as {:?}", scene.name(), role);

        match role {
            LobbyRole::Host => {
                self.create_rows(scene);
                self.send_menu(scene);
            }
            LobbyRole::Mirror => {
                let lobby = self.clone();
                scene.on_event(names::NETWORK_MENU_DATA_RECEIVED, move |scene, data| {
                    let item = data.menu_item(names::NETWORK_MENU_DATA_RECEIVED)?;
                    lobby
                        .apply_mirror_item(scene, item)
                        .map_err(|err| HandlerError::Failed(err.to_string()))
                });
            }
        }
    }

    fn create_rows(&self, scene: &mut Scene) {
        let mut state = self.state.borrow_mut();
        for row in MenuRow::ALL {
            let entity = scene.add_entity();
            let mut label = Label::new(state.settings.label_text(row));
            label.highlighted = state.rows.len() == state.selected;
            scene.add_component(&entity, label);
            state.rows.push((row, entity));
        }
    }

    /// Broadcasts every setting row, so peers that joined late catch up.
    fn send_menu(&self, scene: &mut Scene) {
        let items: Vec<MenuItem> = {
            let state = self.state.borrow();
            MenuRow::ALL
                .into_iter()
                .filter(|row| row.is_setting())
                .map(|row| MenuItem::new(row.id(), state.settings.label_text(row)))
                .collect()
        };
        for item in items {
            scene.raise(names::SEND_MENU_ITEM, EventData::MenuItem(item));
        }
    }

    fn rebuild_roster(&self, scene: &mut Scene, peers: &[NetworkPeer]) {
        let mut state = self.state.borrow_mut();
        for entity in mem::take(&mut state.roster_labels) {
            if scene.is_alive(&entity) {
                scene.remove_entity(&entity);
            }
        }
        for peer in peers {
            let prefix = if peer.is_master { MASTER_PREFIX } else { "" };
            let suffix = if peer.alive { "" } else { " (left)" };
            let entity = scene.add_entity();
            scene.add_component(
                &entity,
                Label {
                    text: format!("{}{}{}", prefix, peer.address, suffix),
                    highlighted: peer.is_local,
                },
            );
            state.roster_labels.push(entity);
        }
        debug!("Lobby roster shows {} peer(s)", peers.len());
    }

    fn handle_command(&self, scene: &mut Scene, command: MenuCommand) {
        let role = self.state.borrow().role;
        match (command, role) {
            (MenuCommand::Back, _) => self.leave(scene),
            (MenuCommand::Up, Some(LobbyRole::Host)) => self.move_selection(scene, false),
            (MenuCommand::Down, Some(LobbyRole::Host)) => self.move_selection(scene, true),
            (command, Some(LobbyRole::Host)) => {
                if let Some(action) = MenuAction::from_command(command) {
                    self.activate(scene, action);
                }
            }
            (command, _) => {
                debug!("Ignoring {:?}: this peer does not own the menu", command);
            }
        }
    }

    fn move_selection(&self, scene: &mut Scene, down: bool) {
        let selected = {
            let mut state = self.state.borrow_mut();
            let count = state.rows.len();
            if count == 0 {
                return;
            }
            let previous = state.selected;
            state.selected = if down {
                (previous + 1) % count
            } else {
                (previous + count - 1) % count
            };
            let previous_entity = state.rows[previous].1;
            let selected_entity = state.rows[state.selected].1;
            if let Some(label) = scene.get_component_mut::<Label>(&previous_entity) {
                label.highlighted = false;
            }
            if let Some(label) = scene.get_component_mut::<Label>(&selected_entity) {
                label.highlighted = true;
            }
            state.selected
        };
        scene.raise(names::SELECTION_CHANGED, EventData::Index(selected));
    }

    fn activate(&self, scene: &mut Scene, action: MenuAction) {
        let Some(row) = ({
            let state = self.state.borrow();
            state.rows.get(state.selected).map(|(row, _)| *row)
        }) else {
            return;
        };

        match dispatch(row, action) {
            MenuEffect::Step { forward, broadcast } => {
                let item = {
                    let mut state = self.state.borrow_mut();
                    state.settings.step(row, forward);
                    let text = state.settings.label_text(row);
                    if let Some((_, entity)) = state.rows.iter().find(|(other, _)| *other == row) {
                        if let Some(label) = scene.get_component_mut::<Label>(entity) {
                            label.text = text.clone();
                        }
                    }
                    MenuItem::new(row.id(), text)
                };
                if broadcast {
                    scene.raise(names::SEND_MENU_ITEM, EventData::MenuItem(item));
                }
            }
            MenuEffect::StartGame => {
                let item = MenuItem::new(row.id(), self.state.borrow().settings.label_text(row));
                scene.raise(names::SEND_MENU_ITEM, EventData::MenuItem(item));
                self.start_game(scene);
            }
            MenuEffect::Leave => self.leave(scene),
            MenuEffect::Nothing => {}
        }
    }

    fn apply_mirror_item(&self, scene: &mut Scene, item: &MenuItem) -> Result<(), LobbyError> {
        let row = MenuRow::from_id(item.id).ok_or(LobbyError::UnknownRow { id: item.id })?;
        if row == MenuRow::StartGame {
            info!("Host started the round");
            self.start_game(scene);
            return Ok(());
        }

        let mut state = self.state.borrow_mut();
        state.settings.apply_replicated(row, &item.text)?;
        let text = state.settings.label_text(row);
        let existing = state
            .rows
            .iter()
            .find(|(other, _)| *other == row)
            .map(|(_, entity)| *entity);
        match existing {
            Some(entity) => {
                if let Some(label) = scene.get_component_mut::<Label>(&entity) {
                    label.text = text;
                }
            }
            None => {
                let entity = scene.add_entity();
                scene.add_component(&entity, Label::new(text));
                state.rows.push((row, entity));
            }
        }
        Ok(())
    }

    fn start_game(&self, scene: &mut Scene) {
        let config = self.state.borrow().settings.world_config();
        info!("Starting round on map `{}`", config.map);
        let world = scenes::world_scene(&self.services, config);
        if !scene.request_transition(Transition::Push(Box::new(world))) {
            warn!("Lobby could not start the round: another transition is pending");
        }
    }

    fn leave(&self, scene: &mut Scene) {
        scene.request_transition(Transition::Pop);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use thengill_shared::{
        names, Audio, Authority, EventData, Label, MenuCommand, MenuItem, NetworkPeer, Scene,
        ScriptedInput, Transition,
    };

    use crate::{lobby::LobbySettings, scenes, services::GameServices};

    use super::{LobbySystem, CLICK_SOUND};

    #[derive(Default)]
    struct RecordingAudio {
        played: Vec<String>,
    }

    impl Audio for RecordingAudio {
        fn play_sound(&mut self, name: &str) {
            self.played.push(name.to_string());
        }
    }

    struct Fixture {
        services: GameServices,
        input: Rc<RefCell<ScriptedInput>>,
        audio: Rc<RefCell<RecordingAudio>>,
    }

    fn fixture() -> Fixture {
        let input = Rc::new(RefCell::new(ScriptedInput::default()));
        let audio = Rc::new(RefCell::new(RecordingAudio::default()));
        let mut services = GameServices::headless();
        services.input = input.clone();
        services.audio = audio.clone();
        Fixture {
            services,
            input,
            audio,
        }
    }

    fn lobby_with_authority(fixture: &Fixture, authority: Authority) -> Scene {
        let mut scene = Scene::new("lobby");
        scene.set_authority(authority);
        scene.add_system(LobbySystem::new(
            fixture.services.clone(),
            LobbySettings::default(),
        ));
        scene
    }

    fn record(scene: &mut Scene, event: &'static str) -> Rc<RefCell<Vec<EventData>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        scene.on_event(event, move |_, data| {
            sink.borrow_mut().push(data.clone());
            Ok(())
        });
        seen
    }

    fn labels(scene: &Scene) -> Vec<Label> {
        scene
            .get_components::<Label>()
            .into_iter()
            .map(|(_, label)| label)
            .collect()
    }

    fn texts(scene: &Scene) -> Vec<String> {
        labels(scene).into_iter().map(|label| label.text).collect()
    }

    fn press(fixture: &Fixture, scene: &mut Scene, commands: Vec<MenuCommand>) {
        fixture.input.borrow_mut().push(commands);
        let t = scene.time().t + 0.25;
        scene.update(t, 0.25);
    }

    fn peer(address: &str, is_local: bool, is_master: bool) -> NetworkPeer {
        NetworkPeer {
            address: address.to_string(),
            joined_at: 0,
            is_local,
            alive: true,
            is_master,
        }
    }

    #[test]
    fn single_player_lobby_shows_every_row() {
        let fixture = fixture();
        let mut scene = scenes::lobby_scene(&fixture.services, LobbySettings::default());
        scene.init();

        assert_eq!(
            texts(&scene),
            vec![
                "Map: DinoIsland",
                "Flocks of Animals: 0",
                "Number of Power-Ups: 0",
                "Number of Triggers: 0",
                "Start Game",
                "Return",
            ]
        );
        assert!(labels(&scene)[0].highlighted);
    }

    #[test]
    fn selection_wraps_and_clicks() {
        let fixture = fixture();
        let mut scene = lobby_with_authority(&fixture, Authority::Local);
        let changes = record(&mut scene, names::SELECTION_CHANGED);
        scene.init();

        press(&fixture, &mut scene, vec![MenuCommand::Up]);
        press(&fixture, &mut scene, vec![MenuCommand::Down, MenuCommand::Down]);

        let indices: Vec<usize> = changes
            .borrow()
            .iter()
            .map(|data| data.index(names::SELECTION_CHANGED).unwrap())
            .collect();
        assert_eq!(indices, vec![5, 0, 1]);
        assert_eq!(fixture.audio.borrow().played, vec![CLICK_SOUND; 3]);

        let highlighted: Vec<bool> = labels(&scene).iter().map(|label| label.highlighted).collect();
        assert_eq!(highlighted, vec![false, true, false, false, false, false]);
    }

    #[test]
    fn input_is_ignored_during_cooldown() {
        let fixture = fixture();
        let mut scene = lobby_with_authority(&fixture, Authority::Local);
        let changes = record(&mut scene, names::SELECTION_CHANGED);
        scene.init();

        fixture.input.borrow_mut().push(vec![MenuCommand::Down]);
        scene.update(0.1, 0.1);
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn changing_a_setting_broadcasts_the_row() {
        let fixture = fixture();
        let mut scene = lobby_with_authority(&fixture, Authority::Local);
        let sent = record(&mut scene, names::SEND_MENU_ITEM);
        scene.init();
        // the host sends its whole menu once it knows its role
        assert_eq!(sent.borrow().len(), 4);
        sent.borrow_mut().clear();

        press(
            &fixture,
            &mut scene,
            vec![MenuCommand::Down, MenuCommand::Increase, MenuCommand::Decrease, MenuCommand::Decrease],
        );

        let items: Vec<MenuItem> = sent
            .borrow()
            .iter()
            .map(|data| data.menu_item(names::SEND_MENU_ITEM).unwrap().clone())
            .collect();
        assert_eq!(
            items,
            vec![
                MenuItem::new(1, "Flocks of Animals: 5"),
                MenuItem::new(1, "Flocks of Animals: 0"),
                MenuItem::new(1, "Flocks of Animals: 50"),
            ]
        );
        assert_eq!(texts(&scene)[1], "Flocks of Animals: 50");
    }

    #[test]
    fn selecting_the_map_stays_local() {
        let fixture = fixture();
        let mut scene = lobby_with_authority(&fixture, Authority::Local);
        let sent = record(&mut scene, names::SEND_MENU_ITEM);
        scene.init();
        sent.borrow_mut().clear();

        press(&fixture, &mut scene, vec![MenuCommand::Select]);
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn start_game_pushes_the_world() {
        let fixture = fixture();
        let mut scene = lobby_with_authority(&fixture, Authority::Master);
        let sent = record(&mut scene, names::SEND_MENU_ITEM);
        scene.init();
        sent.borrow_mut().clear();

        press(
            &fixture,
            &mut scene,
            vec![
                MenuCommand::Down,
                MenuCommand::Down,
                MenuCommand::Down,
                MenuCommand::Down,
                MenuCommand::Select,
            ],
        );

        match scene.take_transition() {
            Some(Transition::Push(world)) => assert_eq!(world.name(), scenes::WORLD_SCENE),
            other => panic!("expected the world to be pushed, got {:?}", other),
        }
        let sent = sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].menu_item(names::SEND_MENU_ITEM).unwrap(),
            &MenuItem::new(4, "Start Game")
        );
    }

    #[test]
    fn back_and_return_pop_the_lobby() {
        let fixture = fixture();
        let mut scene = lobby_with_authority(&fixture, Authority::Local);
        scene.init();

        press(&fixture, &mut scene, vec![MenuCommand::Up, MenuCommand::Select]);
        assert!(matches!(scene.take_transition(), Some(Transition::Pop)));

        press(&fixture, &mut scene, vec![MenuCommand::Back]);
        assert!(matches!(scene.take_transition(), Some(Transition::Pop)));
    }

    #[test]
    fn undecided_lobby_waits_for_the_roster() {
        let fixture = fixture();
        let mut scene = lobby_with_authority(&fixture, Authority::Undecided);
        let sent = record(&mut scene, names::SEND_MENU_ITEM);
        scene.init();
        assert!(labels(&scene).is_empty());

        scene.set_authority(Authority::Master);
        scene.raise(
            names::UPDATE_PEERS,
            EventData::Peers(vec![peer("a:1", true, true), peer("b:2", false, false)]),
        );

        assert_eq!(sent.borrow().len(), 4);
        let texts = texts(&scene);
        assert_eq!(texts.len(), 8);
        assert!(texts.contains(&"M a:1".to_string()));
        assert!(texts.contains(&"b:2".to_string()));
    }

    #[test]
    fn host_resends_the_menu_on_roster_changes() {
        let fixture = fixture();
        let mut scene = lobby_with_authority(&fixture, Authority::Master);
        let sent = record(&mut scene, names::SEND_MENU_ITEM);
        scene.init();
        sent.borrow_mut().clear();

        scene.raise(
            names::UPDATE_PEERS,
            EventData::Peers(vec![peer("a:1", true, true), peer("c:3", false, false)]),
        );
        assert_eq!(sent.borrow().len(), 4);
    }

    #[test]
    fn roster_labels_are_rebuilt() {
        let fixture = fixture();
        let mut scene = lobby_with_authority(&fixture, Authority::Slave);
        scene.init();

        scene.raise(
            names::UPDATE_PEERS,
            EventData::Peers(vec![peer("a:1", false, true), peer("b:2", true, false)]),
        );
        let mut gone = peer("a:1", false, true);
        gone.alive = false;
        scene.raise(
            names::UPDATE_PEERS,
            EventData::Peers(vec![gone, peer("b:2", true, false)]),
        );

        let labels = labels(&scene);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].text, "M a:1 (left)");
        assert!(!labels[0].highlighted);
        assert_eq!(labels[1].text, "b:2");
        assert!(labels[1].highlighted);
    }

    #[test]
    fn mirror_follows_the_host() {
        let fixture = fixture();
        let mut scene = lobby_with_authority(&fixture, Authority::Slave);
        scene.init();
        assert!(labels(&scene).is_empty());

        scene.raise(
            names::NETWORK_MENU_DATA_RECEIVED,
            EventData::MenuItem(MenuItem::new(1, "Flocks of Animals: 10")),
        );
        scene.raise(
            names::NETWORK_MENU_DATA_RECEIVED,
            EventData::MenuItem(MenuItem::new(1, "Flocks of Animals: 15")),
        );
        assert_eq!(texts(&scene), vec!["Flocks of Animals: 15"]);

        // mirrors cannot drive the menu
        press(&fixture, &mut scene, vec![MenuCommand::Increase]);
        assert_eq!(texts(&scene), vec!["Flocks of Animals: 15"]);

        scene.raise(
            names::NETWORK_MENU_DATA_RECEIVED,
            EventData::MenuItem(MenuItem::new(4, "Start Game")),
        );
        assert!(matches!(
            scene.take_transition(),
            Some(Transition::Push(world)) if world.name() == scenes::WORLD_SCENE
        ));
    }

    #[test]
    fn mirror_rejects_unknown_rows() {
        let fixture = fixture();
        let mut scene = lobby_with_authority(&fixture, Authority::Slave);
        scene.init();

        scene.raise(
            names::NETWORK_MENU_DATA_RECEIVED,
            EventData::MenuItem(MenuItem::new(42, "Nonsense")),
        );
        scene.raise(
            names::NETWORK_MENU_DATA_RECEIVED,
            EventData::MenuItem(MenuItem::new(0, "Map: Atlantis")),
        );
        assert!(labels(&scene).is_empty());
        assert!(!scene.has_pending_transition());
    }
}
