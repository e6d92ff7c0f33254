use std::{cell::RefCell, rc::Rc};

use thengill_peer::{NetworkSystem, ObjectSyncService, SharedSession, SyncConfig};
use thengill_shared::{
    AssetLoader, Audio, FlatTerrain, HeadlessAssets, MenuInput, ModelHandle, NullRenderer,
    Renderer, ScriptedInput, SilentAudio, Terrain,
};

/// Session shared by every networked scene, plus how their replication runs.
#[derive(Clone)]
pub struct NetworkServices {
    pub session: SharedSession,
    pub sync_config: SyncConfig,
    pub outbound_budget: usize,
}

/// Engine collaborators handed to every scene the game builds.
#[derive(Clone)]
pub struct GameServices {
    pub assets: Rc<RefCell<dyn AssetLoader>>,
    pub renderer: Rc<RefCell<dyn Renderer>>,
    pub audio: Rc<RefCell<dyn Audio>>,
    pub terrain: Rc<dyn Terrain>,
    pub input: Rc<RefCell<dyn MenuInput>>,
    pub network: Option<NetworkServices>,
}

impl GameServices {
    /// No window, no sound, flat ground, no input.
    pub fn headless() -> Self {
        Self {
            assets: Rc::new(RefCell::new(HeadlessAssets::default())),
            renderer: Rc::new(RefCell::new(NullRenderer::default())),
            audio: Rc::new(RefCell::new(SilentAudio)),
            terrain: Rc::new(FlatTerrain::default()),
            input: Rc::new(RefCell::new(ScriptedInput::default())),
            network: None,
        }
    }

    pub fn with_network(
        mut self,
        session: SharedSession,
        sync_config: SyncConfig,
        outbound_budget: usize,
    ) -> Self {
        self.network = Some(NetworkServices {
            session,
            sync_config,
            outbound_budget,
        });
        self
    }

    pub fn is_networked(&self) -> bool {
        self.network.is_some()
    }

    /// A fresh NetworkSystem for one scene, if this game is networked.
    pub fn network_system(&self) -> Option<NetworkSystem> {
        let network = self.network.as_ref()?;
        let local_address = network.session.borrow().local_address().to_string();
        let sync = ObjectSyncService::new(
            network.sync_config.clone(),
            &local_address,
            Box::new(SharedAssets(self.assets.clone())),
        );
        Some(NetworkSystem::new(
            network.session.clone(),
            sync,
            network.outbound_budget,
        ))
    }
}

/// Lets a replication service load models through the game's loader.
struct SharedAssets(Rc<RefCell<dyn AssetLoader>>);

impl AssetLoader for SharedAssets {
    fn load_model(&mut self, name: &str) -> ModelHandle {
        self.0.borrow_mut().load_model(name)
    }
}
