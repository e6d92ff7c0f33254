use log::{info, warn};

use super::{
    scene::{Scene, SceneState, Transition},
    time::{FrameClock, FrameTime},
};

/// Stack of scenes. Only the top scene runs; transitions it requests are
/// applied after its draw, so a frame always completes on the scene that
/// started it.
pub struct SceneDirector {
    stack: Vec<Scene>,
    clock: FrameClock,
}

impl SceneDirector {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            clock: FrameClock::new(),
        }
    }

    /// Initializes `scene` if needed and makes it the running scene.
    pub fn enter(&mut self, mut scene: Scene) {
        if scene.state() == SceneState::Constructed {
            scene.init();
        }
        info!("Entering scene `{}`", scene.name());
        self.stack.push(scene);
    }

    /// Tears down the running scene. The one below it resumes.
    pub fn leave(&mut self) -> Option<Scene> {
        let mut scene = self.stack.pop()?;
        info!("Leaving scene `{}`", scene.name());
        scene.teardown();
        Some(scene)
    }

    /// Runs update and draw on the top scene, then applies its transition.
    /// Returns the frame time, or `None` if no scene is left.
    pub fn frame(&mut self, dt: f64) -> Option<FrameTime> {
        let time = self.clock.tick(dt);
        let scene = self.stack.last_mut()?;
        scene.update(time.t, time.dt);
        scene.draw(time.t, time.dt);

        if let Some(transition) = scene.take_transition() {
            self.apply(transition);
        }
        Some(time)
    }

    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Push(scene) => self.enter(*scene),
            Transition::Pop => {
                if self.leave().is_none() {
                    warn!("Pop requested with no scene on the stack");
                }
            }
            Transition::Replace(scene) => {
                self.leave();
                self.enter(*scene);
            }
        }
    }

    pub fn current(&self) -> Option<&Scene> {
        self.stack.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Scene> {
        self.stack.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }
}

impl Default for SceneDirector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::{event_data::EventData, names},
        scene::system::System,
    };

    struct LeaveAfter {
        frames: u32,
    }

    impl System for LeaveAfter {
        fn update(&mut self, scene: &mut Scene, _time: &FrameTime) {
            self.frames = self.frames.saturating_sub(1);
            if self.frames == 0 {
                scene.request_transition(Transition::Pop);
            }
        }
    }

    #[test]
    fn pop_is_applied_after_draw() {
        let mut director = SceneDirector::new();
        let mut scene = Scene::new("round");
        scene.add_system(LeaveAfter { frames: 2 });
        director.enter(scene);

        director.frame(0.016);
        assert_eq!(director.depth(), 1);
        director.frame(0.016);
        assert!(director.is_empty());
        assert!(director.frame(0.016).is_none());
    }

    #[test]
    fn push_runs_new_scene_on_next_frame() {
        let mut director = SceneDirector::new();
        director.enter(Scene::new("menu"));
        if let Some(scene) = director.current_mut() {
            scene.request_transition(Transition::Push(Box::new(Scene::new("world"))));
        }
        director.frame(0.016);

        assert_eq!(director.depth(), 2);
        assert_eq!(director.current().map(Scene::name), Some("world"));
        director.apply(Transition::Pop);
        assert_eq!(director.current().map(Scene::name), Some("menu"));
    }

    #[test]
    fn leaving_tears_the_scene_down() {
        let mut director = SceneDirector::new();
        let mut scene = Scene::new("menu");
        scene.on_event(names::HIT, |_, _| Ok(()));
        director.enter(scene);

        let left = director.leave().expect("scene on stack");
        assert_eq!(left.state(), SceneState::TornDown);
        assert_eq!(left.subscriber_count(names::HIT), 0);

        let mut left = left;
        left.raise(names::HIT, EventData::None);
    }
}
