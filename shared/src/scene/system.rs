use super::{scene::Scene, time::FrameTime};

/// A unit of per-frame logic run by a Scene.
///
/// Every callback receives the Scene it runs in. `draw` only gets shared
/// access, so simulation state cannot change while rendering.
pub trait System {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once before the first frame, or before the first frame after
    /// the system was added.
    fn init(&mut self, _scene: &mut Scene) {}

    /// Called on every system before any `update` of the frame.
    fn begin_frame(&mut self, _scene: &mut Scene, _time: &FrameTime) {}

    fn update(&mut self, _scene: &mut Scene, _time: &FrameTime) {}

    /// Called on every system after every `update` of the frame.
    fn end_frame(&mut self, _scene: &mut Scene, _time: &FrameTime) {}

    fn draw(&mut self, _scene: &Scene, _time: &FrameTime) {}

    /// Called once when the Scene is torn down.
    fn teardown(&mut self, _scene: &mut Scene) {}
}
