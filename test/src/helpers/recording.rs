use thengill_shared::{Audio, Camera, RenderItem, Renderer};

/// Remembers every sound requested, in order.
#[derive(Default)]
pub struct RecordingAudio {
    pub played: Vec<String>,
}

impl RecordingAudio {
    pub fn count(&self, name: &str) -> usize {
        self.played.iter().filter(|sound| *sound == name).count()
    }
}

impl Audio for RecordingAudio {
    fn play_sound(&mut self, name: &str) {
        self.played.push(name.to_string());
    }
}

/// Remembers every draw call.
#[derive(Default)]
pub struct RecordingRenderer {
    pub frames: Vec<(Vec<RenderItem>, Camera)>,
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, items: &[RenderItem], camera: &Camera) {
        self.frames.push((items.to_vec(), *camera));
    }
}
