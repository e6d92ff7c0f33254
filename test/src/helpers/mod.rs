pub mod event_log;
pub mod recording;
pub mod test_peer;

pub use event_log::EventLog;
pub use recording::{RecordingAudio, RecordingRenderer};
pub use test_peer::{run_director_frames, run_frames, test_session, TestGame, FRAME_SECONDS};
