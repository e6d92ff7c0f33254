pub mod authority;
pub mod director;
pub mod scene;
pub mod system;
pub mod time;
