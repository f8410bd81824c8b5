pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod mailbox;
pub mod playlist;
pub mod source;
pub mod transition;
pub mod render {
    pub mod backbuffer;
    pub mod device;
    pub mod geometry;
    pub mod pixel;
}
