pub mod background;
pub mod collector;
pub mod config;
pub mod notifier;
pub mod packer;
pub mod pipeline;
pub mod ranker;
pub mod render;
pub mod sampler;
pub mod scene;
pub mod store;
