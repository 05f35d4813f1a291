pub mod assets;
pub mod config_loader;
pub mod fix;
pub mod sidebar;
pub mod walk;
