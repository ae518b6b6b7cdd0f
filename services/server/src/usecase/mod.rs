pub mod merchant;
pub mod queue;
pub mod webchat;
