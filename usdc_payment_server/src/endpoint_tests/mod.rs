mod helpers;
mod merchant;
mod mocks;
mod orders;
mod webhooks;
